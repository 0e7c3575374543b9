//! Event dispatcher
//!
//! Consumes one decoded envelope at a time in transport-delivery order,
//! keyed first on operation code and then on the dispatch tag. The
//! dispatcher is the sole writer of the entity cache and does only
//! in-memory work; semantic events go to the sink synchronously, one call
//! per event.

use crate::cache::CacheStore;
use crate::error::{GatewayError, SessionFault};
use crate::events::{
    DispatchEvent, EventSink, GuildRef, GuildSnapshot, MemberChange, MemberRemove, PresenceDelta,
    SemanticEvent, TypingStartPayload,
};
use crate::heartbeat::HeartbeatState;
use crate::protocol::{Envelope, HelloPayload, OpCode, ReadyPayload};
use crate::session::{SessionCommand, SessionMachine};
use bot_core::{Channel, Member, Message};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Routes inbound envelopes into cache merges and semantic events
pub struct EventDispatcher {
    cache: Arc<CacheStore>,
    sink: Arc<dyn EventSink>,
    heartbeat: Arc<HeartbeatState>,
    machine: SessionMachine,
}

impl EventDispatcher {
    /// Create a dispatcher for one connection
    #[must_use]
    pub fn new(
        cache: Arc<CacheStore>,
        sink: Arc<dyn EventSink>,
        heartbeat: Arc<HeartbeatState>,
        machine: SessionMachine,
    ) -> Self {
        Self {
            cache,
            sink,
            heartbeat,
            machine,
        }
    }

    /// Access the handshake state machine
    pub fn machine_mut(&mut self) -> &mut SessionMachine {
        &mut self.machine
    }

    /// Handle one inbound envelope
    ///
    /// Returns a command when the envelope demands connection teardown.
    /// Unknown operations and malformed payloads are logged and dropped,
    /// never fatal.
    pub fn handle(&mut self, envelope: Envelope) -> Option<SessionCommand> {
        match envelope.op {
            OpCode::Dispatch => self.handle_dispatch(envelope),
            OpCode::Hello => {
                if let Some(hello) = decode::<HelloPayload>("HELLO", envelope.d) {
                    self.machine.on_hello(hello);
                }
                None
            }
            OpCode::HeartbeatAck => {
                tracing::trace!("heartbeat acknowledged");
                self.heartbeat.ack();
                None
            }
            OpCode::Reconnect => Some(self.machine.fault(SessionFault::ReconnectRequest)),
            OpCode::InvalidSession => Some(self.machine.fault(SessionFault::InvalidSession)),
            other => {
                tracing::debug!(op = %other, "unhandled operation");
                None
            }
        }
    }

    fn handle_dispatch(&mut self, envelope: Envelope) -> Option<SessionCommand> {
        if let Some(seq) = envelope.s {
            self.heartbeat.record_seq(seq);
        }

        let tag = envelope.t.unwrap_or_default();
        let data = envelope.d;

        match DispatchEvent::parse(&tag) {
            DispatchEvent::Ready => {
                let ready = decode::<ReadyPayload>(&tag, data)?;
                // A fresh identify invalidates everything cached previously
                self.cache.clear();
                let events = self.machine.on_ready(ready);
                self.emit_all(events);
            }
            DispatchEvent::Resumed => {
                let events = self.machine.on_resumed();
                self.emit_all(events);
            }
            DispatchEvent::GuildCreate => {
                let snapshot = decode::<GuildSnapshot>(&tag, data)?;
                self.emit(self.cache.insert_guild(snapshot));
            }
            DispatchEvent::GuildDelete => {
                let guild = decode::<GuildRef>(&tag, data)?;
                self.emit(self.cache.remove_guild(guild.id));
            }
            DispatchEvent::GuildMemberAdd => {
                let member = decode::<Member>(&tag, data)?;
                if let Some(event) = self.cache.add_member(member) {
                    self.emit(event);
                }
            }
            DispatchEvent::GuildMemberRemove => {
                let removal = decode::<MemberRemove>(&tag, data)?;
                if let Some(event) = self.cache.remove_member(&removal) {
                    self.emit(event);
                }
            }
            DispatchEvent::GuildMemberUpdate => {
                let change = decode::<MemberChange>(&tag, data)?;
                let events = self.cache.merge_member(change);
                self.emit_all(events);
            }
            DispatchEvent::PresenceUpdate => {
                let delta = decode::<PresenceDelta>(&tag, data)?;
                let events = self.cache.merge_presence(delta);
                self.emit_all(events);
            }
            DispatchEvent::TypingStart => {
                let payload = decode::<TypingStartPayload>(&tag, data)?;
                match self.cache.resolve_typing(&payload) {
                    Some((channel, user)) => self.emit(SemanticEvent::TypingStart { channel, user }),
                    None => tracing::debug!(
                        channel_id = %payload.channel_id,
                        "typing in channel not in cache"
                    ),
                }
            }
            DispatchEvent::ChannelUpdate => {
                let delta = decode::<Channel>(&tag, data)?;
                let events = self.cache.merge_channel(delta);
                self.emit_all(events);
            }
            kind @ (DispatchEvent::MessageCreate
            | DispatchEvent::MessageUpdate
            | DispatchEvent::MessageDelete) => {
                let message = decode::<Message>(&tag, data)?;
                // A create in a guild channel also moves that channel's
                // last-message pointer; updates and deletes share the
                // stateless emission path below.
                if kind == DispatchEvent::MessageCreate {
                    self.cache.touch_last_message(message.channel_id, message.id);
                }
                self.emit(match kind {
                    DispatchEvent::MessageCreate => SemanticEvent::MessageCreate(message),
                    DispatchEvent::MessageUpdate => SemanticEvent::MessageUpdate(message),
                    _ => SemanticEvent::MessageDelete(message),
                });
            }
            DispatchEvent::Unknown => {
                tracing::debug!(tag = %tag, "unhandled event, forwarding as unknown");
                self.emit(SemanticEvent::Unknown { tag, data });
            }
        }

        None
    }

    fn emit(&self, event: SemanticEvent) {
        tracing::trace!(event = %event.name(), "emitting semantic event");
        self.sink.emit(event);
    }

    fn emit_all(&self, events: Vec<SemanticEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}

// Decode a dispatch payload, logging and dropping on failure.
fn decode<T: DeserializeOwned>(tag: &str, data: Option<Value>) -> Option<T> {
    let Some(value) = data else {
        tracing::debug!(tag = %tag, "dispatch without payload");
        return None;
    };
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            tracing::debug!(
                tag = %tag,
                error = %GatewayError::Protocol(err.to_string()),
                "dropping malformed dispatch payload"
            );
            None
        }
    }
}
