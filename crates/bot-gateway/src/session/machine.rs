//! Session handshake state machine
//!
//! Drives one connection from CONNECTING through AWAIT_HELLO and the
//! identify/resume split to CONNECTED, and turns remote session faults into
//! teardown commands.

use super::{Session, SessionCommand};
use crate::error::{GatewayError, SessionFault};
use crate::events::SemanticEvent;
use crate::heartbeat::HeartbeatState;
use crate::protocol::{ClientProperties, Envelope, HelloPayload, IdentifyPayload, ReadyPayload, ResumePayload};
use std::sync::Arc;

/// Connection lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport
    Disconnected,
    /// Transport dial in progress
    Connecting,
    /// Transport open, waiting for the gateway's Hello
    AwaitHello,
    /// Fresh identify sent, waiting for READY
    Identifying,
    /// Resume sent, waiting for RESUMED
    Resuming,
    /// Session established, normal traffic
    Connected,
    /// Teardown in progress
    Closing,
}

/// Per-connection handshake state machine
///
/// Owned by the dispatcher; all transitions happen on the dispatch thread.
pub struct SessionMachine {
    state: SessionState,
    token: String,
    properties: ClientProperties,
    session: Arc<Session>,
    heartbeat: Arc<HeartbeatState>,
}

impl SessionMachine {
    /// Create a machine for a connection being dialed
    #[must_use]
    pub fn new(
        token: String,
        properties: ClientProperties,
        session: Arc<Session>,
        heartbeat: Arc<HeartbeatState>,
    ) -> Self {
        Self {
            state: SessionState::Connecting,
            token,
            properties,
            session,
            heartbeat,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The transport finished opening
    pub fn on_open(&mut self) {
        self.state = SessionState::AwaitHello;
        tracing::debug!("transport open, awaiting hello");
    }

    /// Handle Hello (op 10): record the heartbeat interval, then identify or
    /// resume depending on whether a session id is recorded
    pub fn on_hello(&mut self, hello: HelloPayload) {
        self.heartbeat.set_interval(hello.heartbeat_interval);

        match self.session.id() {
            None => {
                let payload = IdentifyPayload::new(self.token.clone(), self.properties.clone());
                self.session.transmit(Envelope::identify(&payload));
                self.state = SessionState::Identifying;
                tracing::info!(
                    heartbeat_interval_ms = hello.heartbeat_interval,
                    "identifying with fresh session"
                );
            }
            Some(session_id) => {
                let payload = ResumePayload {
                    token: self.token.clone(),
                    session_id: session_id.clone(),
                    seq: self.heartbeat.seq(),
                };
                self.session.transmit(Envelope::resume(&payload));
                self.state = SessionState::Resuming;
                tracing::info!(
                    session_id = %session_id,
                    seq = payload.seq,
                    heartbeat_interval_ms = hello.heartbeat_interval,
                    "resuming session"
                );
            }
        }
    }

    /// Handle the READY dispatch: record the new session id and user, then
    /// run the same establishment tail as RESUMED
    pub fn on_ready(&mut self, ready: ReadyPayload) -> Vec<SemanticEvent> {
        tracing::info!(
            session_id = %ready.session_id,
            user = %ready.user.tag(),
            "session ready"
        );
        self.session.set_id(ready.session_id);
        self.session.set_user(ready.user);
        self.establish()
    }

    /// Handle the RESUMED dispatch
    pub fn on_resumed(&mut self) -> Vec<SemanticEvent> {
        tracing::info!("session resumed");
        self.establish()
    }

    // Shared READY/RESUMED tail: flush payloads queued before the session
    // existed, then surface the synthetic CONNECTED event.
    fn establish(&mut self) -> Vec<SemanticEvent> {
        if !matches!(self.state, SessionState::Identifying | SessionState::Resuming) {
            tracing::warn!(state = ?self.state, "session established from unexpected state");
        }

        for envelope in self.session.drain_pending() {
            self.session.transmit(envelope);
        }
        self.session.set_established(true);
        self.state = SessionState::Connected;

        vec![SemanticEvent::Connected]
    }

    /// Turn a remote session fault (op 7 / op 9) into a teardown command
    ///
    /// Unconditional and immediate, from any state.
    pub fn fault(&mut self, fault: SessionFault) -> SessionCommand {
        tracing::warn!(fault = %fault, state = ?self.state, "session fault");
        SessionCommand::Fault(GatewayError::Session(fault))
    }

    /// Tear this connection down: pause the watchdog and detach the session
    pub fn close(&mut self) {
        self.state = SessionState::Closing;
        self.heartbeat.pause();
        self.session.detach_outbound();
        self.state = SessionState::Disconnected;
        tracing::debug!("connection closed");
    }
}
