//! Session management
//!
//! The resume-persistent session data shared across connections, and the
//! per-connection handshake state machine.

mod machine;

pub use machine::{SessionMachine, SessionState};

use crate::protocol::Envelope;
use bot_core::User;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

use crate::error::GatewayError;

/// Control commands that terminate the current connection
#[derive(Debug)]
pub enum SessionCommand {
    /// Tear the connection down and reconnect; the session id survives
    /// unless the fault says otherwise
    Fault(GatewayError),
    /// External close; no reconnect, fresh identify on the next start
    Shutdown,
}

/// Session data that outlives individual connections
///
/// The id and sequence survive reconnects so a dropped connection can resume;
/// a fresh identify replaces both. `established` is written by the session
/// machine and read by callers queueing outbound traffic.
#[derive(Default)]
pub struct Session {
    id: Mutex<Option<String>>,
    user: RwLock<Option<User>>,
    established: AtomicBool,
    pending: Mutex<Vec<Envelope>>,
    outbound: RwLock<Option<mpsc::UnboundedSender<Envelope>>>,
}

impl Session {
    /// Create an empty session (no id: the first handshake identifies fresh)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded session id, if any
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.id.lock().clone()
    }

    /// Record the session id issued by READY
    pub fn set_id(&self, id: String) {
        *self.id.lock() = Some(id);
    }

    /// Forget the session id; the next handshake identifies fresh
    pub fn clear_id(&self) {
        *self.id.lock() = None;
    }

    /// The authenticated user, recorded from READY
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.user.read().clone()
    }

    /// Record the authenticated user
    pub fn set_user(&self, user: User) {
        *self.user.write() = Some(user);
    }

    /// Whether a session is currently established
    #[must_use]
    pub fn is_established(&self) -> bool {
        self.established.load(Ordering::SeqCst)
    }

    pub(crate) fn set_established(&self, value: bool) {
        self.established.store(value, Ordering::SeqCst);
    }

    /// Attach the outbound channel of a new connection
    pub fn attach_outbound(&self, sender: mpsc::UnboundedSender<Envelope>) {
        *self.outbound.write() = Some(sender);
    }

    /// Detach from the current connection
    pub(crate) fn detach_outbound(&self) {
        self.set_established(false);
        *self.outbound.write() = None;
    }

    /// Fire-and-forget send toward the gateway
    ///
    /// Payloads sent before the session exists are queued and flushed when it
    /// is established.
    pub fn send(&self, envelope: Envelope) {
        if self.is_established() && self.transmit(envelope.clone()) {
            return;
        }
        self.pending.lock().push(envelope);
    }

    /// Write directly to the current connection, bypassing the queue
    pub(crate) fn transmit(&self, envelope: Envelope) -> bool {
        match self.outbound.read().as_ref() {
            Some(sender) => sender.send(envelope).is_ok(),
            None => false,
        }
    }

    /// Take everything queued before the session existed
    pub(crate) fn drain_pending(&self) -> Vec<Envelope> {
        std::mem::take(&mut *self.pending.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_lifecycle() {
        let session = Session::new();
        assert!(session.id().is_none());

        session.set_id("abc".to_string());
        assert_eq!(session.id().as_deref(), Some("abc"));

        session.clear_id();
        assert!(session.id().is_none());
    }

    #[test]
    fn test_send_queues_until_established() {
        let session = Session::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        session.attach_outbound(tx);

        session.send(Envelope::heartbeat(1));
        assert!(rx.try_recv().is_err());
        assert_eq!(session.drain_pending().len(), 1);

        session.set_established(true);
        session.send(Envelope::heartbeat(2));
        assert!(rx.try_recv().is_ok());
        assert!(session.drain_pending().is_empty());
    }

    #[test]
    fn test_send_without_connection_queues() {
        let session = Session::new();
        session.set_established(true);
        // No outbound attached: falls back to the queue instead of dropping
        session.send(Envelope::heartbeat(1));
        assert_eq!(session.drain_pending().len(), 1);
    }

    #[test]
    fn test_detach_clears_established() {
        let session = Session::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        session.attach_outbound(tx);
        session.set_established(true);

        session.detach_outbound();
        assert!(!session.is_established());
    }
}
