//! Gateway error taxonomy
//!
//! No failure here terminates the process: every terminal action on a fault
//! is "attempt to reconnect". Malformed single envelopes are logged and
//! dropped without surfacing an error at all.

use thiserror::Error;

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway client error type
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Socket-level failure; reconnect and resume
    #[error("transport failure: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Malformed or unexpected envelope; the envelope is dropped
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// Remote-issued session fault; controlled teardown and restart
    #[error(transparent)]
    Session(#[from] SessionFault),

    /// A sent heartbeat was never acknowledged; treated like transport loss
    #[error("heartbeat not acknowledged within interval")]
    Liveness,
}

/// Session faults issued by the remote gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionFault {
    /// Reconnect requested (op 7); the session id stays valid for resume
    #[error("gateway requested reconnect")]
    ReconnectRequest,

    /// Session invalidated (op 9); the next connection must identify fresh
    #[error("session invalidated by gateway")]
    InvalidSession,
}

impl GatewayError {
    /// Whether the next connection may resume with the current session id
    #[must_use]
    pub fn preserves_session(&self) -> bool {
        !matches!(self, Self::Session(SessionFault::InvalidSession))
    }
}
