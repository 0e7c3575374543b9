//! # bot-gateway
//!
//! Persistent event-stream client for the chat platform's real-time gateway:
//! one long-lived WebSocket connection, a stateful identify/resume handshake,
//! an application-level heartbeat watchdog, an in-memory entity cache built
//! from snapshots plus deltas, and field-aware semantic change events.

pub mod cache;
pub mod client;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod heartbeat;
pub mod protocol;
pub mod session;

pub use cache::CacheStore;
pub use client::{ClientHandle, GatewayClient};
pub use error::{GatewayError, GatewayResult, SessionFault};
pub use events::{EventRegistry, EventSink, SemanticEvent};
