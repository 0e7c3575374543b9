//! Gateway events
//!
//! Dispatch tags as they arrive on the wire, the payloads they carry, the
//! semantic events derived from them, and the sink they are delivered to.

mod event_types;
mod payloads;
mod semantic;
mod sink;

pub use event_types::DispatchEvent;
pub use payloads::{
    GuildRef, GuildSnapshot, MemberChange, MemberRemove, PartialUser, PresenceDelta,
    TypingStartPayload,
};
pub use semantic::SemanticEvent;
pub use sink::{EventRegistry, EventSink, DEPRECATED_EVENTS};
