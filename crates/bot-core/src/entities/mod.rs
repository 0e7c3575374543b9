//! Cached gateway entities
//!
//! These are the in-memory shapes the client reconstructs from snapshot and
//! delta payloads. They are mutated in place by partial updates; a delta that
//! omits a field must never erase cached data.

mod channel;
mod guild;
mod member;
mod message;
mod presence;
mod role;
mod user;

pub use channel::{Channel, ChannelKind, Overwrite};
pub use guild::Guild;
pub use member::Member;
pub use message::Message;
pub use presence::{Activity, Presence, UserStatus};
pub use role::Role;
pub use user::User;
