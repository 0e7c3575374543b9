//! Dispatch event tags
//!
//! The event names carried in the `t` field of dispatch envelopes, with an
//! explicit Unknown variant instead of implicit fallthrough.

use std::fmt;

/// Recognized dispatch tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchEvent {
    /// Sent after successful Identify
    Ready,
    /// Sent after successful Resume
    Resumed,

    /// Full guild snapshot: available, joined, or created
    GuildCreate,
    /// Left guild, kicked, or guild deleted
    GuildDelete,

    /// User joined guild
    GuildMemberAdd,
    /// User left guild
    GuildMemberRemove,
    /// Member changed (nickname, roles)
    GuildMemberUpdate,

    /// Presence delta (status, game, user)
    PresenceUpdate,
    /// User started typing
    TypingStart,

    /// Channel changed (name, topic, position, overwrites)
    ChannelUpdate,

    /// New message
    MessageCreate,
    /// Message edited
    MessageUpdate,
    /// Message deleted
    MessageDelete,

    /// Anything else; forwarded as an opaque unknown-event notification
    Unknown,
}

impl DispatchEvent {
    /// Parse an event tag; unrecognized tags map to `Unknown`
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "READY" => Self::Ready,
            "RESUMED" => Self::Resumed,
            "GUILD_CREATE" => Self::GuildCreate,
            "GUILD_DELETE" => Self::GuildDelete,
            "GUILD_MEMBER_ADD" => Self::GuildMemberAdd,
            "GUILD_MEMBER_REMOVE" => Self::GuildMemberRemove,
            "GUILD_MEMBER_UPDATE" => Self::GuildMemberUpdate,
            "PRESENCE_UPDATE" => Self::PresenceUpdate,
            "TYPING_START" => Self::TypingStart,
            "CHANNEL_UPDATE" => Self::ChannelUpdate,
            "MESSAGE_CREATE" => Self::MessageCreate,
            "MESSAGE_UPDATE" => Self::MessageUpdate,
            "MESSAGE_DELETE" => Self::MessageDelete,
            _ => Self::Unknown,
        }
    }

    /// Get the wire representation of the tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Resumed => "RESUMED",
            Self::GuildCreate => "GUILD_CREATE",
            Self::GuildDelete => "GUILD_DELETE",
            Self::GuildMemberAdd => "GUILD_MEMBER_ADD",
            Self::GuildMemberRemove => "GUILD_MEMBER_REMOVE",
            Self::GuildMemberUpdate => "GUILD_MEMBER_UPDATE",
            Self::PresenceUpdate => "PRESENCE_UPDATE",
            Self::TypingStart => "TYPING_START",
            Self::ChannelUpdate => "CHANNEL_UPDATE",
            Self::MessageCreate => "MESSAGE_CREATE",
            Self::MessageUpdate => "MESSAGE_UPDATE",
            Self::MessageDelete => "MESSAGE_DELETE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for DispatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!(DispatchEvent::parse("READY"), DispatchEvent::Ready);
        assert_eq!(DispatchEvent::parse("RESUMED"), DispatchEvent::Resumed);
        assert_eq!(DispatchEvent::parse("GUILD_CREATE"), DispatchEvent::GuildCreate);
        assert_eq!(DispatchEvent::parse("PRESENCE_UPDATE"), DispatchEvent::PresenceUpdate);
        assert_eq!(DispatchEvent::parse("MESSAGE_DELETE"), DispatchEvent::MessageDelete);
    }

    #[test]
    fn test_parse_unknown_tag() {
        assert_eq!(DispatchEvent::parse("VOICE_STATE_UPDATE"), DispatchEvent::Unknown);
        assert_eq!(DispatchEvent::parse(""), DispatchEvent::Unknown);
    }

    #[test]
    fn test_roundtrip() {
        for tag in [
            "READY",
            "GUILD_MEMBER_UPDATE",
            "CHANNEL_UPDATE",
            "TYPING_START",
            "MESSAGE_CREATE",
        ] {
            assert_eq!(DispatchEvent::parse(tag).as_str(), tag);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", DispatchEvent::Ready), "READY");
    }
}
