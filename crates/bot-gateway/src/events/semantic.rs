//! Semantic events
//!
//! Named, application-level notifications derived from one or more envelopes.
//! Field-aware merges produce one event per independently-changed field, never
//! a blanket "updated" notification.

use bot_core::{Activity, Channel, Guild, Member, Message, Overwrite, Presence, Snowflake, User, UserStatus};
use serde_json::Value;

/// A semantic change notification delivered to the external sink
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticEvent {
    /// Session established (fresh or resumed)
    Connected,

    /// Guild snapshot inserted into the cache
    GuildCreate(Guild),
    /// Guild evicted; `guild` is the cached copy if one existed
    GuildDelete { id: Snowflake, guild: Option<Guild> },

    /// Member joined a guild
    UserJoin(Member),
    /// Member left a guild
    UserRemove { guild_id: Snowflake, user: User },

    /// Presence appeared with a visible status
    PresenceGoOnline(Presence),
    /// Presence went offline and was evicted
    PresenceGoOffline(Presence),
    /// Status changed between visible states
    PresenceUpdateStatus { presence: Presence, old: UserStatus },
    /// Activity appeared, disappeared, or changed by name
    PresenceUpdateGame { presence: Presence, old: Option<Activity> },
    /// Username or discriminator changed
    PresenceUpdateUser { presence: Presence, old: User },

    /// Nickname transition (set, cleared, or changed)
    MemberUpdateNick { member: Member, old: Option<String> },
    /// Role list changed (order-sensitive)
    MemberUpdateRoles { member: Member, old: Vec<Snowflake> },

    /// User started typing in a cached channel
    TypingStart { channel: Channel, user: Option<User> },

    /// Channel renamed
    ChannelUpdateName { channel: Channel, old: Option<String> },
    /// Channel topic changed
    ChannelUpdateTopic { channel: Channel, old: Option<String> },
    /// Channel moved
    ChannelUpdatePosition { channel: Channel, old: i32 },
    /// Permission overwrites changed
    ChannelUpdateOverwrites { channel: Channel, old: Vec<Overwrite> },

    /// New message (stateless pass-through)
    MessageCreate(Message),
    /// Message edited (stateless pass-through)
    MessageUpdate(Message),
    /// Message deleted (stateless pass-through)
    MessageDelete(Message),

    /// Unrecognized dispatch tag, forwarded opaquely
    Unknown { tag: String, data: Option<Value> },
}

impl SemanticEvent {
    /// The name this event is delivered under
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Connected => "CONNECTED",
            Self::GuildCreate(_) => "GUILD_CREATE",
            Self::GuildDelete { .. } => "GUILD_DELETE",
            Self::UserJoin(_) => "USER_JOIN",
            Self::UserRemove { .. } => "USER_REMOVE",
            Self::PresenceGoOnline(_) => "PRESENCE_GO_ONLINE",
            Self::PresenceGoOffline(_) => "PRESENCE_GO_OFFLINE",
            Self::PresenceUpdateStatus { .. } => "PRESENCE_UPDATE_STATUS",
            Self::PresenceUpdateGame { .. } => "PRESENCE_UPDATE_GAME",
            Self::PresenceUpdateUser { .. } => "PRESENCE_UPDATE_USER",
            Self::MemberUpdateNick { .. } => "MEMBER_UPDATE_NICK",
            Self::MemberUpdateRoles { .. } => "MEMBER_UPDATE_ROLES",
            Self::TypingStart { .. } => "TYPING_START",
            Self::ChannelUpdateName { .. } => "CHANNEL_UPDATE_NAME",
            Self::ChannelUpdateTopic { .. } => "CHANNEL_UPDATE_TOPIC",
            Self::ChannelUpdatePosition { .. } => "CHANNEL_UPDATE_POSITION",
            Self::ChannelUpdateOverwrites { .. } => "CHANNEL_UPDATE_OVERWRITES",
            Self::MessageCreate(_) => "MESSAGE_CREATE",
            Self::MessageUpdate(_) => "MESSAGE_UPDATE",
            Self::MessageDelete(_) => "MESSAGE_DELETE",
            Self::Unknown { tag, .. } => tag,
        }
    }
}
