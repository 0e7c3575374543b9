//! Cache store and merge rules

use crate::events::{
    GuildSnapshot, MemberChange, MemberRemove, PresenceDelta, SemanticEvent, TypingStartPayload,
};
use bot_core::{Channel, ChannelKind, Guild, Member, Presence, Snowflake, User, UserStatus};
use dashmap::DashMap;

/// Guild-keyed entity store
///
/// Lifetime is tied to one connection's session: cleared on every fresh
/// identify, preserved across resume. The dispatcher is the only writer;
/// readers get clones.
#[derive(Default)]
pub struct CacheStore {
    guilds: DashMap<Snowflake, Guild>,
}

impl CacheStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all cached guilds (and with them their children)
    pub fn clear(&self) {
        self.guilds.clear();
    }

    /// Number of cached guilds
    #[must_use]
    pub fn len(&self) -> usize {
        self.guilds.len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guilds.is_empty()
    }

    /// Get a clone of a cached guild
    #[must_use]
    pub fn guild(&self, id: Snowflake) -> Option<Guild> {
        self.guilds.get(&id).map(|g| g.clone())
    }

    /// Find a channel by id across all cached guilds
    #[must_use]
    pub fn find_channel(&self, channel_id: Snowflake) -> Option<Channel> {
        self.guilds
            .iter()
            .find_map(|guild| guild.channel(channel_id).cloned())
    }

    /// Insert a full guild snapshot, replacing any cached copy wholesale
    ///
    /// Child entities get their owning-guild reference backfilled; presences
    /// take their user fields from the matching member when the snapshot
    /// omits them.
    pub fn insert_guild(&self, snapshot: GuildSnapshot) -> SemanticEvent {
        let mut guild = Guild::new(snapshot.id, snapshot.name);
        guild.owner_id = snapshot.owner_id;
        guild.roles = snapshot.roles;

        for mut channel in snapshot.channels {
            channel.guild_id = Some(guild.id);
            guild.channels.push(channel);
        }
        for mut member in snapshot.members {
            member.guild_id = Some(guild.id);
            guild.members.insert(member.user.id, member);
        }
        for delta in snapshot.presences {
            let user = delta
                .user
                .resolve(guild.members.get(&delta.user.id).map(|m| &m.user));
            guild.presences.insert(
                user.id,
                Presence {
                    user,
                    guild_id: guild.id,
                    status: delta.status,
                    game: delta.game,
                },
            );
        }

        tracing::debug!(
            guild_id = %guild.id,
            channels = guild.channels.len(),
            members = guild.members.len(),
            presences = guild.presences.len(),
            "guild snapshot cached"
        );

        let event = SemanticEvent::GuildCreate(guild.clone());
        self.guilds.insert(guild.id, guild);
        event
    }

    /// Evict a guild and everything it owns
    pub fn remove_guild(&self, id: Snowflake) -> SemanticEvent {
        let guild = self.guilds.remove(&id).map(|(_, g)| g);
        if guild.is_none() {
            tracing::debug!(guild_id = %id, "delete for guild not in cache");
        }
        SemanticEvent::GuildDelete { id, guild }
    }

    /// Insert a member into its guild
    pub fn add_member(&self, member: Member) -> Option<SemanticEvent> {
        let guild_id = member.guild_id?;
        let Some(mut guild) = self.guilds.get_mut(&guild_id) else {
            tracing::debug!(guild_id = %guild_id, "member add for guild not in cache");
            return None;
        };
        guild.add_member(member.clone());
        Some(SemanticEvent::UserJoin(member))
    }

    /// Evict a member (and their presence) from a guild
    pub fn remove_member(&self, removal: &MemberRemove) -> Option<SemanticEvent> {
        let guild_id = removal.guild_id?;
        let Some(mut guild) = self.guilds.get_mut(&guild_id) else {
            tracing::debug!(guild_id = %guild_id, "member remove for guild not in cache");
            return None;
        };
        guild.remove_member(removal.user.id);
        guild.remove_presence(removal.user.id);
        Some(SemanticEvent::UserRemove {
            guild_id,
            user: removal.user.clone(),
        })
    }

    /// Merge a presence delta against the cache
    ///
    /// Emits at most one event per independently-changed field, in the fixed
    /// order: status, game, user.
    pub fn merge_presence(&self, delta: PresenceDelta) -> Vec<SemanticEvent> {
        let mut events = Vec::new();

        let Some(guild_id) = delta.guild_id else {
            tracing::debug!(user_id = %delta.user.id, "presence delta without guild id");
            return events;
        };
        let Some(mut guild) = self.guilds.get_mut(&guild_id) else {
            tracing::debug!(guild_id = %guild_id, "presence delta for guild not in cache");
            return events;
        };
        let user_id = delta.user.id;

        if guild.presence(user_id).is_none() {
            // Unseen user coming online; a repeated offline emits nothing
            if delta.status != UserStatus::Offline {
                let user = delta.user.resolve(guild.member(user_id).map(|m| &m.user));
                let presence = Presence {
                    user,
                    guild_id,
                    status: delta.status,
                    game: delta.game,
                };
                guild.add_presence(presence.clone());
                events.push(SemanticEvent::PresenceGoOnline(presence));
            }
            return events;
        }

        if delta.status == UserStatus::Offline {
            if let Some(removed) = guild.remove_presence(user_id) {
                events.push(SemanticEvent::PresenceGoOffline(removed));
            }
            return events;
        }

        let Some(cached) = guild.presences.get_mut(&user_id) else {
            return events;
        };

        if cached.status != delta.status {
            let old = cached.status;
            cached.status = delta.status;
            events.push(SemanticEvent::PresenceUpdateStatus {
                presence: cached.clone(),
                old,
            });
        }

        let game_changed = match (&cached.game, &delta.game) {
            (None, None) => false,
            (Some(a), Some(b)) => !a.same_game(b),
            _ => true,
        };
        if game_changed {
            let old = cached.game.take();
            cached.game = delta.game;
            events.push(SemanticEvent::PresenceUpdateGame {
                presence: cached.clone(),
                old,
            });
        }

        // A sparse user block cannot be compared; only a complete one both
        // refreshes the cached copy and can signal an identity change.
        if delta.user.is_complete() {
            let incoming = delta.user.resolve(Some(&cached.user));
            let identity_changed = incoming.username != cached.user.username
                || incoming.discriminator != cached.user.discriminator;
            let old = std::mem::replace(&mut cached.user, incoming);
            if identity_changed {
                events.push(SemanticEvent::PresenceUpdateUser {
                    presence: cached.clone(),
                    old,
                });
            }
        }

        events
    }

    /// Merge a member delta against the cache
    ///
    /// Nickname transitions and order-sensitive role-list inequality each
    /// emit their own event; there is no per-role diffing.
    pub fn merge_member(&self, change: MemberChange) -> Vec<SemanticEvent> {
        let mut events = Vec::new();

        let Some(guild_id) = change.guild_id else {
            tracing::debug!(user_id = %change.user.id, "member delta without guild id");
            return events;
        };
        let Some(mut guild) = self.guilds.get_mut(&guild_id) else {
            tracing::debug!(guild_id = %guild_id, "member delta for guild not in cache");
            return events;
        };
        let Some(member) = guild.members.get_mut(&change.user.id) else {
            tracing::debug!(
                guild_id = %guild_id,
                user_id = %change.user.id,
                "member delta for user not in cache"
            );
            return events;
        };

        member.user = change.user;

        if member.nick != change.nick {
            let old = member.nick.take();
            member.nick = change.nick;
            events.push(SemanticEvent::MemberUpdateNick {
                member: member.clone(),
                old,
            });
        }

        if member.roles != change.roles {
            let old = std::mem::replace(&mut member.roles, change.roles);
            events.push(SemanticEvent::MemberUpdateRoles {
                member: member.clone(),
                old,
            });
        }

        events
    }

    /// Merge a channel delta against the cache
    ///
    /// Name, topic, position, and overwrites are compared independently; a
    /// topic or overwrite set absent from the delta is "not provided", never
    /// an erase.
    pub fn merge_channel(&self, delta: Channel) -> Vec<SemanticEvent> {
        let mut events = Vec::new();

        let Some(guild_id) = delta.guild_id else {
            tracing::debug!(channel_id = %delta.id, "channel delta without guild id");
            return events;
        };
        let Some(mut guild) = self.guilds.get_mut(&guild_id) else {
            tracing::debug!(guild_id = %guild_id, "channel delta for guild not in cache");
            return events;
        };
        let Some(cached) = guild.channel_mut(delta.id) else {
            tracing::debug!(
                guild_id = %guild_id,
                channel_id = %delta.id,
                "channel delta for channel not in cache"
            );
            return events;
        };

        if delta.name.is_some() && cached.name != delta.name {
            let old = cached.name.take();
            cached.name = delta.name;
            events.push(SemanticEvent::ChannelUpdateName {
                channel: cached.clone(),
                old,
            });
        }

        if delta.topic.is_some() && cached.topic != delta.topic {
            let old = cached.topic.take();
            cached.topic = delta.topic;
            events.push(SemanticEvent::ChannelUpdateTopic {
                channel: cached.clone(),
                old,
            });
        }

        if cached.position != delta.position {
            let old = cached.position;
            cached.position = delta.position;
            events.push(SemanticEvent::ChannelUpdatePosition {
                channel: cached.clone(),
                old,
            });
        }

        if let Some(overwrites) = delta.permission_overwrites {
            if cached.permission_overwrites.as_ref() != Some(&overwrites) {
                let old = cached.permission_overwrites.take().unwrap_or_default();
                cached.permission_overwrites = Some(overwrites);
                events.push(SemanticEvent::ChannelUpdateOverwrites {
                    channel: cached.clone(),
                    old,
                });
            }
        }

        events
    }

    /// Update a guild channel's last-message pointer
    ///
    /// Only guild channels live in the cache, so direct messages are
    /// untouched by construction.
    pub fn touch_last_message(&self, channel_id: Snowflake, message_id: Snowflake) -> bool {
        for mut guild in self.guilds.iter_mut() {
            if let Some(channel) = guild.channel_mut(channel_id) {
                channel.last_message_id = Some(message_id);
                return true;
            }
        }
        false
    }

    /// Resolve a typing notification to its cached channel and user
    #[must_use]
    pub fn resolve_typing(&self, payload: &TypingStartPayload) -> Option<(Channel, Option<User>)> {
        let channel = self.find_channel(payload.channel_id)?;
        let user = if channel.kind == ChannelKind::Dm {
            channel.recipient().cloned()
        } else {
            channel
                .guild_id
                .and_then(|gid| self.guilds.get(&gid))
                .and_then(|g| g.member(payload.user_id).map(|m| m.user.clone()))
        };
        Some((channel, user))
    }
}
