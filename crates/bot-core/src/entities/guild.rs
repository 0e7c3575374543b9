//! Guild entity - a server and the sole owner of its children

use std::collections::HashMap;

use crate::entities::{Channel, Member, Presence, Role};
use crate::value_objects::Snowflake;

/// Guild (server) entity
///
/// Owns its channels, members, presences, and roles; evicting the guild
/// evicts all of them. Members and presences are keyed by user id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    pub owner_id: Option<Snowflake>,
    /// Ordered as delivered in the snapshot
    pub channels: Vec<Channel>,
    pub members: HashMap<Snowflake, Member>,
    pub presences: HashMap<Snowflake, Presence>,
    pub roles: Vec<Role>,
}

impl Guild {
    /// Create an empty Guild
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Look up a channel by id
    pub fn channel(&self, id: Snowflake) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Look up a channel by id, mutably
    pub fn channel_mut(&mut self, id: Snowflake) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| c.id == id)
    }

    /// Insert a channel, replacing any existing one with the same id
    pub fn add_channel(&mut self, channel: Channel) {
        match self.channels.iter_mut().find(|c| c.id == channel.id) {
            Some(existing) => *existing = channel,
            None => self.channels.push(channel),
        }
    }

    /// Look up a member by user id
    pub fn member(&self, user_id: Snowflake) -> Option<&Member> {
        self.members.get(&user_id)
    }

    /// Insert a member keyed by user id, replacing any existing entry
    pub fn add_member(&mut self, member: Member) {
        self.members.insert(member.user.id, member);
    }

    /// Remove a member by user id
    pub fn remove_member(&mut self, user_id: Snowflake) -> Option<Member> {
        self.members.remove(&user_id)
    }

    /// Look up a presence by user id
    pub fn presence(&self, user_id: Snowflake) -> Option<&Presence> {
        self.presences.get(&user_id)
    }

    /// Insert a presence keyed by user id, replacing any existing entry
    pub fn add_presence(&mut self, presence: Presence) {
        self.presences.insert(presence.user.id, presence);
    }

    /// Remove a presence by user id
    pub fn remove_presence(&mut self, user_id: Snowflake) -> Option<Presence> {
        self.presences.remove(&user_id)
    }

    /// Look up a role by id
    pub fn role(&self, id: Snowflake) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }
}
