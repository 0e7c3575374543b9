//! Dispatch payload definitions
//!
//! Wire shapes for the dispatch events the client decodes. Deltas are sparse:
//! absent fields mean "not provided", so these shapes default everything the
//! gateway may omit.

use bot_core::{Activity, Channel, Member, Role, Snowflake, User, UserStatus};
use serde::Deserialize;

/// A user as it appears in presence payloads: sometimes just an id
#[derive(Debug, Clone, Deserialize)]
pub struct PartialUser {
    pub id: Snowflake,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl PartialUser {
    /// Whether the payload carried the full identity
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.username.is_some() && self.discriminator.is_some() && self.avatar.is_some()
    }

    /// Build a full user, taking omitted fields from `fallback`
    #[must_use]
    pub fn resolve(&self, fallback: Option<&User>) -> User {
        User {
            id: self.id,
            username: self
                .username
                .clone()
                .or_else(|| fallback.map(|u| u.username.clone()))
                .unwrap_or_default(),
            discriminator: self
                .discriminator
                .clone()
                .or_else(|| fallback.map(|u| u.discriminator.clone()))
                .unwrap_or_default(),
            avatar: self
                .avatar
                .clone()
                .or_else(|| fallback.and_then(|u| u.avatar.clone())),
            bot: self.bot || fallback.is_some_and(User::is_bot),
        }
    }
}

/// Presence as delivered in snapshots and PRESENCE_UPDATE deltas
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceDelta {
    pub user: PartialUser,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub game: Option<Activity>,
}

/// Full guild snapshot delivered by GUILD_CREATE
#[derive(Debug, Clone, Deserialize)]
pub struct GuildSnapshot {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner_id: Option<Snowflake>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub presences: Vec<PresenceDelta>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Bare guild reference delivered by GUILD_DELETE
#[derive(Debug, Clone, Deserialize)]
pub struct GuildRef {
    pub id: Snowflake,
}

/// GUILD_MEMBER_UPDATE delta
#[derive(Debug, Clone, Deserialize)]
pub struct MemberChange {
    pub user: User,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
}

/// GUILD_MEMBER_REMOVE payload
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRemove {
    pub user: User,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

/// TYPING_START payload
#[derive(Debug, Clone, Deserialize)]
pub struct TypingStartPayload {
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    #[serde(default)]
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_user_resolve_with_fallback() {
        let partial: PartialUser = serde_json::from_str(r#"{"id": "5"}"#).unwrap();
        assert!(!partial.is_complete());

        let mut cached = User::new(Snowflake::new(5), "timmy", "0001");
        cached.avatar = Some("abc".to_string());

        let resolved = partial.resolve(Some(&cached));
        assert_eq!(resolved.username, "timmy");
        assert_eq!(resolved.discriminator, "0001");
        assert_eq!(resolved.avatar.as_deref(), Some("abc"));
    }

    #[test]
    fn test_partial_user_resolve_without_fallback() {
        let partial: PartialUser = serde_json::from_str(r#"{"id": "5"}"#).unwrap();
        let resolved = partial.resolve(None);
        assert_eq!(resolved.id, Snowflake::new(5));
        assert!(resolved.username.is_empty());
    }

    #[test]
    fn test_complete_partial_user_wins() {
        let partial: PartialUser = serde_json::from_str(
            r#"{"id": "5", "username": "renamed", "discriminator": "0002", "avatar": null}"#,
        )
        .unwrap();
        // avatar: null is still "provided but absent", not complete
        assert!(!partial.is_complete());

        let cached = User::new(Snowflake::new(5), "timmy", "0001");
        let resolved = partial.resolve(Some(&cached));
        assert_eq!(resolved.username, "renamed");
        assert_eq!(resolved.discriminator, "0002");
    }

    #[test]
    fn test_presence_delta_deserializes() {
        let delta: PresenceDelta = serde_json::from_str(
            r#"{
                "user": {"id": "5"},
                "guild_id": "1",
                "status": "idle",
                "game": {"name": "Factory Builder"}
            }"#,
        )
        .unwrap();
        assert_eq!(delta.status, UserStatus::Idle);
        assert_eq!(delta.game.as_ref().map(|g| g.name.as_str()), Some("Factory Builder"));
    }

    #[test]
    fn test_guild_snapshot_defaults() {
        let snapshot: GuildSnapshot =
            serde_json::from_str(r#"{"id": "1", "name": "Test"}"#).unwrap();
        assert!(snapshot.channels.is_empty());
        assert!(snapshot.members.is_empty());
        assert!(snapshot.presences.is_empty());
    }

    #[test]
    fn test_member_change_deserializes() {
        let change: MemberChange = serde_json::from_str(
            r#"{
                "guild_id": "1",
                "user": {"id": "5", "username": "timmy", "discriminator": "0001"},
                "nick": "Tim",
                "roles": ["2", "3"]
            }"#,
        )
        .unwrap();
        assert_eq!(change.nick.as_deref(), Some("Tim"));
        assert_eq!(change.roles.len(), 2);
    }
}
