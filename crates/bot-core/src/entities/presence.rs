//! Presence entity - a user's online state within a guild

use serde::{Deserialize, Serialize};

use crate::entities::User;
use crate::value_objects::Snowflake;

/// User online status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// User is online and active
    Online,
    /// User is idle (away from keyboard)
    Idle,
    /// Do not disturb
    Dnd,
    /// User is offline (or invisible)
    #[default]
    Offline,
}

impl UserStatus {
    /// Check if this status should be visible to others
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Offline)
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Idle => write!(f, "idle"),
            Self::Dnd => write!(f, "dnd"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "idle" => Ok(Self::Idle),
            "dnd" => Ok(Self::Dnd),
            "offline" => Ok(Self::Offline),
            _ => Err(format!("Invalid status: {s}")),
        }
    }
}

/// What a user is currently playing or streaming
///
/// Two activities are considered the same game when their names match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default)]
    pub url: Option<String>,
}

impl Activity {
    /// Compare two activities by name, the identity the platform uses
    #[must_use]
    pub fn same_game(&self, other: &Activity) -> bool {
        self.name == other.name
    }
}

/// Cached presence
///
/// Unique per (guild id, user id). Only visible presences are cached; an
/// offline user has no entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presence {
    pub user: User,
    pub guild_id: Snowflake,
    pub status: UserStatus,
    pub game: Option<Activity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        let status: UserStatus = serde_json::from_str("\"dnd\"").unwrap();
        assert_eq!(status, UserStatus::Dnd);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"dnd\"");
    }

    #[test]
    fn test_status_visibility() {
        assert!(UserStatus::Online.is_visible());
        assert!(UserStatus::Idle.is_visible());
        assert!(!UserStatus::Offline.is_visible());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("ONLINE".parse::<UserStatus>().unwrap(), UserStatus::Online);
        assert!("busy".parse::<UserStatus>().is_err());
    }

    #[test]
    fn test_activity_same_game() {
        let a = Activity {
            name: "Factory Builder".to_string(),
            kind: 0,
            url: None,
        };
        let mut b = a.clone();
        b.kind = 1;
        assert!(a.same_game(&b));

        b.name = "Another Game".to_string();
        assert!(!a.same_game(&b));
    }
}
