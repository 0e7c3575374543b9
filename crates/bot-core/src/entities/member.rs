//! Member entity - a user's membership in a guild

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::User;
use crate::value_objects::{timestamp, Snowflake};

/// Guild member (junction between User and Guild)
///
/// Unique per (guild id, user id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub user: User,
    /// Backfilled from the owning guild snapshot when the payload omits it
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub nick: Option<String>,
    /// Role ids, order-sensitive
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    #[serde(default = "timestamp::zero", deserialize_with = "timestamp::lenient")]
    pub joined_at: DateTime<Utc>,
}

impl Member {
    /// Display name: nickname if set, otherwise the username
    pub fn display_name(&self) -> &str {
        self.nick.as_deref().unwrap_or(&self.user.username)
    }

    /// Check if member has a specific role
    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.roles.contains(&role_id)
    }
}
