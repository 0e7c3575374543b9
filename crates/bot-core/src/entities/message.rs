//! Message entity - stateless pass-through, never cached

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::User;
use crate::value_objects::{timestamp, Snowflake};

/// A chat message as delivered by the gateway
///
/// Delete notifications carry only `id` and `channel_id`; everything else
/// defaults so the same shape parses all three message events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub content: String,
    #[serde(default = "timestamp::zero", deserialize_with = "timestamp::lenient")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::lenient_opt")]
    pub edited_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mentions: Vec<User>,
}

impl Message {
    /// Check whether the message was edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_timestamp.is_some()
    }

    /// Check whether the message mentions the given user
    pub fn mentions_user(&self, user_id: Snowflake) -> bool {
        self.mentions.iter().any(|u| u.id == user_id)
    }
}
