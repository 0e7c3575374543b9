//! Channel entity - a text, voice, or DM channel

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::entities::User;
use crate::value_objects::Snowflake;

/// Numeric channel kind as sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelKind {
    /// Guild text channel
    Text = 0,
    /// Direct message
    Dm = 1,
    /// Guild voice channel
    Voice = 2,
    /// Group direct message
    Group = 3,
    /// Guild category
    Category = 4,
}

impl ChannelKind {
    /// Create a `ChannelKind` from a raw integer value
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Text),
            1 => Some(Self::Dm),
            2 => Some(Self::Voice),
            3 => Some(Self::Group),
            4 => Some(Self::Category),
            _ => None,
        }
    }

    /// Get the raw integer value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if channels of this kind live inside a guild
    #[must_use]
    pub const fn is_guild(self) -> bool {
        matches!(self, Self::Text | Self::Voice | Self::Category)
    }
}

impl Serialize for ChannelKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for ChannelKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Self::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid channel kind: {value}")))
    }
}

/// Permission overwrite attached to a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overwrite {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub allow: i64,
    #[serde(default)]
    pub deny: i64,
}

/// Channel entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub topic: Option<String>,
    /// `None` means the payload did not carry overwrites, not an empty set.
    #[serde(default)]
    pub permission_overwrites: Option<Vec<Overwrite>>,
    #[serde(default)]
    pub last_message_id: Option<Snowflake>,
    /// Recipients of a DM or group DM
    #[serde(default)]
    pub recipients: Vec<User>,
    /// Backfilled from the owning guild snapshot; DMs have none
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

impl Channel {
    /// Human-readable channel name: `#name`, or `private` for DMs
    pub fn display_name(&self) -> String {
        if self.kind == ChannelKind::Dm {
            return "private".to_string();
        }
        format!("#{}", self.name.as_deref().unwrap_or_default())
    }

    /// Check if this channel is part of a guild
    #[inline]
    pub fn is_in_guild(&self) -> bool {
        self.kind.is_guild()
    }

    /// The other party of a DM channel
    pub fn recipient(&self) -> Option<&User> {
        self.recipients.first()
    }
}
