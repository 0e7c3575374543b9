//! Lenient timestamp deserialization
//!
//! Gateway payloads carry RFC 3339 timestamps, but the wire is not trusted:
//! a missing or malformed timestamp yields the zero value instead of failing
//! the whole payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// The zero timestamp (Unix epoch), used as the fallback for bad input.
#[must_use]
pub fn zero() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

fn parse(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Deserialize a required timestamp field, swallowing malformed input.
pub fn lenient<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(parse(&value).unwrap_or_else(zero))
}

/// Deserialize an optional timestamp field.
///
/// Absent or null stays `None`; a present-but-malformed value becomes the
/// zero timestamp rather than an error.
pub fn lenient_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(parse(&value).unwrap_or_else(zero)))
}
