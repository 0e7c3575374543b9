//! Handshake payload definitions
//!
//! Payload structures for the session establishment ops.

use bot_core::User;
use serde::{Deserialize, Serialize};

/// Payload for op 10 (Hello)
///
/// Sent by the gateway immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Client connection properties sent inside Identify
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
    #[serde(default)]
    pub referrer: String,
    #[serde(default)]
    pub referring_domain: String,
}

impl ClientProperties {
    /// Build the properties for this client
    #[must_use]
    pub fn new(app_name: &str) -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: app_name.to_string(),
            device: app_name.to_string(),
            referrer: String::new(),
            referring_domain: String::new(),
        }
    }
}

/// Payload for op 2 (Identify)
///
/// Starts a fresh session. Compression stays disabled and the client always
/// identifies as the single shard [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Authentication token
    pub token: String,
    pub properties: ClientProperties,
    pub compress: bool,
    pub large_threshold: u8,
    pub shard: [u32; 2],
}

impl IdentifyPayload {
    /// Member-list size above which the gateway omits offline members
    pub const LARGE_THRESHOLD: u8 = 50;

    /// Create an Identify payload with the fixed client defaults
    #[must_use]
    pub fn new(token: impl Into<String>, properties: ClientProperties) -> Self {
        Self {
            token: token.into(),
            properties,
            compress: false,
            large_threshold: Self::LARGE_THRESHOLD,
            shard: [0, 1],
        }
    }
}

/// Payload for op 6 (Resume)
///
/// Re-establishes a dropped session without a fresh identify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Authentication token
    pub token: String,

    /// Session ID to resume
    pub session_id: String,

    /// Last received sequence number
    pub seq: u64,
}

/// Payload of the READY dispatch
///
/// The gateway sends more than this; only the fields the client records are
/// decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyPayload {
    /// Newly issued session id, valid until the next fresh identify
    pub session_id: String,
    /// The authenticated user
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_payload() {
        let hello: HelloPayload =
            serde_json::from_str(r#"{"heartbeat_interval": 41250}"#).unwrap();
        assert_eq!(hello.heartbeat_interval, 41_250);
    }

    #[test]
    fn test_identify_defaults() {
        let payload = IdentifyPayload::new("token123", ClientProperties::new("test-bot"));

        assert!(!payload.compress);
        assert_eq!(payload.large_threshold, 50);
        assert_eq!(payload.shard, [0, 1]);
        assert_eq!(payload.properties.browser, "test-bot");
        assert_eq!(payload.properties.device, "test-bot");
        assert!(payload.properties.referrer.is_empty());
    }

    #[test]
    fn test_identify_serialization() {
        let payload = IdentifyPayload::new("token123", ClientProperties::new("test-bot"));
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("token123"));
        assert!(json.contains("large_threshold"));
        assert!(json.contains("referring_domain"));
    }

    #[test]
    fn test_resume_payload_serialization() {
        let payload = ResumePayload {
            token: "token123".to_string(),
            session_id: "session456".to_string(),
            seq: 42,
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("session456"));
        assert!(json.contains("42"));
    }

    #[test]
    fn test_ready_payload_ignores_extras() {
        let ready: ReadyPayload = serde_json::from_str(
            r#"{
                "v": 6,
                "session_id": "abc",
                "user": {"id": "1", "username": "bot", "discriminator": "0000"},
                "guilds": []
            }"#,
        )
        .unwrap();
        assert_eq!(ready.session_id, "abc");
        assert_eq!(ready.user.username, "bot");
    }
}
