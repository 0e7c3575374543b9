//! Gateway envelope format
//!
//! Every unit of gateway traffic is one envelope: operation code, optional
//! payload, and - for dispatches - a sequence number and event tag.

use super::{IdentifyPayload, OpCode, ResumePayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway envelope
///
/// All traffic in both directions follows this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Operation code
    pub op: OpCode,

    /// Event payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event tag (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl Envelope {
    /// Create a Dispatch envelope (op=0)
    #[must_use]
    pub fn dispatch(event_tag: impl Into<String>, sequence: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            d: Some(data),
            s: Some(sequence),
            t: Some(event_tag.into()),
        }
    }

    /// Create a Heartbeat envelope (op=1) carrying the last-seen sequence
    #[must_use]
    pub fn heartbeat(last_sequence: u64) -> Self {
        Self {
            op: OpCode::Heartbeat,
            d: Some(Value::Number(last_sequence.into())),
            s: None,
            t: None,
        }
    }

    /// Create an Identify envelope (op=2)
    #[must_use]
    pub fn identify(payload: &IdentifyPayload) -> Self {
        Self {
            op: OpCode::Identify,
            d: Some(serde_json::to_value(payload).unwrap_or_default()),
            s: None,
            t: None,
        }
    }

    /// Create a Resume envelope (op=6)
    #[must_use]
    pub fn resume(payload: &ResumePayload) -> Self {
        Self {
            op: OpCode::Resume,
            d: Some(serde_json::to_value(payload).unwrap_or_default()),
            s: None,
            t: None,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "Envelope(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "Envelope(op={})", self.op)
        }
    }
}
