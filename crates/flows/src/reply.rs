//! Reply type returned by flow stage handlers.

use serde_json::Value;

/// One assistant reply produced by a stage handler.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowReply {
    /// Text to append to the transcript.
    pub message: String,
    /// Optional render payload for the presentation layer (e.g. which
    /// confirmation affordance to draw). Opaque to the orchestrator.
    pub side_channel: Option<Value>,
}

impl FlowReply {
    /// A plain text reply.
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            side_channel: None,
        }
    }

    /// A reply carrying a render payload.
    pub fn with_payload(message: impl Into<String>, payload: Value) -> Self {
        Self {
            message: message.into(),
            side_channel: Some(payload),
        }
    }
}
