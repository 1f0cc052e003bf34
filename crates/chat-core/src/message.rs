//! Message and transcript turn types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum accepted image attachment size (20 MB).
pub const MAX_IMAGE_BYTES: u64 = 20 * 1024 * 1024;

/// Maximum accepted video attachment size (1 GB).
pub const MAX_VIDEO_BYTES: u64 = 1024 * 1024 * 1024;

/// Role of a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// String form used when building classifier context.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One appended unit of the conversation transcript.
///
/// Turns are immutable once appended. The single exception is the
/// orchestrator's own in-progress streaming reply, which the
/// [`Transcript`](crate::Transcript) replaces in place until it is closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced this turn.
    pub role: Role,
    /// Text content of the turn.
    pub content: String,
    /// Opaque payload for the presentation layer (confirmation affordances
    /// and the like). The orchestrator never inspects it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side_channel: Option<Value>,
}

impl Turn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            side_channel: None,
        }
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            side_channel: None,
        }
    }

    /// Create an assistant turn carrying a side-channel render payload.
    pub fn assistant_with_payload(content: impl Into<String>, payload: Value) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            side_channel: Some(payload),
        }
    }
}

/// A media attachment on an inbound message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attachment {
    /// MIME content type (e.g. "image/jpeg", "video/mp4").
    pub content_type: String,
    /// Size of the attachment in bytes.
    pub size_bytes: u64,
    /// Local path to the attachment data, if materialized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl Attachment {
    /// Check if this attachment is an image.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    /// Check if this attachment is a video.
    pub fn is_video(&self) -> bool {
        self.content_type.starts_with("video/")
    }

    /// Validate the attachment against the per-type size limits.
    ///
    /// Returns a human-readable rejection reason for oversized or
    /// unsupported attachments.
    pub fn validate(&self) -> Result<(), String> {
        if self.is_image() {
            if self.size_bytes > MAX_IMAGE_BYTES {
                return Err(format!(
                    "Image is too large ({:.1} MB). Images must be 20 MB or smaller.",
                    self.size_bytes as f64 / (1024.0 * 1024.0)
                ));
            }
            Ok(())
        } else if self.is_video() {
            if self.size_bytes > MAX_VIDEO_BYTES {
                return Err(format!(
                    "Video is too large ({:.2} GB). Videos must be 1 GB or smaller.",
                    self.size_bytes as f64 / (1024.0 * 1024.0 * 1024.0)
                ));
            }
            Ok(())
        } else {
            Err(format!(
                "Unsupported attachment type: {}. Send an image or a video.",
                self.content_type
            ))
        }
    }
}

/// One inbound unit of user input.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    /// Raw text, possibly empty when only an attachment was sent.
    pub text: String,
    /// Optional media attachment.
    pub attachment: Option<Attachment>,
}

impl InboundMessage {
    /// Create a text-only inbound message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    /// Create an inbound message with an attachment.
    pub fn with_attachment(text: impl Into<String>, attachment: Attachment) -> Self {
        Self {
            text: text.into(),
            attachment: Some(attachment),
        }
    }

    /// Check if the message has any text content.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(size: u64) -> Attachment {
        Attachment {
            content_type: "image/jpeg".to_string(),
            size_bytes: size,
            file_path: Some("/tmp/a.jpg".to_string()),
        }
    }

    fn video(size: u64) -> Attachment {
        Attachment {
            content_type: "video/mp4".to_string(),
            size_bytes: size,
            file_path: Some("/tmp/a.mp4".to_string()),
        }
    }

    #[test]
    fn test_image_within_limit() {
        assert!(image(MAX_IMAGE_BYTES).validate().is_ok());
    }

    #[test]
    fn test_image_over_limit() {
        let err = image(MAX_IMAGE_BYTES + 1).validate().unwrap_err();
        assert!(err.contains("20 MB"));
    }

    #[test]
    fn test_video_over_limit() {
        // 1.2 GB video must be rejected with a size-exceeded error
        let err = video(1_288_490_189).validate().unwrap_err();
        assert!(err.contains("1 GB"));
    }

    #[test]
    fn test_video_within_limit() {
        assert!(video(MAX_VIDEO_BYTES).validate().is_ok());
    }

    #[test]
    fn test_unsupported_type() {
        let att = Attachment {
            content_type: "application/pdf".to_string(),
            size_bytes: 100,
            file_path: None,
        };
        assert!(att.validate().unwrap_err().contains("Unsupported"));
    }

    #[test]
    fn test_has_text() {
        assert!(InboundMessage::text("hi").has_text());
        assert!(!InboundMessage::text("   ").has_text());
    }

    #[test]
    fn test_turn_serialization_skips_empty_payload() {
        let turn = Turn::assistant("ok");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(!json.contains("side_channel"));

        let turn = Turn::assistant_with_payload("pick one", serde_json::json!({"kind": "buttons"}));
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("side_channel"));
    }
}
