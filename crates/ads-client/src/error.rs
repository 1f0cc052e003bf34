//! Error types for advertising-platform operations.

use thiserror::Error;

/// Errors that can occur when talking to the advertising platform.
#[derive(Debug, Error)]
pub enum AdsError {
    /// A required credential or setting is missing.
    ///
    /// The message names the missing setting and how to provide it, so it
    /// can be surfaced to the user verbatim.
    #[error("missing configuration: {0}")]
    MissingSetting(String),

    /// The HTTP request could not be sent or completed.
    #[error("network error: {0}")]
    Network(String),

    /// The platform rejected the request.
    #[error("platform error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The platform responded with something we could not parse.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Media validation or upload failed.
    #[error("upload failed: {0}")]
    Upload(String),
}

impl AdsError {
    /// Human-readable failure reason plus a short checklist of likely causes.
    ///
    /// Used when surfacing external-call failures into the conversation.
    pub fn user_message(&self) -> String {
        match self {
            AdsError::MissingSetting(msg) => msg.clone(),
            other => format!(
                "{}\n\nThings to check:\n\
                 - the ad account token is still valid\n\
                 - the account has permission for this operation\n\
                 - the platform is reachable from this machine",
                other
            ),
        }
    }
}
