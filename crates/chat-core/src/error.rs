//! Error types for channel service operations.

use thiserror::Error;

/// Errors that can occur in the channel's external services
/// (intent classification, field extraction, streamed replies).
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required setting is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A network request failed.
    #[error("network error: {0}")]
    Network(String),

    /// The service responded but the response could not be used.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// The operation was cancelled (e.g. a reset fired mid-stream).
    #[error("operation cancelled")]
    Cancelled,
}
