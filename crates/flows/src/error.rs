//! Error taxonomy for flow stage handlers.

use thiserror::Error;

/// Errors surfaced by a flow stage handler.
///
/// Every variant becomes exactly one assistant turn. The orchestrator
/// re-prompts or resets based on [`FlowError::resets_flow`]; handlers that
/// fail after committing state reset themselves before returning.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A required credential or setting is missing. Recoverable: the user
    /// can fix configuration and retry the same stage.
    #[error("{0}")]
    MissingConfig(String),

    /// Input did not validate (bad number, oversized media, malformed
    /// phone list). Recoverable: the same stage re-prompts.
    #[error("{0}")]
    Invalid(String),

    /// An external call failed. The owning handler has already reset the
    /// flow if state had been committed.
    #[error("{0}")]
    External(String),

    /// The classifier returned an unexpected label mid-sequence. Treated
    /// like a validation error, never fatal.
    #[error("{0}")]
    Ambiguous(String),
}

impl FlowError {
    /// Whether the orchestrator should drop the active flow after
    /// surfacing this error.
    pub fn resets_flow(&self) -> bool {
        matches!(self, FlowError::External(_))
    }
}
