//! Error types for orchestrator construction and wiring.

use thiserror::Error;

use chat_core::CoreError;

/// Errors that can occur while building the orchestrator.
///
/// Dispatch itself never fails with these: once running, every failure is
/// turned into an assistant turn instead.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A required setting was missing or invalid during construction.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A core service could not be built.
    #[error("service error: {0}")]
    Core(#[from] CoreError),

    /// The catalog store could not be opened or migrated.
    #[error("catalog store error: {0}")]
    Store(#[from] catalog_store::StoreError),
}
