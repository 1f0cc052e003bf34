//! Error types for the catalog store.

use thiserror::Error;

/// Convenience result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the catalog store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database error.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration failure.
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be interpreted.
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}
