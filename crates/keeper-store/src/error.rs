//! Storage error types.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Driver or pool failure.
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Record absent, or owned by another user.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Supplied version does not match the stored one.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Input rejected before reaching the database.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Query exceeded the configured bound.
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// Stored data could not be interpreted.
    #[error("Internal: {0}")]
    Internal(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
