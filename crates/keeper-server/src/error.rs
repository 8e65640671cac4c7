//! Server error types.

use keeper_core::rpc::{codes, JsonRpcError};
use keeper_store::StoreError;
use thiserror::Error;

/// Errors that can occur while serving a call.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing or invalid bearer. The message never says which layer failed.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Method not found.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Invalid parameters.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Not found error.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stale optimistic-concurrency token.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Startup configuration rejected.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Get the JSON-RPC error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::Unauthenticated => codes::UNAUTHENTICATED,
            Self::MethodNotFound(_) => codes::METHOD_NOT_FOUND,
            Self::InvalidParams(_) => codes::INVALID_PARAMS,
            Self::NotFound(_) => codes::NOT_FOUND,
            Self::PreconditionFailed(_) => codes::FAILED_PRECONDITION,
            _ => codes::INTERNAL_ERROR,
        }
    }

    /// Convert into the wire error. Internal details stay in the logs.
    pub fn to_rpc_error(&self) -> JsonRpcError {
        let message = match self {
            Self::Internal(_) | Self::Io(_) | Self::Config(_) | Self::Json(_) => {
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        JsonRpcError::new(self.code(), message)
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            StoreError::PreconditionFailed(why) => Self::PreconditionFailed(why),
            StoreError::InvalidArgument(why) | StoreError::Conflict(why) => {
                Self::InvalidParams(why)
            }
            other => {
                tracing::error!(error = %other, "storage failure");
                Self::Internal(other.to_string())
            }
        }
    }
}
