//! Client error types.

use keeper_core::rpc::{codes, JsonRpcError};
use keeper_core::{PayloadError, SecretType};
use keeper_crypto::CipherError;
use thiserror::Error;

use crate::cache::CacheError;

/// Errors surfaced by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A protected call was attempted without logging in first.
    #[error("not logged in")]
    NotAuthorized,

    /// The server rejected the bearer token.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The server's version of a secret moved on since it was read.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// An edit lost to a newer version; the cache has been refreshed.
    #[error("secret {id} was changed elsewhere; the local copy has been refreshed")]
    Conflict { id: i64 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("secret {id} is {actual}, expected {expected}")]
    WrongType {
        id: i64,
        expected: &'static str,
        actual: SecretType,
    },

    /// Any other JSON-RPC error.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<JsonRpcError> for ClientError {
    fn from(err: JsonRpcError) -> Self {
        match err.code {
            codes::UNAUTHENTICATED => Self::Unauthenticated(err.message),
            codes::NOT_FOUND => Self::NotFound(err.message),
            codes::FAILED_PRECONDITION => Self::PreconditionFailed(err.message),
            codes::INVALID_PARAMS => Self::InvalidArgument(err.message),
            _ => Self::Rpc(err),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
