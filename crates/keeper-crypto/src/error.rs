//! Error types for Keeper cryptography.

use thiserror::Error;

/// Payload cipher errors.
#[derive(Debug, Error)]
pub enum CipherError {
    /// Malformed hex or failed tag verification. Deliberately carries no detail.
    #[error("ciphertext could not be decoded")]
    Decode,

    #[error("invalid cipher key: {0}")]
    InvalidKey(String),

    #[error("decoded plaintext is not UTF-8")]
    NotUtf8,
}

/// Signed credential errors.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Signing secret missing. Fatal at startup.
    #[error("credential issuer misconfigured: {0}")]
    Misconfigured(String),

    #[error("failed to sign credential: {0}")]
    Signing(String),

    /// Malformed, expired, not yet valid, wrong algorithm, bad signature, or bad subject.
    #[error("invalid credential")]
    Invalid,
}

/// Bearer envelope errors. Either layer failing means the caller is unauthenticated.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Password hashing errors.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),
}
