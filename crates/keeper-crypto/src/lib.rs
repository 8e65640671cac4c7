//! Cryptography for Keeper.
//!
//! - [`Cipher`]: AES-256-GCM over secret payloads and bearer tokens, hex output
//! - [`CredentialIssuer`]: HS256 signed credentials naming a user
//! - [`BearerSealer`]: the two combined into the opaque bearer string
//! - [`password`]: Argon2id password hashing for stored users

pub mod cipher;
pub mod credential;
pub mod envelope;
pub mod error;
pub mod password;

pub use cipher::Cipher;
pub use credential::{Claims, CredentialIssuer, DEFAULT_EXPIRY};
pub use envelope::BearerSealer;
pub use error::{CipherError, CredentialError, EnvelopeError, PasswordError};
