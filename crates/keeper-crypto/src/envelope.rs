//! Bearer tokens: a signed credential wrapped by the payload cipher.
//!
//! Only the wrapped form ever crosses the wire. Opening reverses the two
//! layers; a failure in either is reported the same way to callers.

use uuid::Uuid;

use crate::cipher::Cipher;
use crate::credential::CredentialIssuer;
use crate::error::EnvelopeError;

/// Seals user ids into bearer tokens and opens them again.
#[derive(Debug, Clone)]
pub struct BearerSealer {
    cipher: Cipher,
    issuer: CredentialIssuer,
}

impl BearerSealer {
    pub fn new(cipher: Cipher, issuer: CredentialIssuer) -> Self {
        Self { cipher, issuer }
    }

    /// Issue a credential for `subject` and wrap it.
    pub fn seal(&self, subject: Uuid) -> Result<String, EnvelopeError> {
        let credential = self.issuer.issue(subject)?;
        Ok(self.cipher.encode(credential.as_bytes()))
    }

    /// Unwrap and verify a bearer token, returning the user id it names.
    pub fn open(&self, bearer: &str) -> Result<Uuid, EnvelopeError> {
        let credential = self.cipher.decode_utf8(bearer)?;
        Ok(self.issuer.decode(&credential)?)
    }

    pub fn cipher(&self) -> &Cipher {
        &self.cipher
    }

    pub fn issuer(&self) -> &CredentialIssuer {
        &self.issuer
    }
}
