//! HS256 signed credentials naming a user.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use keeper_core::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::error::CredentialError;

/// Default credential lifetime: 14 days.
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Claims carried by a credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    /// Random per-credential id.
    pub jti: String,
}

/// Issues and verifies credentials with a shared HMAC secret.
#[derive(Clone)]
pub struct CredentialIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl CredentialIssuer {
    /// Create an issuer. An empty secret is rejected.
    pub fn new(secret: &SecretString, expiry: Duration) -> Result<Self, CredentialError> {
        if secret.is_empty() {
            return Err(CredentialError::Misconfigured(
                "signing secret is empty".to_string(),
            ));
        }
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);
        validation.validate_nbf = true;

        Ok(Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            expiry,
        })
    }

    /// Configured credential lifetime.
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Issue a credential for `subject`, valid from now.
    pub fn issue(&self, subject: Uuid) -> Result<String, CredentialError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a credential as if the current time were `now`.
    pub fn issue_at(&self, subject: Uuid, now: DateTime<Utc>) -> Result<String, CredentialError> {
        let expiry = chrono::Duration::from_std(self.expiry)
            .map_err(|e| CredentialError::Misconfigured(format!("expiry out of range: {e}")))?;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + expiry).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CredentialError::Signing(e.to_string()))
    }

    /// Verify a credential and return its subject.
    pub fn decode(&self, token: &str) -> Result<Uuid, CredentialError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "credential rejected");
            CredentialError::Invalid
        })?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| CredentialError::Invalid)
    }
}

impl fmt::Debug for CredentialIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialIssuer")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}
