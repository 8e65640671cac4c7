//! Bearer-token gate in front of protected methods.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use keeper_crypto::BearerSealer;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ServerError;
use crate::Result;

/// Verifies `Authorization: Bearer <token>` values.
///
/// The token is a cipher-wrapped signed credential. Any failure along the way
/// (missing header, wrong scheme, cipher, signature, expiry, subject) yields
/// the same [`ServerError::Unauthenticated`].
#[derive(Clone)]
pub struct AuthGate {
    sealer: Arc<BearerSealer>,
}

impl AuthGate {
    pub fn new(sealer: Arc<BearerSealer>) -> Self {
        Self { sealer }
    }

    pub fn sealer(&self) -> &BearerSealer {
        &self.sealer
    }

    /// Resolve the caller from a raw `Authorization` header value.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<Uuid> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(ServerError::Unauthenticated)?;

        self.sealer.open(token).map_err(|e| {
            tracing::debug!(error = %e, "bearer rejected");
            ServerError::Unauthenticated
        })
    }
}

/// Extract the raw `Authorization` header value.
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_core::SecretString;
    use keeper_crypto::{Cipher, CredentialIssuer, DEFAULT_EXPIRY};

    fn gate() -> AuthGate {
        let issuer = CredentialIssuer::new(&SecretString::new("k"), DEFAULT_EXPIRY).unwrap();
        AuthGate::new(Arc::new(BearerSealer::new(Cipher::default(), issuer)))
    }

    #[test]
    fn test_valid_bearer() {
        let gate = gate();
        let user = Uuid::new_v4();
        let header = format!("Bearer {}", gate.sealer().seal(user).unwrap());
        assert_eq!(gate.authorize(Some(&header)).unwrap(), user);

        let lower = format!("bearer {}", gate.sealer().seal(user).unwrap());
        assert_eq!(gate.authorize(Some(&lower)).unwrap(), user);
    }

    #[test]
    fn test_every_failure_is_unauthenticated() {
        let gate = gate();
        let raw_jwt = gate.sealer().issuer().issue(Uuid::new_v4()).unwrap();
        let wrapped_junk = gate.sealer().cipher().encode(b"junk");
        let sealed = gate.sealer().seal(Uuid::new_v4()).unwrap();

        let cases = [
            None,
            Some(String::new()),
            Some("Bearer".to_string()),
            Some(format!("Basic {sealed}")),
            Some(format!("Bearer {raw_jwt}")),
            Some(format!("Bearer {wrapped_junk}")),
            Some("Bearer deadbeef".to_string()),
        ];
        for case in cases {
            let err = gate.authorize(case.as_deref()).unwrap_err();
            assert!(matches!(err, ServerError::Unauthenticated));
            assert_eq!(err.to_string(), "unauthenticated");
        }
    }

    #[test]
    fn test_header_extraction() {
        let mut headers = HeaderMap::new();
        assert!(authorization_header(&headers).is_none());
        headers.insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(authorization_header(&headers), Some("Bearer abc"));
    }
}
