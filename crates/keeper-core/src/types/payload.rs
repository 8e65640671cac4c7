//! Decrypted secret payload shapes.
//!
//! A payload is serialized to JSON and then encrypted before it leaves the
//! client; the secret's type travels alongside it in clear so the receiver
//! knows which shape to decode.

use super::SecretType;
use crate::secret::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Login and password pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPass {
    pub login: String,
    pub password: SecretString,
}

/// Free text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNote {
    pub text: String,
}

/// Payment card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub card_number: String,
    pub cvv: SecretString,
    /// Expiry in the form printed on the card, e.g. `12/27`.
    pub due: String,
}

/// Decrypted content of a cacheable secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretPayload {
    LoginPass(LoginPass),
    Text(TextNote),
    Card(Card),
}

/// Errors converting between plaintext bytes and a [`SecretPayload`].
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("secrets of type {0} have no structured payload")]
    Unstructured(SecretType),

    #[error("malformed {kind} payload: {source}")]
    Malformed {
        kind: SecretType,
        #[source]
        source: serde_json::Error,
    },
}

impl SecretPayload {
    /// The secret type this payload belongs to.
    pub fn secret_type(&self) -> SecretType {
        match self {
            Self::LoginPass(_) => SecretType::LoginPass,
            Self::Text(_) => SecretType::Text,
            Self::Card(_) => SecretType::Card,
        }
    }

    /// Serialize to the plaintext bytes that get encrypted.
    pub fn to_plaintext(&self) -> Vec<u8> {
        let result = match self {
            Self::LoginPass(p) => serde_json::to_vec(p),
            Self::Text(p) => serde_json::to_vec(p),
            Self::Card(p) => serde_json::to_vec(p),
        };
        result.expect("payload structs of strings always serialize")
    }

    /// Decode plaintext bytes according to the type tag.
    pub fn from_plaintext(kind: SecretType, plaintext: &[u8]) -> Result<Self, PayloadError> {
        let malformed = |source| PayloadError::Malformed { kind, source };
        match kind {
            SecretType::LoginPass => serde_json::from_slice(plaintext)
                .map(Self::LoginPass)
                .map_err(malformed),
            SecretType::Text => serde_json::from_slice(plaintext)
                .map(Self::Text)
                .map_err(malformed),
            SecretType::Card => serde_json::from_slice(plaintext)
                .map(Self::Card)
                .map_err(malformed),
            SecretType::Binary => Err(PayloadError::Unstructured(kind)),
        }
    }
}

/// Id and title projection used for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretListing {
    pub id: i64,
    pub title: String,
}
