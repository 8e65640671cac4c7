//! The fixed enumeration of secret kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind of a stored secret. The discriminant is the wire and database value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SecretType {
    /// Login and password pair.
    LoginPass = 1,
    /// Free text note.
    Text = 2,
    /// Arbitrary file contents.
    Binary = 3,
    /// Payment card.
    Card = 4,
}

/// Raised for wire values or names outside the enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown secret type: {0}")]
pub struct UnknownSecretType(pub String);

impl SecretType {
    /// Every secret type, in wire order.
    pub const ALL: [SecretType; 4] = [Self::LoginPass, Self::Text, Self::Binary, Self::Card];

    /// Types held by the client-side cache, in resync order.
    pub const CACHED: [SecretType; 3] = [Self::LoginPass, Self::Text, Self::Card];

    /// Numeric identifier used on the wire and in the database.
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Short human-readable name.
    pub fn title(self) -> &'static str {
        match self {
            Self::LoginPass => "login_pass",
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Card => "card",
        }
    }

    /// Whether decrypted secrets of this type live in the local cache.
    pub fn is_cached(self) -> bool {
        !matches!(self, Self::Binary)
    }
}

impl TryFrom<u32> for SecretType {
    type Error = UnknownSecretType;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::LoginPass),
            2 => Ok(Self::Text),
            3 => Ok(Self::Binary),
            4 => Ok(Self::Card),
            other => Err(UnknownSecretType(other.to_string())),
        }
    }
}

impl From<SecretType> for u32 {
    fn from(value: SecretType) -> Self {
        value.id()
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for SecretType {
    type Err = UnknownSecretType;

    /// Accepts the numeric id or a name (`login_pass`, `login-pass`, `auth`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = s.parse::<u32>() {
            return Self::try_from(id);
        }
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "login_pass" | "loginpass" | "auth" | "login" => Ok(Self::LoginPass),
            "text" => Ok(Self::Text),
            "binary" | "file" => Ok(Self::Binary),
            "card" => Ok(Self::Card),
            _ => Err(UnknownSecretType(s.to_string())),
        }
    }
}
