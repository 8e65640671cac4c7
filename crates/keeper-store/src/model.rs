//! Stored records and their wire projections.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use keeper_core::messages::{SecretListItem, SecretMeta, SecretRecord};
use keeper_core::SecretType;
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// A secret as stored. `content` is hex ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    pub id: i64,
    pub user_id: Uuid,
    pub secret_type: SecretType,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a secret.
#[derive(Debug, Clone)]
pub struct NewSecret {
    pub secret_type: SecretType,
    pub title: String,
    pub content: String,
}

/// Input for editing a secret.
#[derive(Debug, Clone)]
pub struct SecretEdit {
    pub id: i64,
    pub secret_type: SecretType,
    pub title: String,
    pub content: String,
    /// Version the caller last saw.
    pub updated_at: DateTime<Utc>,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<Secret> for SecretMeta {
    fn from(s: Secret) -> Self {
        Self {
            id: s.id,
            title: s.title,
            secret_type: s.secret_type,
            created_at: s.created_at,
            updated_at: s.updated_at,
            deleted_at: s.deleted_at,
        }
    }
}

impl From<Secret> for SecretRecord {
    fn from(s: Secret) -> Self {
        Self {
            id: s.id,
            title: s.title,
            secret_type: s.secret_type,
            content: s.content,
            created_at: s.created_at,
            updated_at: s.updated_at,
            deleted_at: s.deleted_at,
        }
    }
}

impl From<Secret> for SecretListItem {
    fn from(s: Secret) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            type_id: s.secret_type,
            title: s.title,
            content: s.content,
            created_at: s.created_at,
            updated_at: s.updated_at,
            deleted_at: s.deleted_at,
        }
    }
}

/// Current time at the precision timestamps are stored with.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// The stored text form of a timestamp: RFC 3339, microseconds, `Z`.
pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::Internal(format!("bad stored timestamp '{value}': {e}")))
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| StoreError::Internal(format!("bad stored user id '{value}': {e}")))
}

/// The version following `previous`: now, but always strictly later.
pub(crate) fn next_version(previous: DateTime<Utc>) -> DateTime<Utc> {
    let bumped = previous.trunc_subsecs(6) + chrono::Duration::microseconds(1);
    now().max(bumped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_text_form() {
        let ts = DateTime::parse_from_rfc3339("2026-03-01T10:20:30.123456789Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_ts(ts), "2026-03-01T10:20:30.123456Z");
        assert_eq!(parse_ts(&format_ts(ts)).unwrap(), ts.trunc_subsecs(6));
    }

    #[test]
    fn test_next_version_is_strictly_later() {
        let future = now() + chrono::Duration::hours(1);
        let next = next_version(future);
        assert_eq!(next, future + chrono::Duration::microseconds(1));

        let past = now() - chrono::Duration::hours(1);
        assert!(next_version(past) > past + chrono::Duration::minutes(59));
    }
}
