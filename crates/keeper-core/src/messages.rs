//! Request and response messages for every RPC method.
//!
//! `content` fields always carry hex-encoded ciphertext produced by the
//! client-side cipher; neither the wire nor the server ever sees plaintext.

use crate::secret::SecretString;
use crate::types::SecretType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Method names exposed by the server.
pub mod methods {
    pub const LOGIN: &str = "User.Login";
    pub const REGISTER: &str = "User.Register";
    pub const DELETE_USER: &str = "User.Delete";
    pub const CREATE_SECRET: &str = "Secret.CreateSecret";
    pub const GET_SECRET: &str = "Secret.GetSecret";
    pub const DELETE_SECRET: &str = "Secret.DeleteSecret";
    pub const EDIT_SECRET: &str = "Secret.EditSecret";
    pub const LIST_SECRETS_BY_TYPE: &str = "Secret.GetListOfSecretsByType";
    pub const LIST_SECRET_TYPES: &str = "SecretType.GetSecretTypesList";

    /// Methods reachable without a bearer credential.
    pub const UNPROTECTED: &[&str] = &[LOGIN, REGISTER];
}

/// Login or registration input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub login: String,
    pub password: SecretString,
}

/// Bearer token minted by login or registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Result of calls that return nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Empty {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSecretRequest {
    pub title: String,
    #[serde(rename = "type")]
    pub secret_type: SecretType,
    pub content: String,
}

/// Server-authoritative metadata returned by create and edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretMeta {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub secret_type: SecretType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SecretIdRequest {
    pub id: i64,
}

/// A single secret including its ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub secret_type: SecretType,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditSecretRequest {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub secret_type: SecretType,
    pub content: String,
    /// The version the caller believes is current.
    pub updated_at: DateTime<Utc>,
    /// Skip the version check and overwrite unconditionally.
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListSecretsByTypeRequest {
    pub type_id: SecretType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretListItem {
    pub id: i64,
    pub user_id: Uuid,
    pub type_id: SecretType,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListSecretsByTypeResponse {
    pub secrets: Vec<SecretListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretTypeInfo {
    pub id: u32,
    pub title: String,
}

impl From<SecretType> for SecretTypeInfo {
    fn from(value: SecretType) -> Self {
        Self {
            id: value.id(),
            title: value.title().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretTypesListResponse {
    pub types: Vec<SecretTypeInfo>,
}
