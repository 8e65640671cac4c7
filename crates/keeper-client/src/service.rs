//! Secret operations as the user sees them.
//!
//! Plaintext never leaves this module unencrypted. Reads are served from the
//! local cache when possible; every successful mutation is followed by a full
//! resync so the cache reflects server state.

use chrono::{DateTime, Utc};
use keeper_core::messages::{CreateSecretRequest, EditSecretRequest, SecretMeta, SecretTypeInfo};
use keeper_core::{SecretListing, SecretPayload, SecretType};
use keeper_crypto::Cipher;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{LocalCache, LocalSecret};
use crate::error::{ClientError, Result};
use crate::sync::SyncEngine;
use crate::transport::RpcClient;

/// Create, read, edit, delete and list secrets.
pub struct SecretClientService {
    rpc: Arc<RpcClient>,
    cipher: Arc<Cipher>,
    cache: Arc<LocalCache>,
    sync: Arc<SyncEngine>,
}

impl SecretClientService {
    pub fn new(
        rpc: Arc<RpcClient>,
        cipher: Arc<Cipher>,
        cache: Arc<LocalCache>,
        sync: Arc<SyncEngine>,
    ) -> Self {
        Self {
            rpc,
            cipher,
            cache,
            sync,
        }
    }

    /// Encrypt `plaintext` and store it as a new secret.
    #[tracing::instrument(skip(self, plaintext))]
    pub async fn create(
        &self,
        title: &str,
        secret_type: SecretType,
        plaintext: &[u8],
    ) -> Result<SecretMeta> {
        let request = CreateSecretRequest {
            title: title.to_string(),
            secret_type,
            content: self.cipher.encode(plaintext),
        };
        let meta = self.rpc.create_secret(&request).await?;
        info!(id = meta.id, "secret created");

        self.sync.sync_all().await;
        Ok(meta)
    }

    pub async fn create_payload(&self, title: &str, payload: &SecretPayload) -> Result<SecretMeta> {
        self.create(title, payload.secret_type(), &payload.to_plaintext())
            .await
    }

    pub async fn create_binary(&self, title: &str, bytes: &[u8]) -> Result<SecretMeta> {
        self.create(title, SecretType::Binary, bytes).await
    }

    /// Fetch a structured secret, from the cache when present.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<LocalSecret> {
        if let Some(secret) = self.cache.get(id) {
            debug!("cache hit");
            return Ok(secret);
        }

        let record = self.rpc.get_secret(id).await?;
        if record.secret_type == SecretType::Binary {
            return Err(ClientError::WrongType {
                id,
                expected: "a structured secret",
                actual: record.secret_type,
            });
        }

        let plaintext = self.cipher.decode(&record.content)?;
        let payload = SecretPayload::from_plaintext(record.secret_type, &plaintext)?;
        Ok(LocalSecret {
            id: record.id,
            title: record.title,
            updated_at: record.updated_at,
            payload,
        })
    }

    /// The version of secret `id` this client last saw, for use as the
    /// `updated_at` of an edit.
    pub async fn version(&self, id: i64) -> Result<DateTime<Utc>> {
        match self.cache.get(id) {
            Some(secret) => Ok(secret.updated_at),
            None => Ok(self.rpc.get_secret(id).await?.updated_at),
        }
    }

    /// Fetch a binary secret and write its bytes to `dest`.
    ///
    /// Returns the number of bytes written.
    #[tracing::instrument(skip(self, dest))]
    pub async fn get_binary(&self, id: i64, dest: impl AsRef<Path>) -> Result<usize> {
        let record = self.rpc.get_secret(id).await?;
        if record.secret_type != SecretType::Binary {
            return Err(ClientError::WrongType {
                id,
                expected: "binary",
                actual: record.secret_type,
            });
        }

        let bytes = self.cipher.decode(&record.content)?;
        tokio::fs::write(dest.as_ref(), &bytes).await?;
        Ok(bytes.len())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.rpc.delete_secret(id).await?;
        info!("secret deleted");

        self.cache.clear();
        self.sync.sync_all().await;
        Ok(())
    }

    /// Replace a secret's title, type and content.
    ///
    /// `updated_at` is the version the caller last saw. A stale version
    /// without `force` refreshes the cache and yields [`ClientError::Conflict`].
    #[tracing::instrument(skip(self, title, plaintext))]
    pub async fn edit(
        &self,
        id: i64,
        title: &str,
        secret_type: SecretType,
        plaintext: &[u8],
        updated_at: DateTime<Utc>,
        force: bool,
    ) -> Result<SecretMeta> {
        let request = EditSecretRequest {
            id,
            title: title.to_string(),
            secret_type,
            content: self.cipher.encode(plaintext),
            updated_at,
            force,
        };

        match self.rpc.edit_secret(&request).await {
            Ok(meta) => {
                self.sync.sync_all().await;
                Ok(meta)
            }
            Err(ClientError::PreconditionFailed(reason)) => {
                info!(%reason, "edit lost to a newer version, resyncing");
                self.sync.sync_all().await;
                Err(ClientError::Conflict { id })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn edit_payload(
        &self,
        id: i64,
        title: &str,
        payload: &SecretPayload,
        updated_at: DateTime<Utc>,
        force: bool,
    ) -> Result<SecretMeta> {
        self.edit(
            id,
            title,
            payload.secret_type(),
            &payload.to_plaintext(),
            updated_at,
            force,
        )
        .await
    }

    /// Titles of every secret of `secret_type`.
    ///
    /// Served from the cache; an empty partition (always the case for binary
    /// secrets) falls back to the server listing.
    pub async fn list(&self, secret_type: SecretType) -> Result<Vec<SecretListing>> {
        let cached = self.cache.list_titles(secret_type);
        if !cached.is_empty() {
            return Ok(cached);
        }

        let response = self.rpc.list_secrets_by_type(secret_type).await?;
        let mut listing: Vec<SecretListing> = response
            .secrets
            .into_iter()
            .map(|item| SecretListing {
                id: item.id,
                title: item.title,
            })
            .collect();
        listing.sort_by_key(|l| l.id);
        Ok(listing)
    }

    pub async fn secret_types(&self) -> Result<Vec<SecretTypeInfo>> {
        Ok(self.rpc.secret_types().await?.types)
    }
}
