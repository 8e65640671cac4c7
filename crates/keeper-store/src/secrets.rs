//! Owner-scoped secret repository.

use async_trait::async_trait;
use keeper_core::SecretType;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::model::{format_ts, next_version, now, parse_ts, parse_uuid, NewSecret, Secret, SecretEdit};

/// Attempts a forced edit makes before giving up on a contended row.
const FORCED_EDIT_ATTEMPTS: usize = 3;

/// Secret persistence. Every operation is scoped to `owner`; another user's
/// secret is indistinguishable from a missing one.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Store a new secret; id and timestamps are assigned here.
    async fn create(&self, owner: Uuid, secret: NewSecret) -> Result<Secret>;

    async fn get(&self, owner: Uuid, id: i64) -> Result<Secret>;

    async fn delete(&self, owner: Uuid, id: i64) -> Result<()>;

    /// Replace title, type and content if `edit.updated_at` is still current,
    /// or unconditionally when `force` is set. The stored version advances.
    async fn edit(&self, owner: Uuid, edit: SecretEdit, force: bool) -> Result<Secret>;

    async fn list_by_type(&self, owner: Uuid, secret_type: SecretType) -> Result<Vec<Secret>>;
}

/// SQLite-backed [`SecretStore`].
#[derive(Clone)]
pub struct SqliteSecretStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteSecretStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_timeout(pool, crate::DEFAULT_QUERY_TIMEOUT)
    }

    pub fn with_timeout(pool: SqlitePool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn bounded<T, F>(&self, query: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "secret query timed out");
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }

    async fn fetch(&self, owner: Uuid, id: i64) -> Result<Option<Secret>> {
        let row = self
            .bounded(
                sqlx::query(
                    r#"
                    SELECT id, user_id, type_id, title, content, created_at, updated_at, deleted_at
                    FROM secrets
                    WHERE id = ? AND user_id = ? AND deleted_at IS NULL
                    "#,
                )
                .bind(id)
                .bind(owner.to_string())
                .fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(secret_from_row).transpose()
    }
}

#[async_trait]
impl SecretStore for SqliteSecretStore {
    #[tracing::instrument(skip(self, secret), fields(owner = %owner, secret_type = %secret.secret_type))]
    async fn create(&self, owner: Uuid, secret: NewSecret) -> Result<Secret> {
        validate_content(&secret.content)?;
        let ts = now();

        let result = self
            .bounded(
                sqlx::query(
                    r#"
                    INSERT INTO secrets (user_id, type_id, title, content, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(owner.to_string())
                .bind(secret.secret_type.id())
                .bind(&secret.title)
                .bind(&secret.content)
                .bind(format_ts(ts))
                .bind(format_ts(ts))
                .execute(&self.pool),
            )
            .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, "secret created");

        Ok(Secret {
            id,
            user_id: owner,
            secret_type: secret.secret_type,
            title: secret.title,
            content: secret.content,
            created_at: ts,
            updated_at: ts,
            deleted_at: None,
        })
    }

    #[tracing::instrument(skip(self), fields(owner = %owner))]
    async fn get(&self, owner: Uuid, id: i64) -> Result<Secret> {
        self.fetch(owner, id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("secret {id}")))
    }

    #[tracing::instrument(skip(self), fields(owner = %owner))]
    async fn delete(&self, owner: Uuid, id: i64) -> Result<()> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM secrets WHERE id = ? AND user_id = ?")
                    .bind(id)
                    .bind(owner.to_string())
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("secret {id}")));
        }
        tracing::debug!(id, "secret deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self, edit), fields(owner = %owner, id = edit.id))]
    async fn edit(&self, owner: Uuid, edit: SecretEdit, force: bool) -> Result<Secret> {
        validate_content(&edit.content)?;

        for attempt in 1..=FORCED_EDIT_ATTEMPTS {
            let current = self.get(owner, edit.id).await?;
            let seen = format_ts(current.updated_at);

            if !force && seen != format_ts(edit.updated_at) {
                tracing::debug!(stored = %seen, "stale edit rejected");
                return Err(StoreError::PreconditionFailed(format!(
                    "secret {} was modified at {seen}",
                    edit.id
                )));
            }

            let updated_at = next_version(current.updated_at);
            let result = self
                .bounded(
                    sqlx::query(
                        r#"
                        UPDATE secrets
                        SET type_id = ?, title = ?, content = ?, updated_at = ?
                        WHERE id = ? AND user_id = ? AND updated_at = ? AND deleted_at IS NULL
                        "#,
                    )
                    .bind(edit.secret_type.id())
                    .bind(&edit.title)
                    .bind(&edit.content)
                    .bind(format_ts(updated_at))
                    .bind(edit.id)
                    .bind(owner.to_string())
                    .bind(&seen)
                    .execute(&self.pool),
                )
                .await?;

            if result.rows_affected() == 1 {
                tracing::debug!(updated_at = %format_ts(updated_at), "secret edited");
                return Ok(Secret {
                    secret_type: edit.secret_type,
                    title: edit.title,
                    content: edit.content,
                    updated_at,
                    ..current
                });
            }

            if !force {
                return Err(StoreError::PreconditionFailed(format!(
                    "secret {} was modified concurrently",
                    edit.id
                )));
            }
            tracing::debug!(attempt, "forced edit lost a race, retrying");
        }

        Err(StoreError::PreconditionFailed(format!(
            "secret {} kept changing during a forced edit",
            edit.id
        )))
    }

    #[tracing::instrument(skip(self), fields(owner = %owner, secret_type = %secret_type))]
    async fn list_by_type(&self, owner: Uuid, secret_type: SecretType) -> Result<Vec<Secret>> {
        let rows = self
            .bounded(
                sqlx::query(
                    r#"
                    SELECT id, user_id, type_id, title, content, created_at, updated_at, deleted_at
                    FROM secrets
                    WHERE user_id = ? AND type_id = ? AND deleted_at IS NULL
                    ORDER BY id
                    "#,
                )
                .bind(owner.to_string())
                .bind(secret_type.id())
                .fetch_all(&self.pool),
            )
            .await?;

        rows.iter().map(secret_from_row).collect()
    }
}

fn validate_content(content: &str) -> Result<()> {
    if content.is_empty() || hex::decode(content).is_err() {
        return Err(StoreError::InvalidArgument(
            "content must be hex-encoded ciphertext".to_string(),
        ));
    }
    Ok(())
}

fn secret_from_row(row: &SqliteRow) -> Result<Secret> {
    let type_id: u32 = row.try_get("type_id")?;
    let secret_type = SecretType::try_from(type_id)
        .map_err(|e| StoreError::Internal(format!("stored secret has {e}")))?;
    let user_id: String = row.try_get("user_id")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    let deleted_at: Option<String> = row.try_get("deleted_at")?;

    Ok(Secret {
        id: row.try_get("id")?,
        user_id: parse_uuid(&user_id)?,
        secret_type,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
        deleted_at: deleted_at.as_deref().map(parse_ts).transpose()?,
    })
}
