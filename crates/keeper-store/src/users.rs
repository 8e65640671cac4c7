//! Account repository.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::model::{format_ts, now, parse_ts, parse_uuid, User};

/// Account persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create an account. A taken login is a [`StoreError::Conflict`].
    async fn create(&self, login: &str, password_hash: &str) -> Result<User>;

    async fn find_by_login(&self, login: &str) -> Result<Option<User>>;

    async fn get(&self, id: Uuid) -> Result<Option<User>>;

    /// Remove the account and every secret it owns.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// SQLite-backed [`UserStore`].
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
    timeout: Duration,
}

impl SqliteUserStore {
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
        tokio::time::timeout(self.timeout, query)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    #[tracing::instrument(skip(self, password_hash))]
    async fn create(&self, login: &str, password_hash: &str) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now(),
        };

        let result = self
            .bounded(
                sqlx::query(
                    "INSERT INTO users (id, login, password_hash, created_at) VALUES (?, ?, ?, ?)",
                )
                .bind(user.id.to_string())
                .bind(&user.login)
                .bind(&user.password_hash)
                .bind(format_ts(user.created_at))
                .execute(&self.pool),
            )
            .await;

        match result {
            Ok(_) => {
                tracing::info!(user_id = %user.id, "user created");
                Ok(user)
            }
            Err(StoreError::Sqlx(sqlx::Error::Database(e))) if e.is_unique_violation() => Err(
                StoreError::Conflict(format!("login '{login}' is already taken")),
            ),
            Err(e) => Err(e),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_login(&self, login: &str) -> Result<Option<User>> {
        let row = self
            .bounded(
                sqlx::query(
                    "SELECT id, login, password_hash, created_at FROM users WHERE login = ?",
                )
                .bind(login)
                .fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let row = self
            .bounded(
                sqlx::query("SELECT id, login, password_hash, created_at FROM users WHERE id = ?")
                    .bind(id.to_string())
                    .fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = self
            .bounded(
                sqlx::query("DELETE FROM users WHERE id = ?")
                    .bind(id.to_string())
                    .execute(&self.pool),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {id}")));
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    let id: String = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(User {
        id: parse_uuid(&id)?,
        login: row.try_get("login")?,
        password_hash: row.try_get("password_hash")?,
        created_at: parse_ts(&created_at)?,
    })
}
