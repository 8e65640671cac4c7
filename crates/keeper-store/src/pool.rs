//! Pool creation and schema bootstrap.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;

use crate::error::{Result, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        login TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS secrets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        type_id INTEGER NOT NULL,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_secrets_user_type ON secrets(user_id, type_id)",
];

/// Create a pool with WAL mode and foreign keys enforced.
///
/// In-memory URLs are routed to [`memory_pool`] so every query sees the same
/// database.
#[tracing::instrument(skip(database_url))]
pub async fn open_pool(database_url: &str) -> Result<SqlitePool> {
    if database_url.contains(":memory:") {
        return memory_pool().await;
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StoreError::Internal(format!("Invalid database URL: {e}")))?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;

    tracing::debug!("database pool created");
    Ok(pool)
}

/// Create a single-connection in-memory pool that lives as long as the pool.
pub async fn memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| StoreError::Internal(format!("Invalid database URL: {e}")))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    tracing::debug!("in-memory database pool created");
    Ok(pool)
}

/// Create tables and indexes if they do not exist yet.
#[tracing::instrument(skip(pool))]
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("database schema ready");
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = memory_pool().await.unwrap();
    migrate(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let pool = memory_pool().await.unwrap();
        migrate(&pool).await.unwrap();
        migrate(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'secrets')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_open_pool_file() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("keeper.db").display());

        let pool = open_pool(&url).await.unwrap();
        migrate(&pool).await.unwrap();
        pool.close().await;

        assert!(dir.path().join("keeper.db").exists());
    }
}
