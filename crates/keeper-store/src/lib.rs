//! SQLite storage for Keeper.
//!
//! This crate provides:
//! - Connection pool setup and idempotent schema bootstrap
//! - [`SecretStore`]: owner-scoped secret records with optimistic concurrency
//! - [`UserStore`]: accounts with unique logins
//!
//! Every query runs under a bounded timeout; secret content is opaque hex
//! ciphertext and is never interpreted here.

pub mod error;
pub mod model;
pub mod pool;
pub mod secrets;
pub mod users;

pub use error::{Result, StoreError};
pub use model::{NewSecret, Secret, SecretEdit, User};
pub use pool::{memory_pool, migrate, open_pool};
pub use secrets::{SecretStore, SqliteSecretStore};
pub use users::{SqliteUserStore, UserStore};

/// Default upper bound on a single query.
pub const DEFAULT_QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
