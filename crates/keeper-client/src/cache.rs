//! In-memory cache of decrypted secrets.
//!
//! One partition per cacheable [`SecretType`]. Partitions are only ever
//! replaced whole, by the sync engine; there is no per-entry update.

use chrono::{DateTime, Utc};
use keeper_core::{SecretListing, SecretPayload, SecretType};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// A decrypted secret held locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSecret {
    pub id: i64,
    pub title: String,
    /// Version as last seen on the server.
    pub updated_at: DateTime<Utc>,
    pub payload: SecretPayload,
}

impl LocalSecret {
    pub fn secret_type(&self) -> SecretType {
        self.payload.secret_type()
    }

    pub fn listing(&self) -> SecretListing {
        SecretListing {
            id: self.id,
            title: self.title.clone(),
        }
    }
}

/// Errors replacing a partition.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("secrets of type {0} are not cached")]
    Uncached(SecretType),

    #[error("secret {id} is {actual} and cannot go in the {partition} partition")]
    TypeMismatch {
        id: i64,
        partition: SecretType,
        actual: SecretType,
    },
}

type Partition = BTreeMap<i64, LocalSecret>;

/// Thread-safe local cache. A single lock guards every partition.
#[derive(Debug, Default)]
pub struct LocalCache {
    partitions: Mutex<HashMap<SecretType, Partition>>,
}

impl LocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a secret by id in any partition.
    pub fn get(&self, id: i64) -> Option<LocalSecret> {
        let partitions = self.partitions.lock();
        SecretType::CACHED
            .iter()
            .filter_map(|t| partitions.get(t))
            .find_map(|p| p.get(&id).cloned())
    }

    /// Swap the whole partition for `secret_type`.
    ///
    /// Validation runs before the swap; on error the previous contents stay.
    pub fn replace_all(
        &self,
        secret_type: SecretType,
        entries: Vec<LocalSecret>,
    ) -> Result<(), CacheError> {
        if !secret_type.is_cached() {
            return Err(CacheError::Uncached(secret_type));
        }
        if let Some(bad) = entries.iter().find(|e| e.secret_type() != secret_type) {
            return Err(CacheError::TypeMismatch {
                id: bad.id,
                partition: secret_type,
                actual: bad.secret_type(),
            });
        }

        let partition: Partition = entries.into_iter().map(|e| (e.id, e)).collect();
        self.partitions.lock().insert(secret_type, partition);
        Ok(())
    }

    /// Id and title of every secret of `secret_type`, ordered by id.
    pub fn list_titles(&self, secret_type: SecretType) -> Vec<SecretListing> {
        self.partitions
            .lock()
            .get(&secret_type)
            .map(|p| p.values().map(LocalSecret::listing).collect())
            .unwrap_or_default()
    }

    /// Id and title of every cached secret, partition by partition.
    pub fn list_all(&self) -> Vec<SecretListing> {
        let partitions = self.partitions.lock();
        SecretType::CACHED
            .iter()
            .filter_map(|t| partitions.get(t))
            .flat_map(|p| p.values().map(LocalSecret::listing))
            .collect()
    }

    /// Total number of cached secrets.
    pub fn len(&self) -> usize {
        self.partitions.lock().values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached secret.
    pub fn clear(&self) {
        self.partitions.lock().clear();
    }
}
