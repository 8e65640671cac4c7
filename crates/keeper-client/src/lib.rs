//! Client library for Keeper.
//!
//! This crate provides:
//! - A typed JSON-RPC client with a pluggable transport (HTTP by default)
//! - Client-side encryption of secret contents
//! - A local cache of decrypted secrets, kept fresh by a sync engine
//! - User session handling with background resync

pub mod cache;
pub mod error;
pub mod service;
pub mod session;
pub mod sync;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheError, LocalCache, LocalSecret};
pub use error::{ClientError, Result};
pub use service::SecretClientService;
pub use session::UserSession;
pub use sync::{SyncEngine, SyncReport};
pub use transport::{HttpTransport, RpcClient, RpcTransport};

use keeper_core::Config;
use keeper_crypto::Cipher;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Every client component wired together over one transport.
pub struct KeeperClient {
    rpc: Arc<RpcClient>,
    cache: Arc<LocalCache>,
    sync: Arc<SyncEngine>,
    secrets: SecretClientService,
    session: UserSession,
}

impl KeeperClient {
    /// Build a client talking HTTP to `config.client.server_url`.
    pub fn new(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(
            &config.client.server_url,
            Duration::from_secs(config.client.request_timeout_secs),
        )?;
        let cipher = Cipher::from_config(&config.cipher)?;

        Ok(Self::with_transport(
            Arc::new(transport),
            cipher,
            Duration::from_secs(config.client.sync_interval_secs),
        ))
    }

    /// Build a client over an arbitrary transport.
    pub fn with_transport(
        transport: Arc<dyn RpcTransport>,
        cipher: Cipher,
        sync_interval: Duration,
    ) -> Self {
        let rpc = Arc::new(RpcClient::new(transport));
        let cipher = Arc::new(cipher);
        let cache = Arc::new(LocalCache::new());
        let sync = Arc::new(SyncEngine::new(rpc.clone(), cipher.clone(), cache.clone()));

        let secrets = SecretClientService::new(rpc.clone(), cipher, cache.clone(), sync.clone());
        let session = UserSession::new(
            rpc.clone(),
            cache.clone(),
            sync.clone(),
            sync_interval,
            CancellationToken::new(),
        );

        Self {
            rpc,
            cache,
            sync,
            secrets,
            session,
        }
    }

    pub fn secrets(&self) -> &SecretClientService {
        &self.secrets
    }

    pub fn session(&self) -> &UserSession {
        &self.session
    }

    pub fn cache(&self) -> &Arc<LocalCache> {
        &self.cache
    }

    pub fn sync(&self) -> &Arc<SyncEngine> {
        &self.sync
    }

    /// The raw RPC client, for calls the services do not wrap.
    pub fn rpc(&self) -> &Arc<RpcClient> {
        &self.rpc
    }
}
