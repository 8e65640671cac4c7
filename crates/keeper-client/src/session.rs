//! Login state and the background resync task tied to it.

use keeper_core::SecretString;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cache::LocalCache;
use crate::error::Result;
use crate::sync::{SyncEngine, SyncReport};
use crate::transport::RpcClient;

struct Periodic {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Register, log in and out, delete the account.
///
/// While logged in, a periodic task resyncs the cache every `sync_interval`.
pub struct UserSession {
    rpc: Arc<RpcClient>,
    cache: Arc<LocalCache>,
    sync: Arc<SyncEngine>,
    sync_interval: Duration,
    root: CancellationToken,
    periodic: Mutex<Option<Periodic>>,
}

impl UserSession {
    pub fn new(
        rpc: Arc<RpcClient>,
        cache: Arc<LocalCache>,
        sync: Arc<SyncEngine>,
        sync_interval: Duration,
        root: CancellationToken,
    ) -> Self {
        Self {
            rpc,
            cache,
            sync,
            sync_interval,
            root,
            periodic: Mutex::new(None),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.rpc.is_authenticated()
    }

    /// Create an account and log into it.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(&self, login: &str, password: &SecretString) -> Result<SyncReport> {
        self.rpc.register(login, password).await?;
        info!("registered");
        Ok(self.start().await)
    }

    /// Log in, fill the cache, and start periodic resync.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, login: &str, password: &SecretString) -> Result<SyncReport> {
        self.rpc.login(login, password).await?;
        info!("logged in");
        Ok(self.start().await)
    }

    /// Run one full resync now.
    pub async fn resync(&self) -> SyncReport {
        self.sync.sync_all().await
    }

    /// Forget the token, stop periodic resync and drop cached secrets.
    pub async fn logout(&self) {
        self.rpc.clear_token();
        self.stop_periodic().await;
        self.cache.clear();
        info!("logged out");
    }

    /// Delete the account on the server, then log out.
    pub async fn delete_account(&self) -> Result<()> {
        self.rpc.delete_user().await?;
        info!("account deleted");
        self.logout().await;
        Ok(())
    }

    /// Cancel every background task owned by this client.
    pub async fn shutdown(&self) {
        self.root.cancel();
        self.stop_periodic().await;
    }

    async fn start(&self) -> SyncReport {
        // A new identity never inherits the previous one's cache.
        self.cache.clear();
        let report = self.sync.sync_all().await;
        self.stop_periodic().await;

        if self.root.is_cancelled() {
            return report;
        }
        let cancel = self.root.child_token();
        let handle = self
            .sync
            .clone()
            .spawn_periodic(self.sync_interval, cancel.clone());
        *self.periodic.lock() = Some(Periodic { cancel, handle });
        report
    }

    async fn stop_periodic(&self) {
        let periodic = self.periodic.lock().take();
        if let Some(Periodic { cancel, handle }) = periodic {
            cancel.cancel();
            if let Err(e) = handle.await {
                warn!(error = %e, "periodic sync task ended abnormally");
            }
        }
    }

    /// Whether the periodic resync task is running.
    pub fn is_syncing(&self) -> bool {
        self.periodic
            .lock()
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }
}
