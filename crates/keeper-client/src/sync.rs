//! Pulls secrets from the server into the local cache.

use keeper_core::messages::SecretListItem;
use keeper_core::{SecretPayload, SecretType};
use keeper_crypto::Cipher;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{LocalCache, LocalSecret};
use crate::error::Result;
use crate::transport::RpcClient;

/// Outcome of a [`SyncEngine::sync_all`] pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Types whose partition was replaced, with the number of entries.
    pub synced: Vec<(SecretType, usize)>,

    /// Types that failed, with the reason. Their partitions were left as is.
    pub failed: Vec<(SecretType, String)>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Refreshes cache partitions from the server.
pub struct SyncEngine {
    rpc: Arc<RpcClient>,
    cipher: Arc<Cipher>,
    cache: Arc<LocalCache>,
}

impl SyncEngine {
    pub fn new(rpc: Arc<RpcClient>, cipher: Arc<Cipher>, cache: Arc<LocalCache>) -> Self {
        Self { rpc, cipher, cache }
    }

    /// Refresh one partition. The partition is only replaced if every row
    /// decrypts and decodes.
    #[tracing::instrument(skip(self))]
    pub async fn sync_type(&self, secret_type: SecretType) -> Result<usize> {
        let response = self.rpc.list_secrets_by_type(secret_type).await?;

        let entries = response
            .secrets
            .into_iter()
            .map(|item| decode_item(&self.cipher, item))
            .collect::<Result<Vec<_>>>()?;

        let count = entries.len();
        self.cache.replace_all(secret_type, entries)?;
        debug!(count, "partition replaced");
        Ok(count)
    }

    /// Refresh every cached type in order. A failure is logged and does not
    /// stop the remaining types.
    pub async fn sync_all(&self) -> SyncReport {
        let mut report = SyncReport::default();
        for secret_type in SecretType::CACHED {
            match self.sync_type(secret_type).await {
                Ok(count) => report.synced.push((secret_type, count)),
                Err(e) => {
                    warn!(%secret_type, error = %e, "sync failed");
                    report.failed.push((secret_type, e.to_string()));
                }
            }
        }
        report
    }

    /// Run [`sync_all`](Self::sync_all) every `interval` until `cancel` fires.
    ///
    /// The first tick is skipped; callers sync once themselves before spawning.
    pub fn spawn_periodic(
        self: Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;

            info!(interval_secs = interval.as_secs(), "periodic sync started");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let report = self.sync_all().await;
                        debug!(
                            synced = report.synced.len(),
                            failed = report.failed.len(),
                            "periodic sync pass"
                        );
                    }
                }
            }
            info!("periodic sync stopped");
        })
    }
}

fn decode_item(cipher: &Cipher, item: SecretListItem) -> Result<LocalSecret> {
    let plaintext = cipher.decode(&item.content)?;
    let payload = SecretPayload::from_plaintext(item.type_id, &plaintext)?;
    Ok(LocalSecret {
        id: item.id,
        title: item.title,
        updated_at: item.updated_at,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::testing;
    use keeper_core::messages::CreateSecretRequest;
    use keeper_core::{Card, LoginPass};

    #[tokio::test]
    async fn test_sync_type_replaces_partition() {
        let client = testing::client().await;
        client.session().register("alice", &"pw-alice".into()).await.unwrap();

        let card = SecretPayload::Card(Card {
            card_number: "4111111111111111".into(),
            cvv: "123".into(),
            due: "12/27".into(),
        });
        let meta = client.secrets().create_payload("visa", &card).await.unwrap();

        client.cache().clear();
        let count = client.sync().sync_type(SecretType::Card).await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(client.cache().get(meta.id).unwrap().payload, card);
    }

    #[tokio::test]
    async fn test_undecodable_row_leaves_partition_intact() {
        let client = testing::client().await;
        client.session().register("alice", &"pw-alice".into()).await.unwrap();

        let login_pass = |password: &str| {
            SecretPayload::LoginPass(LoginPass {
                login: "bob".into(),
                password: password.into(),
            })
        };
        let seeded = client
            .secrets()
            .create_payload("seeded", &login_pass("p0"))
            .await
            .unwrap();
        assert!(client.cache().get(seeded.id).is_some());

        // Five new rows written behind the cache's back; the third is valid
        // hex that our cipher never produced.
        let cipher = Cipher::default();
        let mut added = Vec::new();
        for i in 1..=5 {
            let content = if i == 3 {
                "00ff".to_string()
            } else {
                cipher.encode(&login_pass(&format!("p{i}")).to_plaintext())
            };
            let meta = client
                .rpc()
                .create_secret(&CreateSecretRequest {
                    title: format!("row-{i}"),
                    secret_type: SecretType::LoginPass,
                    content,
                })
                .await
                .unwrap();
            added.push(meta.id);
        }

        let err = client
            .sync()
            .sync_type(SecretType::LoginPass)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Cipher(_)));

        // Neither the rows before nor after the bad one were committed.
        for id in &added {
            assert!(client.cache().get(*id).is_none(), "row {id} leaked into cache");
        }
        let titles = client.cache().list_titles(SecretType::LoginPass);
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].id, seeded.id);
        assert_eq!(client.cache().get(seeded.id).unwrap().payload, login_pass("p0"));

        // Other types still sync.
        let report = client.sync().sync_all().await;
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, SecretType::LoginPass);
        assert_eq!(report.synced.len(), 2);
        assert_eq!(client.cache().list_titles(SecretType::LoginPass).len(), 1);
    }

    #[tokio::test]
    async fn test_periodic_task_stops_on_cancel() {
        let client = testing::client().await;
        let cancel = CancellationToken::new();
        let handle = client
            .sync()
            .clone()
            .spawn_periodic(Duration::from_millis(10), cancel.clone());

        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
