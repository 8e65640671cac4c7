//! In-process server used by the client tests.

use async_trait::async_trait;
use keeper_core::Config;
use keeper_crypto::Cipher;
use keeper_server::handlers::register_all;
use keeper_server::{build_context, AuthGate, MethodRegistry};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::transport::RpcTransport;
use crate::KeeperClient;

/// Dispatches calls straight into a server registry over an in-memory
/// database, skipping HTTP.
pub(crate) struct InProcessTransport {
    registry: MethodRegistry,
    gate: AuthGate,
}

impl InProcessTransport {
    pub(crate) async fn new() -> Arc<Self> {
        let mut config = Config::default();
        config.server.database_url = "sqlite::memory:".to_string();
        config.auth.jwt_secret = "client-test-secret".into();

        let context = build_context(&config).await.unwrap();
        let gate = AuthGate::new(context.sealer.clone());
        let registry = MethodRegistry::new();
        register_all(&registry, context).await;

        Arc::new(Self { registry, gate })
    }
}

#[async_trait]
impl RpcTransport for InProcessTransport {
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
        bearer: Option<&str>,
    ) -> Result<serde_json::Value> {
        let authorization = bearer.map(|t| format!("Bearer {t}"));
        self.registry
            .call(&self.gate, authorization.as_deref(), method, Some(params))
            .await
            .map_err(|e| ClientError::from(e.to_rpc_error()))
    }
}

/// A client wired to its own in-process server.
pub(crate) async fn client() -> KeeperClient {
    client_on(InProcessTransport::new().await)
}

/// A client sharing `transport` with other clients.
pub(crate) fn client_on(transport: Arc<InProcessTransport>) -> KeeperClient {
    KeeperClient::with_transport(transport, Cipher::default(), Duration::from_secs(3600))
}
