//! Shared helpers for the integration tests.

use keeper_client::KeeperClient;
use keeper_core::Config;
use keeper_server::{build_context, Server, ServerConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A server running on an ephemeral port over an in-memory database.
pub struct TestServer {
    pub addr: SocketAddr,
    pub config: Config,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut config = Config::default();
        config.server.database_url = "sqlite::memory:".to_string();
        config.auth.jwt_secret = "integration-secret".into();
        config.client.server_url = format!("http://{addr}");

        let context = build_context(&config).await.unwrap();
        let server = Server::new(ServerConfig::from(&config), context).await;

        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let handle = tokio::spawn(async move {
            server.serve(listener, token).await.unwrap();
        });

        Self {
            addr,
            config,
            shutdown,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A fresh client pointed at this server.
    pub fn client(&self) -> KeeperClient {
        KeeperClient::new(&self.config).unwrap()
    }

    pub async fn stop(self) {
        self.shutdown.cancel();
        self.handle.await.unwrap();
    }
}
