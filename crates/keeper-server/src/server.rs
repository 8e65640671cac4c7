//! HTTP JSON-RPC server.
//!
//! One JSON-RPC request per `POST /rpc`; the bearer token travels in the
//! `Authorization` header of that request. `GET /health` is unauthenticated.

use crate::auth::{authorization_header, AuthGate};
use crate::error::ServerError;
use crate::handlers::{register_all, HandlerContext};
use crate::methods::MethodRegistry;
use crate::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use keeper_core::rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use keeper_core::Config;
use keeper_crypto::{BearerSealer, Cipher, CredentialIssuer};
use keeper_store::{SqliteSecretStore, SqliteUserStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub address: String,

    /// Port number. Zero picks an ephemeral port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ServerConfig {
    fn from(config: &Config) -> Self {
        Self {
            address: config.server.address.clone(),
            port: config.server.port,
        }
    }
}

/// Server state shared by request handlers.
pub struct ServerState {
    /// Method registry.
    pub methods: Arc<MethodRegistry>,

    /// Bearer verification for protected methods.
    pub gate: AuthGate,
}

/// The Keeper RPC server.
pub struct Server {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl Server {
    /// Create a server with every Keeper method registered.
    pub async fn new(config: ServerConfig, context: HandlerContext) -> Self {
        let gate = AuthGate::new(context.sealer.clone());
        let methods = Arc::new(MethodRegistry::new());
        register_all(&methods, context).await;

        Self {
            state: Arc::new(ServerState { methods, gate }),
            config,
        }
    }

    /// Build the full server from configuration: open and migrate the
    /// database, construct the cipher and credential issuer.
    pub async fn from_config(config: &Config) -> Result<Self> {
        config
            .validate_server()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        let context = build_context(config).await?;
        Ok(Self::new(ServerConfig::from(config), context).await)
    }

    /// Get the method registry.
    pub fn methods(&self) -> &Arc<MethodRegistry> {
        &self.state.methods
    }

    /// Bind the configured address and serve until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let addr = format!("{}:{}", self.config.address, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` is cancelled.
    pub async fn serve(self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        let local: SocketAddr = listener.local_addr()?;
        info!("Starting Keeper server on {}", local);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        info!("Keeper server stopped");
        Ok(())
    }

    /// Create the Axum router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/rpc", post(rpc_handler))
            .route("/health", get(health_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }
}

/// Construct stores, cipher and issuer from configuration.
pub async fn build_context(config: &Config) -> Result<HandlerContext> {
    let cipher =
        Cipher::from_config(&config.cipher).map_err(|e| ServerError::Config(e.to_string()))?;
    let expiry = Duration::from_secs(u64::from(config.auth.token_expiry_days) * 24 * 60 * 60);
    let issuer = CredentialIssuer::new(&config.auth.jwt_secret, expiry)
        .map_err(|e| ServerError::Config(e.to_string()))?;

    let pool = keeper_store::open_pool(&config.server.database_url).await?;
    keeper_store::migrate(&pool).await?;

    let timeout = Duration::from_secs(config.server.db_timeout_secs);
    Ok(HandlerContext::new(
        Arc::new(SqliteSecretStore::with_timeout(pool.clone(), timeout)),
        Arc::new(SqliteUserStore::with_timeout(pool, timeout)),
        Arc::new(BearerSealer::new(cipher, issuer)),
    ))
}

/// JSON-RPC endpoint.
async fn rpc_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<JsonRpcResponse> {
    Json(handle_message(&body, &state, authorization_header(&headers)).await)
}

/// Handle one JSON-RPC message.
async fn handle_message(
    body: &[u8],
    state: &ServerState,
    authorization: Option<&str>,
) -> JsonRpcResponse {
    let request: JsonRpcRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => return JsonRpcResponse::error(None, JsonRpcError::parse_error(e.to_string())),
    };

    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::error(
            request.id,
            JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
        );
    }

    debug!("Received RPC request: {}", request.method);

    let result = state
        .methods
        .call(&state.gate, authorization, &request.method, request.params)
        .await;

    match result {
        Ok(value) => JsonRpcResponse::success(request.id, value),
        Err(e) => {
            match &e {
                ServerError::Internal(_) | ServerError::Io(_) | ServerError::Config(_) => {
                    warn!(method = %request.method, error = %e, "RPC call failed")
                }
                _ => debug!(method = %request.method, error = %e, "RPC call rejected"),
            }
            JsonRpcResponse::error(request.id, e.to_rpc_error())
        }
    }
}

/// Health check handler.
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
