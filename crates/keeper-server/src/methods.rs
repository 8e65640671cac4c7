//! RPC method registry.
//!
//! Handlers that need a caller identity implement [`ProtectedHandler`] and
//! only ever receive an [`AuthenticatedCall`]; the registry runs the
//! [`AuthGate`] before dispatching to them. Login and registration are plain
//! [`MethodHandler`]s.

use crate::auth::AuthGate;
use crate::error::ServerError;
use crate::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// A call whose bearer token has been verified.
#[derive(Debug, Clone)]
pub struct AuthenticatedCall {
    /// The verified caller.
    pub user_id: Uuid,

    /// Method parameters.
    pub params: Option<serde_json::Value>,
}

impl AuthenticatedCall {
    /// Deserialize the parameters.
    pub fn params<T: DeserializeOwned>(&self) -> Result<T> {
        parse_params(self.params.clone())
    }
}

/// Trait for handlers reachable without a credential.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Handle the method call.
    async fn call(&self, params: Option<serde_json::Value>) -> Result<serde_json::Value>;
}

/// Trait for handlers that act on behalf of an authenticated user.
#[async_trait]
pub trait ProtectedHandler: Send + Sync {
    /// Handle the method call.
    async fn call(&self, call: AuthenticatedCall) -> Result<serde_json::Value>;
}

#[derive(Clone)]
enum Route {
    Public(Arc<dyn MethodHandler>),
    Protected(Arc<dyn ProtectedHandler>),
}

/// Registry for RPC methods.
pub struct MethodRegistry {
    methods: RwLock<HashMap<String, Route>>,
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            methods: RwLock::new(HashMap::new()),
        }
    }

    /// Register a method that bypasses authentication.
    pub async fn register(&self, name: impl Into<String>, handler: Arc<dyn MethodHandler>) {
        let mut methods = self.methods.write().await;
        methods.insert(name.into(), Route::Public(handler));
    }

    /// Register a method that requires a valid bearer token.
    pub async fn register_protected(
        &self,
        name: impl Into<String>,
        handler: Arc<dyn ProtectedHandler>,
    ) {
        let mut methods = self.methods.write().await;
        methods.insert(name.into(), Route::Protected(handler));
    }

    /// Dispatch a call, authenticating it first if the method is protected.
    ///
    /// `authorization` is the raw `Authorization` header value, if any.
    pub async fn call(
        &self,
        gate: &AuthGate,
        authorization: Option<&str>,
        name: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let route = {
            let methods = self.methods.read().await;
            methods
                .get(name)
                .cloned()
                .ok_or_else(|| ServerError::MethodNotFound(name.to_string()))?
        };

        debug!("Calling method: {}", name);
        match route {
            Route::Public(handler) => handler.call(params).await,
            Route::Protected(handler) => {
                let user_id = gate.authorize(authorization)?;
                handler.call(AuthenticatedCall { user_id, params }).await
            }
        }
    }

    /// List registered methods.
    pub async fn list(&self) -> Vec<String> {
        let methods = self.methods.read().await;
        let mut names: Vec<String> = methods.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether `name` is registered as a public method.
    pub async fn is_public(&self, name: &str) -> bool {
        matches!(self.methods.read().await.get(name), Some(Route::Public(_)))
    }
}

/// Deserialize optional parameters; absent parameters read as `{}`.
pub fn parse_params<T: DeserializeOwned>(params: Option<serde_json::Value>) -> Result<T> {
    let value = params.unwrap_or_else(|| serde_json::json!({}));
    serde_json::from_value(value).map_err(|e| ServerError::InvalidParams(e.to_string()))
}
