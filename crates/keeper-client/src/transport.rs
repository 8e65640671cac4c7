//! RPC transport and the typed client over it.

use async_trait::async_trait;
use keeper_core::messages::{
    methods, CreateSecretRequest, CredentialsRequest, EditSecretRequest, Empty,
    ListSecretsByTypeRequest, ListSecretsByTypeResponse, SecretIdRequest, SecretMeta,
    SecretRecord, SecretTypesListResponse, TokenResponse,
};
use keeper_core::rpc::{JsonRpcRequest, JsonRpcResponse};
use keeper_core::{SecretString, SecretType};
use parking_lot::RwLock;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{ClientError, Result};

/// Carries one JSON-RPC call to the server.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Send `method` with `params`, attaching `bearer` when given, and return
    /// the raw result value.
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
        bearer: Option<&str>,
    ) -> Result<serde_json::Value>;
}

/// JSON-RPC over HTTP `POST {base}/rpc`.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a transport for the server at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/rpc", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
        bearer: Option<&str>,
    ) -> Result<serde_json::Value> {
        let request = JsonRpcRequest::new(method).with_params(params);

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?.error_for_status()?;
        let response: JsonRpcResponse = response.json().await?;
        Ok(response.into_result::<serde_json::Value>()?)
    }
}

/// Typed Keeper RPC client.
///
/// Holds the bearer token between login and logout. Protected calls are
/// refused locally with [`ClientError::NotAuthorized`] while no token is held.
pub struct RpcClient {
    transport: Arc<dyn RpcTransport>,
    token: RwLock<Option<String>>,
}

impl RpcClient {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            token: RwLock::new(None),
        }
    }

    /// Whether a bearer token is held.
    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }

    pub fn set_token(&self, token: String) {
        *self.token.write() = Some(token);
    }

    pub fn clear_token(&self) {
        *self.token.write() = None;
    }

    async fn invoke<P, R>(&self, method: &str, params: &P) -> Result<R>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        let bearer = if methods::UNPROTECTED.contains(&method) {
            None
        } else {
            let token = self.token.read().clone();
            Some(token.ok_or(ClientError::NotAuthorized)?)
        };

        debug!(method, "rpc call");
        let value = self
            .transport
            .call(method, serde_json::to_value(params)?, bearer.as_deref())
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `User.Register`; stores the returned token.
    pub async fn register(&self, login: &str, password: &SecretString) -> Result<()> {
        let request = CredentialsRequest {
            login: login.to_string(),
            password: password.clone(),
        };
        let response: TokenResponse = self.invoke(methods::REGISTER, &request).await?;
        self.set_token(response.token);
        Ok(())
    }

    /// `User.Login`; stores the returned token.
    pub async fn login(&self, login: &str, password: &SecretString) -> Result<()> {
        let request = CredentialsRequest {
            login: login.to_string(),
            password: password.clone(),
        };
        let response: TokenResponse = self.invoke(methods::LOGIN, &request).await?;
        self.set_token(response.token);
        Ok(())
    }

    pub async fn delete_user(&self) -> Result<()> {
        let _: Empty = self.invoke(methods::DELETE_USER, &Empty::default()).await?;
        Ok(())
    }

    pub async fn create_secret(&self, request: &CreateSecretRequest) -> Result<SecretMeta> {
        self.invoke(methods::CREATE_SECRET, request).await
    }

    pub async fn get_secret(&self, id: i64) -> Result<SecretRecord> {
        self.invoke(methods::GET_SECRET, &SecretIdRequest { id }).await
    }

    pub async fn delete_secret(&self, id: i64) -> Result<()> {
        let _: Empty = self
            .invoke(methods::DELETE_SECRET, &SecretIdRequest { id })
            .await?;
        Ok(())
    }

    pub async fn edit_secret(&self, request: &EditSecretRequest) -> Result<SecretMeta> {
        self.invoke(methods::EDIT_SECRET, request).await
    }

    pub async fn list_secrets_by_type(
        &self,
        type_id: SecretType,
    ) -> Result<ListSecretsByTypeResponse> {
        self.invoke(
            methods::LIST_SECRETS_BY_TYPE,
            &ListSecretsByTypeRequest { type_id },
        )
        .await
    }

    pub async fn secret_types(&self) -> Result<SecretTypesListResponse> {
        self.invoke(methods::LIST_SECRET_TYPES, &Empty::default())
            .await
    }
}
