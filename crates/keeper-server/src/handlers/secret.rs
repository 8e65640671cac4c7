//! Secret RPC method handlers.
//!
//! Content is opaque hex ciphertext here; the server never decrypts it.

use super::HandlerContext;
use crate::methods::{AuthenticatedCall, ProtectedHandler};
use crate::Result;
use async_trait::async_trait;
use keeper_core::messages::{
    CreateSecretRequest, EditSecretRequest, Empty, ListSecretsByTypeRequest,
    ListSecretsByTypeResponse, SecretIdRequest, SecretMeta, SecretRecord,
};
use keeper_store::{NewSecret, SecretEdit};
use std::sync::Arc;
use tracing::debug;

/// `Secret.CreateSecret` handler.
pub struct CreateSecretHandler {
    context: Arc<HandlerContext>,
}

impl CreateSecretHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ProtectedHandler for CreateSecretHandler {
    async fn call(&self, call: AuthenticatedCall) -> Result<serde_json::Value> {
        let request: CreateSecretRequest = call.params()?;
        let secret = self
            .context
            .secrets
            .create(
                call.user_id,
                NewSecret {
                    secret_type: request.secret_type,
                    title: request.title,
                    content: request.content,
                },
            )
            .await?;

        debug!(id = secret.id, "secret created");
        Ok(serde_json::to_value(SecretMeta::from(secret))?)
    }
}

/// `Secret.GetSecret` handler.
pub struct GetSecretHandler {
    context: Arc<HandlerContext>,
}

impl GetSecretHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ProtectedHandler for GetSecretHandler {
    async fn call(&self, call: AuthenticatedCall) -> Result<serde_json::Value> {
        let request: SecretIdRequest = call.params()?;
        let secret = self.context.secrets.get(call.user_id, request.id).await?;
        Ok(serde_json::to_value(SecretRecord::from(secret))?)
    }
}

/// `Secret.DeleteSecret` handler.
pub struct DeleteSecretHandler {
    context: Arc<HandlerContext>,
}

impl DeleteSecretHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ProtectedHandler for DeleteSecretHandler {
    async fn call(&self, call: AuthenticatedCall) -> Result<serde_json::Value> {
        let request: SecretIdRequest = call.params()?;
        self.context.secrets.delete(call.user_id, request.id).await?;
        Ok(serde_json::to_value(Empty::default())?)
    }
}

/// `Secret.EditSecret` handler.
pub struct EditSecretHandler {
    context: Arc<HandlerContext>,
}

impl EditSecretHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ProtectedHandler for EditSecretHandler {
    async fn call(&self, call: AuthenticatedCall) -> Result<serde_json::Value> {
        let request: EditSecretRequest = call.params()?;
        let secret = self
            .context
            .secrets
            .edit(
                call.user_id,
                SecretEdit {
                    id: request.id,
                    secret_type: request.secret_type,
                    title: request.title,
                    content: request.content,
                    updated_at: request.updated_at,
                },
                request.force,
            )
            .await?;
        Ok(serde_json::to_value(SecretMeta::from(secret))?)
    }
}

/// `Secret.GetListOfSecretsByType` handler.
pub struct ListSecretsByTypeHandler {
    context: Arc<HandlerContext>,
}

impl ListSecretsByTypeHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ProtectedHandler for ListSecretsByTypeHandler {
    async fn call(&self, call: AuthenticatedCall) -> Result<serde_json::Value> {
        let request: ListSecretsByTypeRequest = call.params()?;
        let secrets = self
            .context
            .secrets
            .list_by_type(call.user_id, request.type_id)
            .await?;

        let response = ListSecretsByTypeResponse {
            secrets: secrets.into_iter().map(Into::into).collect(),
        };
        Ok(serde_json::to_value(response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;
    use crate::handlers::testing;
    use keeper_core::SecretType;
    use serde_json::json;
    use uuid::Uuid;

    struct Fixture {
        ctx: Arc<HandlerContext>,
        alice: Uuid,
        bob: Uuid,
    }

    async fn fixture() -> Fixture {
        let ctx = Arc::new(testing::context().await);
        let alice = ctx.users.create("alice", "h").await.unwrap().id;
        let bob = ctx.users.create("bob", "h").await.unwrap().id;
        Fixture { ctx, alice, bob }
    }

    fn as_user(user_id: Uuid, params: serde_json::Value) -> AuthenticatedCall {
        AuthenticatedCall {
            user_id,
            params: Some(params),
        }
    }

    async fn create(f: &Fixture, user: Uuid, content: &str) -> SecretMeta {
        let value = CreateSecretHandler::new(f.ctx.clone())
            .call(as_user(user, json!({"title": "email", "type": 1, "content": content})))
            .await
            .unwrap();
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_get_round_trip() {
        let f = fixture().await;
        let meta = create(&f, f.alice, "c0ffee").await;
        assert_eq!(meta.secret_type, SecretType::LoginPass);
        assert!(meta.deleted_at.is_none());

        let value = GetSecretHandler::new(f.ctx.clone())
            .call(as_user(f.alice, json!({"id": meta.id})))
            .await
            .unwrap();
        let record: SecretRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.content, "c0ffee");
        assert_eq!(record.updated_at, meta.updated_at);
    }

    #[tokio::test]
    async fn test_unknown_type_is_invalid() {
        let f = fixture().await;
        let err = CreateSecretHandler::new(f.ctx.clone())
            .call(as_user(f.alice, json!({"title": "x", "type": 9, "content": "00"})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn test_stale_edit_round_trips_timestamp() {
        let f = fixture().await;
        let meta = create(&f, f.alice, "0a").await;
        let edit = EditSecretHandler::new(f.ctx.clone());

        // The timestamp as serialized on the wire must be accepted back.
        let params = json!({
            "id": meta.id, "title": "email", "type": 1, "content": "0b",
            "updated_at": meta.updated_at,
        });
        let edited: SecretMeta =
            serde_json::from_value(edit.call(as_user(f.alice, params.clone())).await.unwrap())
                .unwrap();
        assert!(edited.updated_at > meta.updated_at);

        let err = edit.call(as_user(f.alice, params)).await.unwrap_err();
        assert!(matches!(err, ServerError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn test_cross_user_access_is_not_found() {
        let f = fixture().await;
        let meta = create(&f, f.alice, "0a").await;

        let get = GetSecretHandler::new(f.ctx.clone())
            .call(as_user(f.bob, json!({"id": meta.id})))
            .await;
        let delete = DeleteSecretHandler::new(f.ctx.clone())
            .call(as_user(f.bob, json!({"id": meta.id})))
            .await;
        assert!(matches!(get, Err(ServerError::NotFound(_))));
        assert!(matches!(delete, Err(ServerError::NotFound(_))));

        let listed = ListSecretsByTypeHandler::new(f.ctx.clone())
            .call(as_user(f.bob, json!({"type_id": 1})))
            .await
            .unwrap();
        assert_eq!(listed["secrets"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_list_carries_owner_and_content() {
        let f = fixture().await;
        create(&f, f.alice, "01").await;
        create(&f, f.alice, "02").await;

        let value = ListSecretsByTypeHandler::new(f.ctx.clone())
            .call(as_user(f.alice, json!({"type_id": 1})))
            .await
            .unwrap();
        let response: ListSecretsByTypeResponse = serde_json::from_value(value).unwrap();
        assert_eq!(response.secrets.len(), 2);
        assert!(response.secrets.iter().all(|s| s.user_id == f.alice));
        assert_eq!(response.secrets[1].content, "02");
    }
}
