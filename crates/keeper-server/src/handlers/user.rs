//! Account RPC method handlers.

use super::HandlerContext;
use crate::error::ServerError;
use crate::methods::{parse_params, AuthenticatedCall, MethodHandler, ProtectedHandler};
use crate::Result;
use async_trait::async_trait;
use keeper_core::messages::{CredentialsRequest, Empty, TokenResponse};
use keeper_crypto::password;
use std::sync::Arc;
use tracing::{debug, info};

/// Minimum length of logins and passwords.
pub const MIN_CREDENTIAL_LEN: usize = 3;

const BAD_LOGIN: &str = "invalid login or password";

fn validate(request: &CredentialsRequest) -> Result<()> {
    if request.login.chars().count() < MIN_CREDENTIAL_LEN {
        return Err(ServerError::InvalidParams(format!(
            "login must be at least {MIN_CREDENTIAL_LEN} characters"
        )));
    }
    if request.password.expose_secret().chars().count() < MIN_CREDENTIAL_LEN {
        return Err(ServerError::InvalidParams(format!(
            "password must be at least {MIN_CREDENTIAL_LEN} characters"
        )));
    }
    Ok(())
}

fn token_response(ctx: &HandlerContext, user_id: uuid::Uuid) -> Result<serde_json::Value> {
    let token = ctx
        .sealer
        .seal(user_id)
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(serde_json::to_value(TokenResponse { token })?)
}

/// `User.Register` handler.
pub struct RegisterHandler {
    context: Arc<HandlerContext>,
}

impl RegisterHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl MethodHandler for RegisterHandler {
    async fn call(&self, params: Option<serde_json::Value>) -> Result<serde_json::Value> {
        let request: CredentialsRequest = parse_params(params)?;
        validate(&request)?;

        let password = request.password.clone();
        let hash = tokio::task::spawn_blocking(move || {
            password::hash_password(password.expose_secret())
        })
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .map_err(|e| ServerError::Internal(e.to_string()))?;

        let user = self.context.users.create(&request.login, &hash).await?;
        info!(user_id = %user.id, "user registered");

        token_response(&self.context, user.id)
    }
}

/// `User.Login` handler.
pub struct LoginHandler {
    context: Arc<HandlerContext>,
}

impl LoginHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl MethodHandler for LoginHandler {
    async fn call(&self, params: Option<serde_json::Value>) -> Result<serde_json::Value> {
        let request: CredentialsRequest = parse_params(params)?;
        validate(&request)?;

        let user = self
            .context
            .users
            .find_by_login(&request.login)
            .await?
            .ok_or_else(|| ServerError::NotFound(BAD_LOGIN.to_string()))?;

        let password = request.password.clone();
        let stored = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || {
            password::verify_password(password.expose_secret(), &stored)
        })
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

        if !valid {
            debug!(user_id = %user.id, "password mismatch");
            return Err(ServerError::NotFound(BAD_LOGIN.to_string()));
        }

        info!(user_id = %user.id, "user logged in");
        token_response(&self.context, user.id)
    }
}

/// `User.Delete` handler. Removes the caller and all their secrets.
pub struct DeleteUserHandler {
    context: Arc<HandlerContext>,
}

impl DeleteUserHandler {
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ProtectedHandler for DeleteUserHandler {
    async fn call(&self, call: AuthenticatedCall) -> Result<serde_json::Value> {
        self.context.users.delete(call.user_id).await?;
        Ok(serde_json::to_value(Empty::default())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing;
    use serde_json::json;

    fn token_of(value: serde_json::Value) -> String {
        serde_json::from_value::<TokenResponse>(value).unwrap().token
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let ctx = Arc::new(testing::context().await);
        let register = RegisterHandler::new(ctx.clone());
        let login = LoginHandler::new(ctx.clone());
        let creds = json!({"login": "alice", "password": "pw-alice"});

        let registered = token_of(register.call(Some(creds.clone())).await.unwrap());
        let logged_in = token_of(login.call(Some(creds)).await.unwrap());

        let a = ctx.sealer.open(&registered).unwrap();
        let b = ctx.sealer.open(&logged_in).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let ctx = Arc::new(testing::context().await);
        let register = RegisterHandler::new(ctx);

        for params in [
            json!({"login": "al", "password": "long-enough"}),
            json!({"login": "alice", "password": "pw"}),
            json!({"login": "alice"}),
        ] {
            let err = register.call(Some(params)).await.unwrap_err();
            assert!(matches!(err, ServerError::InvalidParams(_)));
        }
    }

    #[tokio::test]
    async fn test_duplicate_register_is_invalid() {
        let ctx = Arc::new(testing::context().await);
        let register = RegisterHandler::new(ctx);
        let creds = json!({"login": "alice", "password": "pw-alice"});

        register.call(Some(creds.clone())).await.unwrap();
        let err = register.call(Some(creds)).await.unwrap_err();
        assert!(matches!(err, ServerError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn test_login_failures_are_not_found() {
        let ctx = Arc::new(testing::context().await);
        RegisterHandler::new(ctx.clone())
            .call(Some(json!({"login": "alice", "password": "pw-alice"})))
            .await
            .unwrap();
        let login = LoginHandler::new(ctx);

        let wrong_password = login
            .call(Some(json!({"login": "alice", "password": "nope"})))
            .await
            .unwrap_err();
        let unknown_user = login
            .call(Some(json!({"login": "mallory", "password": "pw-alice"})))
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let ctx = Arc::new(testing::context().await);
        let token = token_of(
            RegisterHandler::new(ctx.clone())
                .call(Some(json!({"login": "alice", "password": "pw-alice"})))
                .await
                .unwrap(),
        );
        let user_id = ctx.sealer.open(&token).unwrap();

        let delete = DeleteUserHandler::new(ctx.clone());
        let call = AuthenticatedCall {
            user_id,
            params: None,
        };
        delete.call(call.clone()).await.unwrap();
        assert!(matches!(delete.call(call).await, Err(ServerError::NotFound(_))));
    }
}
