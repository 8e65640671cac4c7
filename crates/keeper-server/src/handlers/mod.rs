//! RPC method handlers.
//!
//! This module contains implementations for every Keeper RPC method.

pub mod secret;
pub mod secret_type;
pub mod user;

use crate::methods::MethodRegistry;
use keeper_core::messages::methods;
use keeper_crypto::BearerSealer;
use keeper_store::{SecretStore, UserStore};
use std::sync::Arc;

pub use secret::{
    CreateSecretHandler, DeleteSecretHandler, EditSecretHandler, GetSecretHandler,
    ListSecretsByTypeHandler,
};
pub use secret_type::SecretTypesListHandler;
pub use user::{DeleteUserHandler, LoginHandler, RegisterHandler};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct HandlerContext {
    /// Secret records.
    pub secrets: Arc<dyn SecretStore>,

    /// Accounts.
    pub users: Arc<dyn UserStore>,

    /// Mints bearer tokens on login and registration.
    pub sealer: Arc<BearerSealer>,
}

impl HandlerContext {
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        users: Arc<dyn UserStore>,
        sealer: Arc<BearerSealer>,
    ) -> Self {
        Self {
            secrets,
            users,
            sealer,
        }
    }
}

/// Register all method handlers.
pub async fn register_all(registry: &MethodRegistry, context: HandlerContext) {
    let ctx = Arc::new(context);

    // User methods
    registry
        .register(methods::LOGIN, Arc::new(LoginHandler::new(ctx.clone())))
        .await;
    registry
        .register(methods::REGISTER, Arc::new(RegisterHandler::new(ctx.clone())))
        .await;
    registry
        .register_protected(methods::DELETE_USER, Arc::new(DeleteUserHandler::new(ctx.clone())))
        .await;

    // Secret methods
    registry
        .register_protected(
            methods::CREATE_SECRET,
            Arc::new(CreateSecretHandler::new(ctx.clone())),
        )
        .await;
    registry
        .register_protected(methods::GET_SECRET, Arc::new(GetSecretHandler::new(ctx.clone())))
        .await;
    registry
        .register_protected(
            methods::DELETE_SECRET,
            Arc::new(DeleteSecretHandler::new(ctx.clone())),
        )
        .await;
    registry
        .register_protected(methods::EDIT_SECRET, Arc::new(EditSecretHandler::new(ctx.clone())))
        .await;
    registry
        .register_protected(
            methods::LIST_SECRETS_BY_TYPE,
            Arc::new(ListSecretsByTypeHandler::new(ctx.clone())),
        )
        .await;

    // Secret type methods
    registry
        .register_protected(methods::LIST_SECRET_TYPES, Arc::new(SecretTypesListHandler))
        .await;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use keeper_core::SecretString;
    use keeper_crypto::{Cipher, CredentialIssuer, DEFAULT_EXPIRY};
    use keeper_store::{SqliteSecretStore, SqliteUserStore};

    /// Handler context over a fresh in-memory database.
    pub async fn context() -> HandlerContext {
        let pool = keeper_store::memory_pool().await.unwrap();
        keeper_store::migrate(&pool).await.unwrap();
        let issuer = CredentialIssuer::new(&SecretString::new("test"), DEFAULT_EXPIRY).unwrap();
        HandlerContext::new(
            Arc::new(SqliteSecretStore::new(pool.clone())),
            Arc::new(SqliteUserStore::new(pool)),
            Arc::new(BearerSealer::new(Cipher::default(), issuer)),
        )
    }
}
