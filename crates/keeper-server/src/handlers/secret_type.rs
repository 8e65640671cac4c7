//! Secret type RPC method handlers.

use crate::methods::{AuthenticatedCall, ProtectedHandler};
use crate::Result;
use async_trait::async_trait;
use keeper_core::messages::SecretTypesListResponse;
use keeper_core::SecretType;

/// `SecretType.GetSecretTypesList` handler.
pub struct SecretTypesListHandler;

#[async_trait]
impl ProtectedHandler for SecretTypesListHandler {
    async fn call(&self, _call: AuthenticatedCall) -> Result<serde_json::Value> {
        let response = SecretTypesListResponse {
            types: SecretType::ALL.iter().copied().map(Into::into).collect(),
        };
        Ok(serde_json::to_value(response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_every_type() {
        let value = SecretTypesListHandler
            .call(AuthenticatedCall {
                user_id: uuid::Uuid::new_v4(),
                params: None,
            })
            .await
            .unwrap();
        let response: SecretTypesListResponse = serde_json::from_value(value).unwrap();
        let ids: Vec<u32> = response.types.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(response.types[3].title, "card");
    }
}
