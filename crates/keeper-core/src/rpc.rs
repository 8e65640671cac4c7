//! JSON-RPC 2.0 envelope shared by server and client.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error codes carried in [`JsonRpcError::code`].
pub mod codes {
    /// Request body was not valid JSON.
    pub const PARSE_ERROR: i32 = -32700;
    /// JSON was valid but not a JSON-RPC request.
    pub const INVALID_REQUEST: i32 = -32600;
    /// No handler registered under the method name.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Parameters malformed or rejected by validation.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Storage, serialization, or other server-side failure.
    pub const INTERNAL_ERROR: i32 = -32603;
    /// Missing or invalid bearer credential.
    pub const UNAUTHENTICATED: i32 = -32001;
    /// Secret or user absent, or owned by someone else.
    pub const NOT_FOUND: i32 = -32002;
    /// Edit carried a stale `updated_at` without `force`.
    pub const FAILED_PRECONDITION: i32 = -32003;
}

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,

    /// Request ID (for matching responses).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,

    /// Method name.
    pub method: String,

    /// Method parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Create a new request with a random ID.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(serde_json::json!(uuid::Uuid::new_v4().to_string())),
            method: method.into(),
            params: None,
        }
    }

    /// Set the request ID.
    pub fn with_id(mut self, id: impl Into<serde_json::Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the parameters.
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,

    /// Request ID (matches the request).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,

    /// Result (on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    /// Error (on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<serde_json::Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Split into the typed result or the carried error.
    ///
    /// A response with neither field set decodes `null` into `T`.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, JsonRpcError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let value = self.result.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(value).map_err(|e| {
            JsonRpcError::new(codes::PARSE_ERROR, format!("malformed result: {e}"))
        })
    }
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i32,

    /// Error message.
    pub message: String,

    /// Additional error data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    /// Create a new error.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Parse error (-32700).
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, message)
    }

    /// Invalid request error (-32600).
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_REQUEST, message)
    }

    /// Method not found error (-32601).
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method.into()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = JsonRpcRequest::new("Secret.GetSecret")
            .with_id(serde_json::json!(1))
            .with_params(serde_json::json!({"id": 7}));

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"method\":\"Secret.GetSecret\""));
    }

    #[test]
    fn test_into_result_success() {
        let response =
            JsonRpcResponse::success(Some(serde_json::json!(1)), serde_json::json!({"token": "t"}));
        let value: serde_json::Value = response.into_result().unwrap();
        assert_eq!(value["token"], "t");
    }

    #[test]
    fn test_into_result_error() {
        let response = JsonRpcResponse::error(
            Some(serde_json::json!(1)),
            JsonRpcError::new(codes::FAILED_PRECONDITION, "stale"),
        );
        let err = response.into_result::<serde_json::Value>().unwrap_err();
        assert_eq!(err.code, codes::FAILED_PRECONDITION);
    }

    #[test]
    fn test_method_not_found_code() {
        let err = JsonRpcError::method_not_found("Nope.Nothing");
        assert_eq!(err.code, -32601);
        assert!(err.message.contains("Nope.Nothing"));
    }
}
