//! Raw JSON-RPC behaviour of the HTTP endpoint.

use keeper_core::messages::methods;
use keeper_core::rpc::codes;
use keeper_integration_tests::TestServer;
use serde_json::{json, Value};

async fn post(url: &str, body: String, bearer: Option<&str>) -> Value {
    let mut request = reqwest::Client::new()
        .post(format!("{url}/rpc"))
        .header("content-type", "application/json")
        .body(body);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }
    request.send().await.unwrap().json().await.unwrap()
}

fn call(method: &str, params: Value) -> String {
    json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params}).to_string()
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let body: Value = reqwest::get(format!("{}/health", server.url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    server.stop().await;
}

#[tokio::test]
async fn test_protected_methods_need_a_token() {
    let server = TestServer::start().await;
    let url = server.url();

    for method in [
        methods::CREATE_SECRET,
        methods::GET_SECRET,
        methods::LIST_SECRET_TYPES,
        methods::DELETE_USER,
    ] {
        let response = post(&url, call(method, json!({})), None).await;
        assert_eq!(response["error"]["code"], codes::UNAUTHENTICATED, "{method}");

        let response = post(&url, call(method, json!({})), Some("deadbeef")).await;
        assert_eq!(response["error"]["code"], codes::UNAUTHENTICATED, "{method}");
    }

    server.stop().await;
}

#[tokio::test]
async fn test_token_from_register_opens_protected_methods() {
    let server = TestServer::start().await;
    let url = server.url();

    let response = post(
        &url,
        call(methods::REGISTER, json!({"login": "erin", "password": "pw-erin"})),
        None,
    )
    .await;
    let token = response["result"]["token"].as_str().unwrap().to_string();

    let response = post(&url, call(methods::LIST_SECRET_TYPES, json!({})), Some(&token)).await;
    assert_eq!(response["result"]["types"].as_array().unwrap().len(), 4);

    let response = post(
        &url,
        call(
            methods::CREATE_SECRET,
            json!({"title": "x", "type": 2, "content": "not hex"}),
        ),
        Some(&token),
    )
    .await;
    assert_eq!(response["error"]["code"], codes::INVALID_PARAMS);

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_requests() {
    let server = TestServer::start().await;
    let url = server.url();

    let response = post(&url, "{not json".to_string(), None).await;
    assert_eq!(response["error"]["code"], codes::PARSE_ERROR);

    let response = post(&url, call("Nope.Nothing", json!({})), None).await;
    assert_eq!(response["error"]["code"], codes::METHOD_NOT_FOUND);

    let response = post(
        &url,
        json!({"jsonrpc": "1.0", "id": 1, "method": methods::LOGIN}).to_string(),
        None,
    )
    .await;
    assert_eq!(response["error"]["code"], codes::INVALID_REQUEST);

    server.stop().await;
}

#[tokio::test]
async fn test_wrong_password_is_not_found() {
    let server = TestServer::start().await;
    let url = server.url();

    post(
        &url,
        call(methods::REGISTER, json!({"login": "frank", "password": "pw-frank"})),
        None,
    )
    .await;
    let response = post(
        &url,
        call(methods::LOGIN, json!({"login": "frank", "password": "nope"})),
        None,
    )
    .await;
    assert_eq!(response["error"]["code"], codes::NOT_FOUND);
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("invalid login or password"));

    server.stop().await;
}
