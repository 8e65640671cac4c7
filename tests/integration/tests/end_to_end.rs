//! Full client/server round trips over HTTP.

use keeper_client::ClientError;
use keeper_core::{LoginPass, SecretPayload, SecretType, TextNote};
use keeper_integration_tests::TestServer;

fn login_pass(login: &str, password: &str) -> SecretPayload {
    SecretPayload::LoginPass(LoginPass {
        login: login.into(),
        password: password.into(),
    })
}

#[tokio::test]
async fn test_alice_edits_race() {
    let server = TestServer::start().await;

    let alice = server.client();
    alice
        .session()
        .register("alice", &"secret123".into())
        .await
        .unwrap();

    let original = login_pass("bob@example.com", "hunter2");
    let meta = alice
        .secrets()
        .create_payload("email", &original)
        .await
        .unwrap();
    assert_eq!(meta.id, 1);

    let cached = alice.cache().get(1).unwrap();
    assert_eq!(cached.secret_type(), SecretType::LoginPass);
    assert_eq!(cached.payload, original);
    assert_eq!(cached.updated_at, meta.updated_at);

    // A second device holding the same original version.
    let other = server.client();
    other
        .session()
        .login("alice", &"secret123".into())
        .await
        .unwrap();

    let first_edit = login_pass("bob@example.com", "correct-horse");
    let edited = alice
        .secrets()
        .edit_payload(1, "email", &first_edit, meta.updated_at, false)
        .await
        .unwrap();
    assert!(edited.updated_at > meta.updated_at);

    let err = other
        .secrets()
        .edit_payload(1, "email", &login_pass("bob@example.com", "battery"), meta.updated_at, false)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Conflict { id: 1 }));

    let refreshed = other.cache().get(1).unwrap();
    assert_eq!(refreshed.payload, first_edit);
    assert_eq!(refreshed.updated_at, edited.updated_at);

    alice.session().shutdown().await;
    other.session().shutdown().await;
    server.stop().await;
}

#[tokio::test]
async fn test_users_cannot_see_each_other() {
    let server = TestServer::start().await;

    let alice = server.client();
    alice.session().register("alice", &"pw-alice".into()).await.unwrap();
    let note = SecretPayload::Text(TextNote {
        text: "alice only".into(),
    });
    let meta = alice.secrets().create_payload("diary", &note).await.unwrap();

    let bob = server.client();
    bob.session().register("bob", &"pw-bob".into()).await.unwrap();

    assert!(matches!(
        bob.secrets().get(meta.id).await,
        Err(ClientError::NotFound(_))
    ));
    assert!(matches!(
        bob.secrets().delete(meta.id).await,
        Err(ClientError::NotFound(_))
    ));
    assert!(matches!(
        bob.secrets()
            .edit_payload(meta.id, "mine", &note, meta.updated_at, true)
            .await,
        Err(ClientError::NotFound(_))
    ));
    assert!(bob.secrets().list(SecretType::Text).await.unwrap().is_empty());

    // Alice's secret is untouched.
    assert_eq!(alice.secrets().get(meta.id).await.unwrap().payload, note);

    alice.session().shutdown().await;
    bob.session().shutdown().await;
    server.stop().await;
}

#[tokio::test]
async fn test_binary_secret_over_http() {
    let server = TestServer::start().await;
    let client = server.client();
    client.session().register("carol", &"pw-carol".into()).await.unwrap();

    let bytes: Vec<u8> = (0..=255).collect();
    let meta = client.secrets().create_binary("all-bytes", &bytes).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.bin");
    client.secrets().get_binary(meta.id, &dest).await.unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), bytes);

    client.session().shutdown().await;
    server.stop().await;
}

#[tokio::test]
async fn test_account_deletion_removes_secrets() {
    let server = TestServer::start().await;
    let client = server.client();
    client.session().register("dave", &"pw-dave".into()).await.unwrap();
    client
        .secrets()
        .create_payload("email", &login_pass("dave", "p"))
        .await
        .unwrap();

    client.session().delete_account().await.unwrap();
    assert!(!client.session().is_logged_in());
    assert!(client.cache().is_empty());

    // Re-registering the login starts from an empty vault.
    client.session().register("dave", &"pw-dave".into()).await.unwrap();
    assert!(client
        .secrets()
        .list(SecretType::LoginPass)
        .await
        .unwrap()
        .is_empty());

    client.session().shutdown().await;
    server.stop().await;
}
