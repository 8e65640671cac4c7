//! Config save/load roundtrip integration tests.

use keeper_core::config::{Config, LogLevel};
use keeper_core::ConfigError;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keeper.json5");

    let mut config = Config::default();
    config.server.port = 9090;
    config.auth.jwt_secret = "round-trip".into();
    config.logging.level = LogLevel::Debug;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.server.port, 9090);
    assert_eq!(loaded.auth.jwt_secret.expose_secret(), "round-trip");
    assert_eq!(loaded.logging.level, LogLevel::Debug);
    assert_eq!(loaded.client.server_url, config.client.server_url);
    assert!(loaded.validate_server().is_ok());
}

#[test]
fn test_json5_comments_and_partial_sections() {
    let config = Config::parse(
        r#"{
            // only the fields that differ
            server: { database_url: "sqlite::memory:" },
            client: { sync_interval_secs: 5 },
        }"#,
    )
    .unwrap();
    assert_eq!(config.server.database_url, "sqlite::memory:");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.client.sync_interval_secs, 5);
}

#[test]
fn test_server_requires_signing_secret() {
    assert!(matches!(
        Config::default().validate_server(),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/keeper.json5"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_config_parse_invalid() {
    assert!(Config::parse("not valid json").is_err());
}
