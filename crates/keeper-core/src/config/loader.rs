//! Configuration loading and persistence.

use super::{Config, LogLevel};
use crate::env;
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::Path;

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to the default path.
    pub fn save_default(&self) -> Result<(), ConfigError> {
        let path = paths::config_file()?;
        self.save(&path)
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; plain JSON is valid JSON5.
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    ///
    /// Checks that apply only to the server (a signing secret) live in
    /// [`Config::validate_server`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }

        if self.server.database_url.trim().is_empty() {
            errors.push("Server database_url must not be empty".to_string());
        }

        if self.server.db_timeout_secs == 0 {
            errors.push("Server db_timeout_secs must be greater than 0".to_string());
        }

        if self.auth.token_expiry_days == 0 {
            errors.push("Auth token_expiry_days must be greater than 0".to_string());
        }

        if let Some(key) = &self.cipher.key {
            check_hex_len(key, 32, "Cipher key", &mut errors);
        }
        if let Some(nonce) = &self.cipher.nonce {
            check_hex_len(nonce, 12, "Cipher nonce", &mut errors);
        }

        if !self.client.server_url.starts_with("http://")
            && !self.client.server_url.starts_with("https://")
        {
            errors.push(format!(
                "Client server_url '{}' must start with http:// or https://",
                self.client.server_url
            ));
        }

        if self.client.sync_interval_secs == 0 {
            errors.push("Client sync_interval_secs must be greater than 0".to_string());
        }

        if self.client.request_timeout_secs == 0 {
            errors.push("Client request_timeout_secs must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Validate, additionally requiring what the server needs to start.
    pub fn validate_server(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Validation(
                "Auth jwt_secret must be set to run the server".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from the default path, falling back to defaults if
    /// no file exists. Environment overrides are applied in both cases.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let mut config = match Self::load_default() {
            Ok(config) => config,
            Err(ConfigError::NotFound(_)) => Self::default(),
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `KEEPER_*` environment variables on top of the loaded values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(env::get_var);
    }

    /// Apply overrides from an arbitrary lookup keyed by `KEEPER_*` names.
    ///
    /// Values that fail to parse are ignored and logged.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        use env::vars;

        if let Some(address) = lookup(vars::KEEPER_ADDRESS) {
            self.server.address = address;
        }
        if let Some(port) = lookup(vars::KEEPER_PORT) {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "ignoring invalid {}", vars::KEEPER_PORT),
            }
        }
        if let Some(url) = lookup(vars::KEEPER_DATABASE_URL) {
            self.server.database_url = url;
        }
        if let Some(secret) = lookup(vars::KEEPER_JWT_SECRET) {
            self.auth.jwt_secret = secret.into();
        }
        if let Some(key) = lookup(vars::KEEPER_CIPHER_KEY) {
            self.cipher.key = Some(key);
        }
        if let Some(nonce) = lookup(vars::KEEPER_CIPHER_NONCE) {
            self.cipher.nonce = Some(nonce);
        }
        if let Some(url) = lookup(vars::KEEPER_SERVER_URL) {
            self.client.server_url = url;
        }
        if let Some(secs) = lookup(vars::KEEPER_SYNC_INTERVAL) {
            match secs.parse() {
                Ok(secs) => self.client.sync_interval_secs = secs,
                Err(_) => {
                    tracing::warn!(value = %secs, "ignoring invalid {}", vars::KEEPER_SYNC_INTERVAL)
                }
            }
        }
        if let Some(level) = lookup(vars::KEEPER_LOG) {
            match serde_json::from_value::<LogLevel>(serde_json::Value::String(level.to_lowercase()))
            {
                Ok(level) => self.logging.level = level,
                Err(_) => tracing::warn!(value = %level, "ignoring invalid {}", vars::KEEPER_LOG),
            }
        }
        if let Some(json) = lookup(vars::KEEPER_LOG_JSON) {
            self.logging.json = env::parse_bool(&json);
        }
    }

    /// Address string suitable for binding a listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.address, self.server.port)
    }
}

fn check_hex_len(value: &str, expected: usize, what: &str, errors: &mut Vec<String>) {
    let valid = value.len() == expected * 2 && value.chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        errors.push(format!("{what} must be {expected} bytes of hex"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::parse(
            r#"{
                // comments are allowed
                server: { port: 9000 },
            }"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.address, "127.0.0.1");
        assert_eq!(config.auth.token_expiry_days, 14);
        assert_eq!(config.client.sync_interval_secs, 60);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_validate_default_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_server_requires_secret() {
        let mut config = Config::default();
        assert!(matches!(
            config.validate_server(),
            Err(ConfigError::Validation(_))
        ));

        config.auth.jwt_secret = "s3cret".into();
        assert!(config.validate_server().is_ok());
    }

    #[test]
    fn test_validate_collects_errors() {
        let mut config = Config::default();
        config.server.port = 0;
        config.cipher.key = Some("abcd".to_string());
        config.client.server_url = "localhost:8080".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("port"));
        assert!(err.contains("Cipher key"));
        assert!(err.contains("server_url"));
    }

    #[test]
    fn test_apply_overrides() {
        let env: HashMap<&str, &str> = [
            ("KEEPER_PORT", "9443"),
            ("KEEPER_JWT_SECRET", "from-env"),
            ("KEEPER_LOG", "DEBUG"),
            ("KEEPER_SYNC_INTERVAL", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9443);
        assert_eq!(config.auth.jwt_secret.expose_secret(), "from-env");
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.client.sync_interval_secs, 60);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("keeper.json5");

        let mut config = Config::default();
        config.server.port = 7070;
        config.auth.jwt_secret = "persisted".into();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.server.port, 7070);
        assert_eq!(loaded.auth.jwt_secret.expose_secret(), "persisted");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("absent.json5"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
