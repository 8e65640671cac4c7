//! Configuration schema definitions.

use crate::secret::SecretString;
use serde::{Deserialize, Serialize};

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default credential lifetime in days.
pub const DEFAULT_TOKEN_EXPIRY_DAYS: u32 = 14;

/// Default per-query database timeout in seconds.
pub const DEFAULT_DB_TIMEOUT_SECS: u64 = 5;

/// Default client resync period in seconds.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 60;

/// Main Keeper configuration.
///
/// The same file serves both the server (`server`, `auth`, `cipher`) and the
/// client (`client`, `cipher`); both sides must share the cipher settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server listener and storage.
    #[serde(default)]
    pub server: ServerConfig,

    /// Credential issuing.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Payload and bearer envelope cipher.
    #[serde(default)]
    pub cipher: CipherConfig,

    /// Interactive client settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_address")]
    pub address: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite connection string.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Upper bound on a single database query.
    #[serde(default = "default_db_timeout_secs")]
    pub db_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            database_url: default_database_url(),
            db_timeout_secs: default_db_timeout_secs(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_database_url() -> String {
    "sqlite://keeper.db".to_string()
}

fn default_db_timeout_secs() -> u64 {
    DEFAULT_DB_TIMEOUT_SECS
}

/// Authentication section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing credentials. Must be set to run the server.
    #[serde(default)]
    pub jwt_secret: SecretString,

    /// Credential lifetime.
    #[serde(default = "default_token_expiry_days")]
    pub token_expiry_days: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::default(),
            token_expiry_days: default_token_expiry_days(),
        }
    }
}

fn default_token_expiry_days() -> u32 {
    DEFAULT_TOKEN_EXPIRY_DAYS
}

/// Cipher section. Unset values fall back to the built-in key and nonce.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CipherConfig {
    /// 32-byte AES key, hex-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// 12-byte GCM nonce, hex-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// Client section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the server.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Period of the background resync while logged in.
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            sync_interval_secs: default_sync_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_server_url() -> String {
    format!("http://127.0.0.1:{DEFAULT_PORT}")
}

fn default_sync_interval_secs() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Logging section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}
