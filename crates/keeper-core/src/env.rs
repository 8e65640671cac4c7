//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Interpret a string as a boolean flag.
pub fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name).map(|v| parse_bool(&v)).unwrap_or(false)
}

/// Get an environment variable as a u16 (e.g., for ports).
pub fn get_u16(name: &str) -> Option<u16> {
    get_var(name).and_then(|v| v.parse().ok())
}

/// Get an environment variable as a u64.
pub fn get_u64(name: &str) -> Option<u64> {
    get_var(name).and_then(|v| v.parse().ok())
}

/// Environment variable names recognised by Keeper.
pub mod vars {
    /// Keeper home directory override.
    pub const KEEPER_HOME: &str = "KEEPER_HOME";

    /// Config file override.
    pub const KEEPER_CONFIG: &str = "KEEPER_CONFIG";

    /// Server bind address.
    pub const KEEPER_ADDRESS: &str = "KEEPER_ADDRESS";

    /// Server bind port.
    pub const KEEPER_PORT: &str = "KEEPER_PORT";

    /// SQLite connection string.
    pub const KEEPER_DATABASE_URL: &str = "KEEPER_DATABASE_URL";

    /// Credential signing secret.
    pub const KEEPER_JWT_SECRET: &str = "KEEPER_JWT_SECRET";

    /// Cipher key, hex.
    pub const KEEPER_CIPHER_KEY: &str = "KEEPER_CIPHER_KEY";

    /// Cipher nonce, hex.
    pub const KEEPER_CIPHER_NONCE: &str = "KEEPER_CIPHER_NONCE";

    /// Server URL used by the client.
    pub const KEEPER_SERVER_URL: &str = "KEEPER_SERVER_URL";

    /// Client resync period in seconds.
    pub const KEEPER_SYNC_INTERVAL: &str = "KEEPER_SYNC_INTERVAL";

    /// Log level.
    pub const KEEPER_LOG: &str = "KEEPER_LOG";

    /// Emit JSON logs.
    pub const KEEPER_LOG_JSON: &str = "KEEPER_LOG_JSON";
}
