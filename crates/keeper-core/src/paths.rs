//! Path resolution utilities.

use crate::env;
use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the Keeper base directory (`$KEEPER_HOME` or `~/.keeper`).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_var(env::vars::KEEPER_HOME) {
        return Ok(expand_tilde(&home));
    }
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".keeper"))
}

/// Get the main config file path (`$KEEPER_CONFIG` or `~/.keeper/keeper.json5`).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    if let Some(path) = env::get_var(env::vars::KEEPER_CONFIG) {
        return Ok(expand_tilde(&path));
    }
    Ok(base_dir()?.join("keeper.json5"))
}

/// Get the REPL history file path (~/.keeper/history.txt).
pub fn history_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("history.txt"))
}

/// Ensure the base directory exists.
pub fn ensure_dirs() -> Result<(), ConfigError> {
    std::fs::create_dir_all(base_dir()?)?;
    Ok(())
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
