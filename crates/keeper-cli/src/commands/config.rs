//! Configuration management commands.

use clap::Args;
use keeper_core::{paths, Config};
use std::path::Path;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show configuration (the signing secret is masked)
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key (dot-separated path)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Value to set
        value: String,
    },

    /// Write a configuration file with defaults
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

/// Run the config command. `path` is the `--config` override, if given.
pub async fn run(args: ConfigArgs, config: Config, path: Option<&Path>) -> anyhow::Result<()> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => paths::config_file()?,
    };

    match args.command {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&masked(&config)?)?);
        }

        ConfigCommand::Get { key } => {
            let json = masked(&config)?;
            match get_path(&json, &key) {
                Some(v) => println!("{}", serde_json::to_string_pretty(v)?),
                None => anyhow::bail!("Key not found: {}", key),
            }
        }

        ConfigCommand::Set { key, value } => {
            let updated = set_path(&config, &key, &value)?;
            updated.save(&target)?;
            println!("Set {} = {}", key, value);
        }

        ConfigCommand::Init { force } => {
            init(&target, force)?;
            println!("Created config file: {}", target.display());
            println!("  Tip: set auth.jwt_secret before running `keeper serve`.");
        }

        ConfigCommand::Path => {
            println!("{}", target.display());
        }

        ConfigCommand::Validate => match config.validate_server() {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => anyhow::bail!("Configuration error: {}", e),
        },
    }

    Ok(())
}

/// Serialized config with `auth.jwt_secret` replaced by `***` when set.
fn masked(config: &Config) -> anyhow::Result<serde_json::Value> {
    let mut json = serde_json::to_value(config)?;
    if !config.auth.jwt_secret.is_empty() {
        json["auth"]["jwt_secret"] = serde_json::json!("***");
    }
    Ok(json)
}

fn get_path<'a>(json: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
    key.split('.').try_fold(json, |acc, k| acc.get(k))
}

/// Set a dot-separated key and re-validate the shape.
///
/// The value is parsed as JSON first (numbers, booleans), falling back to a
/// plain string.
fn set_path(config: &Config, key: &str, value: &str) -> anyhow::Result<Config> {
    let mut json = serde_json::to_value(config)?;

    let parts: Vec<&str> = key.split('.').collect();
    let mut current = &mut json;
    for (i, part) in parts.iter().enumerate() {
        if i == parts.len() - 1 {
            let parsed: serde_json::Value = serde_json::from_str(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
            current[part] = parsed;
        } else {
            if !current.get(part).is_some_and(|v| v.is_object()) {
                current[part] = serde_json::json!({});
            }
            current = &mut current[part];
        }
    }

    serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid configuration after set: {}", e))
}

fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }
    Config::default().save(path)?;
    Ok(())
}
