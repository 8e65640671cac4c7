//! Keeper command-line interface.

pub mod commands;
pub mod parse;
pub mod render;
pub mod repl;

use clap::{Parser, Subcommand};
use keeper_core::{Config, ConfigError};
use std::path::{Path, PathBuf};

/// Keeper - encrypted secret storage with local sync
#[derive(Parser)]
#[command(name = "keeper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "KEEPER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the secret server
    Serve(commands::serve::ServeArgs),

    /// Open the interactive client shell
    Shell(commands::shell::ShellArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Load configuration from `path`, or from the default location when no
/// path is given. A missing default file yields the defaults. Environment
/// overrides apply in every case.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => {
            let mut config = Config::load(path)?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => Config::load_or_default(),
    }
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve(args) => commands::serve::run(args, config).await,
        Commands::Shell(args) => commands::shell::run(args, config).await,
        Commands::Config(args) => commands::config::run(args, config, cli.config.as_deref()).await,
        Commands::Version => {
            println!("keeper {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
