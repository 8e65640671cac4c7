//! Shell command.

use crate::repl::{Repl, ReplConfig};
use clap::Args;
use keeper_client::KeeperClient;
use keeper_core::Config;

/// Shell command arguments.
#[derive(Args)]
pub struct ShellArgs {
    /// Server base URL, overriding the configuration file
    #[arg(long)]
    pub server_url: Option<String>,
}

/// Open the interactive shell.
pub async fn run(args: ShellArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(url) = args.server_url {
        config.client.server_url = url;
    }
    config.validate()?;
    keeper_core::paths::ensure_dirs()?;

    let client = KeeperClient::new(&config)?;
    let mut repl = Repl::new(client, ReplConfig::new(config.client.server_url.clone()));
    repl.run().await
}
