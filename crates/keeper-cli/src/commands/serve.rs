//! Serve command.

use clap::Args;
use keeper_core::Config;
use keeper_server::Server;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Serve command arguments. Flags override the configuration file.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(short, long)]
    pub address: Option<String>,

    /// Port number
    #[arg(short, long)]
    pub port: Option<u16>,

    /// SQLite connection string
    #[arg(long)]
    pub database_url: Option<String>,
}

impl ServeArgs {
    fn apply(self, config: &mut Config) {
        if let Some(address) = self.address {
            config.server.address = address;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.database_url {
            config.server.database_url = url;
        }
    }
}

/// Run the server until ctrl-c.
pub async fn run(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply(&mut config);

    let server = Server::from_config(&config).await?;
    let shutdown = CancellationToken::new();

    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received ctrl-c, shutting down");
        }
        signal.cancel();
    });

    server.run(shutdown).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        ServeArgs {
            address: None,
            port: Some(9443),
            database_url: Some("sqlite::memory:".into()),
        }
        .apply(&mut config);

        assert_eq!(config.server.address, "127.0.0.1");
        assert_eq!(config.server.port, 9443);
        assert_eq!(config.server.database_url, "sqlite::memory:");
    }
}
