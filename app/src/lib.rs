//! pegswap command-line front end
//!
//! Loads configuration, installs logging and dispatches to one command.

pub mod commands;

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use peg_core::{AppConfig, Direction};

/// Peg swap client for the stable controller
#[derive(Parser, Debug, Clone)]
#[command(name = "pegswap", author, version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "PEGSWAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Node JSON-RPC endpoint (overrides config and PEGSWAP_RPC_URL)
    #[arg(long)]
    pub rpc_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Probe the configured node
    Status,

    /// Show fee rate, assets and optionally an account's balances
    State {
        #[arg(long)]
        account: Option<Address>,
    },

    /// Quote a swap without sending anything
    Quote {
        /// mint or redeem
        direction: Direction,
        /// Amount in the source asset, e.g. 99.5
        amount: String,
    },

    /// Approve if needed, swap and wait for the receipt
    Swap {
        direction: Direction,
        amount: String,
        #[arg(long)]
        account: Address,
    },

    /// Start the HTTP API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// File config, then environment, then flags
    pub fn load_config(&self) -> anyhow::Result<AppConfig> {
        self.load_config_with(|key| std::env::var(key).ok())
    }

    /// [`Cli::load_config`] with environment variables read through `env`
    pub fn load_config_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };
        config.apply_overrides(env)?;
        if let Some(url) = &self.rpc_url {
            config.node.url = url.clone();
        }
        if let Command::Serve { port: Some(port) } = &self.command {
            config.api_port = *port;
        }
        Ok(config)
    }
}

/// Install the global `tracing` subscriber
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pegswap=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .init();
    Ok(())
}

/// Run the parsed command to completion
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.load_config()?;
    tracing::debug!(url = %config.node.url, network = %config.network, "configuration loaded");

    match cli.command {
        Command::Status => commands::node::status(&config).await,
        Command::State { account } => commands::swap::state(&config, account).await,
        Command::Quote { direction, amount } => {
            commands::swap::quote(&config, direction, &amount).await
        }
        Command::Swap {
            direction,
            amount,
            account,
        } => commands::swap::swap(&config, direction, &amount, account).await,
        Command::Serve { .. } => commands::serve::serve(config).await,
    }
}
