//! Command-line interface

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Sluice - routing gateway for multi-provider LLM inference
#[derive(Debug, Parser)]
#[command(name = "sluice", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the gateway server (default)
    Serve {
        /// Path to the application config file
        #[arg(long, default_value = "config/sluice.toml")]
        config: PathBuf,
    },
}

/// Dispatch the parsed CLI
pub async fn run(cli: Cli) -> Result<()> {
    info!("Starting Sluice v{}", env!("CARGO_PKG_VERSION"));
    match cli.command {
        Some(Command::Serve { config }) => crate::server::serve(&config).await,
        None => crate::server::serve(&PathBuf::from("config/sluice.toml")).await,
    }
}
