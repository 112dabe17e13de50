//! greencart-notify CLI
//!
//! Administrative trigger for welcome and verification-reminder emails.

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{BulkCommand, SendCommand};
use greencart_notify::config::NotifyConfig;
use greencart_notify::observability;

#[derive(Debug, Parser)]
#[command(name = "greencart-notify")]
#[command(version)]
#[command(about = "Send Green Cart notification emails", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the standard locations)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send one notification
    Send(SendCommand),
    /// Send the welcome email to many recipients at once
    Bulk(BulkCommand),
}

impl Cli {
    fn load_config(&self) -> Result<NotifyConfig> {
        match &self.config {
            Some(path) => NotifyConfig::load_from(path),
            None => NotifyConfig::load(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cli.load_config()?;
    observability::init_with(&config.logging)?;
    let services = config.build()?;
    tracing::debug!(command = ?cli.command, recipients = services.directory.len(), "Services ready");

    match cli.command {
        Commands::Send(cmd) => cmd.execute(&services).await,
        Commands::Bulk(cmd) => cmd.execute(&services).await,
    }
}
