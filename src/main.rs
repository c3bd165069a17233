//! # ShipStack API Main Entry Point

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use shipstack::{config::ConfigLoader, server::run_server, telemetry};

#[derive(Debug, Parser)]
#[command(name = "shipstack", version, about = "ShipStack multi-tenant API server")]
struct Cli {
    /// Directory containing the layered `.env` files
    #[arg(long, value_name = "DIR")]
    env_dir: Option<PathBuf>,

    /// Apply database migrations and exit
    #[arg(long)]
    migrate_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let loader = match cli.env_dir {
        Some(dir) => ConfigLoader::with_base_dir(dir),
        None => ConfigLoader::new(),
    };
    let config = loader.load().context("Failed to load configuration")?;

    telemetry::init_tracing(&config).context("Failed to initialize tracing")?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    run_server(config, cli.migrate_only).await
}
