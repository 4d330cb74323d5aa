use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use clima::{ClimaConfig, telemetry, web};

/// Download NASA POWER daily climate data for a point as an Excel workbook
#[derive(Debug, Parser)]
#[command(name = "clima", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ClimaConfig::load_from_path(Some(path.clone()))?,
        None => ClimaConfig::load()?,
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    telemetry::init(&config.logging, cli.verbose)?;

    if let Some(path) = &cli.config {
        tracing::debug!("Using config from: {}", path.display());
    }
    tracing::debug!(
        "POWER endpoint {}, geolocation endpoint {}",
        config.power.base_url,
        config.geolocation.url
    );

    web::run(&config).await
}
