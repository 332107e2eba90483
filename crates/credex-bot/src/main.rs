//! Credex exchange daemon - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Credit exchange daemon: matching engine plus autonomous bot strategies.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via CREDEX_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    credex_telemetry::init_logging()?;

    info!("Starting credex daemon v{}", env!("CARGO_PKG_VERSION"));

    // Config path: CLI arg > CREDEX_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("CREDEX_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");

    let config = credex_bot::AppConfig::from_file(&config_path)?;
    info!(
        tick_interval_secs = config.tick_interval_secs,
        bots = config.bots.len(),
        "Configuration loaded"
    );

    let app = credex_bot::App::build(config)?;
    app.run().await?;

    Ok(())
}
