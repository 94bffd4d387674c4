//! Market maker entry point.
//!
//! Runs exactly one iteration and exits; the host scheduler owns the
//! cadence, retries and overlap exclusion. The structured result is
//! printed as JSON for the scheduler to branch on: a funding soft-failure
//! still exits 0.

use anyhow::Result;
use clap::Parser;
use hpx_maker::config::CONFIG_PATH_ENV;
use hpx_maker::{run_iteration, AppConfig, IterationResult};
use hpx_venue::{IndexClient, LedgerClient};
use tracing::{error, info};

/// Hashpower term-futures market maker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via HPX_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    hpx_maker::init_logging();

    info!("Starting hpx-maker v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = AppConfig::from_file(&config_path)?;

    let ledger = LedgerClient::new(
        config.ledger_url.clone(),
        config.maker_address.clone(),
        config.session_key.clone(),
    )?;
    let index = IndexClient::new(config.index_url.clone())?;

    let result = match run_iteration(&config, &ledger, &index).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Market maker iteration failed");
            IterationResult::fatal(e.to_string())
        }
    };

    println!("{}", serde_json::to_string(&result)?);

    if !result.success && !result.insufficient_funds {
        std::process::exit(1);
    }
    Ok(())
}
