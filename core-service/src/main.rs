//! jobsync - publish job listings from public job boards to a WordPress site
//!
//! Each run fetches listings for the configured query axes, skips listings
//! already recorded in the local ledger or already present on the site, and
//! publishes the rest.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use bridge_traits::time::LogLevel;
use clap::Parser;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::RunConfig;
use core_service::{CoreDependencies, SyncService};
use tracing::{error, info};

/// Job listing sync
#[derive(Parser, Debug)]
#[command(name = "jobsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "JOBSYNC_CONFIG", default_value = "jobsync.json")]
    config: PathBuf,

    /// Override the ledger file path
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Process only this region (overrides PROCESS_REGION)
    #[arg(long)]
    region: Option<String>,

    /// Repeat runs, waiting this many seconds between them
    #[arg(long, value_name = "SECS")]
    every: Option<u64>,

    /// Log output format: pretty, json or compact
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,

    /// Minimum level for jobsync crates
    #[arg(long, default_value = "info")]
    log_level: LogLevel,

    /// Full filter directive, replaces the per-crate default
    #[arg(long, env = "JOBSYNC_LOG")]
    log_filter: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::default()
        .with_format(cli.log_format)
        .with_level(cli.log_level);
    if let Some(filter) = &cli.log_filter {
        logging = logging.with_filter(filter.clone());
    }
    init_logging(logging).context("Failed to initialize logging")?;

    let config = load_config(&cli)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(run(config, cli.every.map(Duration::from_secs)))
}

fn load_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = RunConfig::from_file(&cli.config)?;
    config.apply_env_overrides(|name| std::env::var(name).ok());
    if let Some(ledger) = &cli.ledger {
        config.ledger.path = ledger.clone();
    }
    if let Some(region) = &cli.region {
        config.process_region = Some(region.clone());
    }
    config.validate().context("Invalid configuration")?;

    info!(config = %cli.config.display(), "Configuration loaded");
    Ok(config)
}

async fn run(config: RunConfig, every: Option<Duration>) -> Result<()> {
    let deps = CoreDependencies::desktop(&config)?;
    let mut service = SyncService::new(&config, deps).context("Failed to build sync service")?;

    let Some(interval) = every else {
        service.run_once().await.context("Sync run failed")?;
        return Ok(());
    };

    info!(interval_secs = interval.as_secs(), "Loop mode");
    loop {
        if let Err(e) = service.run_once().await {
            error!(error = %e, "Sync run failed");
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                return Ok(());
            }
        }
    }
}
