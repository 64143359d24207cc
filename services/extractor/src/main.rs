//! MODIS series extractor service.
//!
//! Runs the configured pipeline over locally downloaded tiles: mosaic and
//! stack the product, optionally reproject and clip to a basin, aggregate,
//! and export netCDF series plus animation frames.

mod config;
mod pipeline;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::PipelineConfig;

#[derive(Parser, Debug)]
#[command(name = "extractor")]
#[command(about = "MODIS series extraction pipeline")]
struct Args {
    /// Pipeline configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(config = %args.config.display(), "Starting extraction pipeline");

    let config = PipelineConfig::load(&args.config)?;
    pipeline::run(&config)?;

    info!("Pipeline complete");
    Ok(())
}
