//! MODIS product downloader service.
//!
//! Downloads tile files from the LP DAAC data pool with:
//! - Earthdata cookie-based authentication
//! - HTML index scraping for date/file discovery
//! - Automatic retry with exponential backoff
//! - Skip-existing so interrupted runs resume

mod config;
mod download;
mod earthdata;
mod listing;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use config::load_product_configs;
use download::{DownloadConfig, DownloadManager};
use earthdata::{EarthdataCredentials, EarthdataSession};

#[derive(Parser, Debug)]
#[command(name = "downloader")]
#[command(about = "MODIS product downloader with Earthdata authentication")]
struct Args {
    /// Specific product to download (default: all configured)
    #[arg(short, long)]
    product: Option<String>,

    /// Directory for completed downloads
    #[arg(long, default_value = "data/modis")]
    output_dir: PathBuf,

    /// Data pool base URL
    #[arg(long, env = "MODIS_BASE_URL", default_value = "https://e4ftl01.cr.usgs.gov/")]
    base_url: String,

    /// Maximum retry attempts per file
    #[arg(long, default_value = "5")]
    max_retries: u32,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "600")]
    request_timeout_secs: u64,

    /// Configuration directory (contains products/*.yaml)
    #[arg(long, env = "CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present (Earthdata credentials)
    dotenvy::dotenv().ok();

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
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting MODIS product downloader");

    let mut base_url = args.base_url.clone();
    if !base_url.ends_with('/') {
        base_url.push('/');
    }

    let configs = load_product_configs(&args.config_dir)?;
    let selected: Vec<_> = match &args.product {
        Some(id) => configs
            .into_iter()
            .filter(|c| &c.product.id == id)
            .collect(),
        None => configs,
    };

    if selected.is_empty() {
        error!("No product configurations selected");
        return Ok(());
    }

    let credentials = EarthdataCredentials::from_env()?;
    let session = EarthdataSession::new(
        credentials,
        Duration::from_secs(args.request_timeout_secs),
    )?;

    let manager = DownloadManager::new(
        session,
        DownloadConfig {
            max_retries: args.max_retries,
            initial_retry_delay: Duration::from_secs(2),
            max_retry_delay: Duration::from_secs(120),
            output_dir: args.output_dir.clone(),
            base_url,
        },
    );

    let mut failed_products = 0usize;
    for product in &selected {
        info!(product = %product.product.id, "Starting product run");
        match manager.run_product(product).await {
            Ok(stats) => {
                if stats.failed > 0 {
                    failed_products += 1;
                }
            }
            Err(e) => {
                error!(product = %product.product.id, error = %e, "Product run failed");
                failed_products += 1;
            }
        }
    }

    if failed_products > 0 {
        error!(failed = failed_products, "Some product runs had failures");
    } else {
        info!("All product runs complete");
    }

    Ok(())
}
