//! Product download runs with retry logic.
//!
//! Walks the data pool's product tree (mission -> product -> date
//! directories), selects the configured tiles and date window, and
//! downloads each file. Files stream into `<output>/<product>/` through a
//! `.partial` temp name and are renamed once complete; files already on
//! disk are skipped, so an interrupted run resumes where it stopped.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use futures::StreamExt;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::ProductConfig;
use crate::earthdata::EarthdataSession;
use crate::listing::{list_files, list_subdirectories, parse_date_dir};

/// Configuration for the download manager.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Maximum number of retry attempts per file
    pub max_retries: u32,
    /// Initial retry delay (doubles each retry)
    pub initial_retry_delay: Duration,
    /// Maximum retry delay
    pub max_retry_delay: Duration,
    /// Directory for completed downloads (one subdirectory per product)
    pub output_dir: PathBuf,
    /// Data pool base URL
    pub base_url: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_retry_delay: Duration::from_secs(2),
            max_retry_delay: Duration::from_secs(120),
            output_dir: PathBuf::from("data/modis"),
            base_url: "https://e4ftl01.cr.usgs.gov/".to_string(),
        }
    }
}

/// Summary of one product run.
#[derive(Debug, Default)]
pub struct RunStats {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Manages product downloads against one Earthdata session.
pub struct DownloadManager {
    session: EarthdataSession,
    config: DownloadConfig,
}

impl DownloadManager {
    pub fn new(session: EarthdataSession, config: DownloadConfig) -> Self {
        Self { session, config }
    }

    /// Download everything a product configuration selects.
    pub async fn run_product(&self, product: &ProductConfig) -> Result<RunStats> {
        let product_url = self.find_product_url(product).await?;
        info!(product = %product.product.id, url = %product_url, "Found product directory");

        let output_dir = self.config.output_dir.join(&product.product.id);
        fs::create_dir_all(&output_dir).await?;

        // Date directories inside the configured window
        let mut date_dirs: Vec<(chrono::NaiveDate, String)> = Vec::new();
        for dir in list_subdirectories(&self.session, &product_url).await? {
            if let Some(date) = parse_date_dir(&dir) {
                if product.dates.contains(date) {
                    date_dirs.push((date, format!("{}{}", product_url, dir)));
                }
            }
        }
        date_dirs.sort();

        info!(
            product = %product.product.id,
            dates = date_dirs.len(),
            "Selected date directories"
        );

        let mut stats = RunStats::default();
        for (di, (date, date_url)) in date_dirs.iter().enumerate() {
            let files = list_files(&self.session, date_url, &product.format).await?;
            let selected: Vec<&String> = files
                .iter()
                .filter(|f| {
                    product
                        .tiles
                        .iter()
                        .any(|tile| f.contains(&tile.to_string()))
                })
                .collect();

            debug!(
                date = %date,
                step = di + 1,
                total = date_dirs.len(),
                files = selected.len(),
                "Downloading date"
            );

            for file in selected {
                let url = format!("{}{}", date_url, file);
                match self.download_file(&url, &output_dir.join(file)).await {
                    Ok(true) => stats.downloaded += 1,
                    Ok(false) => stats.skipped += 1,
                    Err(e) => {
                        warn!(file = %file, error = %e, "Download failed");
                        stats.failed += 1;
                    }
                }
            }
        }

        info!(
            product = %product.product.id,
            downloaded = stats.downloaded,
            skipped = stats.skipped,
            failed = stats.failed,
            "Product run complete"
        );
        Ok(stats)
    }

    /// Walk the mission directories to find the product's URL.
    ///
    /// The pool groups products by mission (MOLT for Terra, MOLA for Aqua,
    /// MOTA for combined); the right group is discovered rather than
    /// configured.
    async fn find_product_url(&self, product: &ProductConfig) -> Result<String> {
        let remote_name = format!("{}/", product.remote_name());

        for mission in list_subdirectories(&self.session, &self.config.base_url).await? {
            let mission_url = format!("{}{}", self.config.base_url, mission);
            let products = list_subdirectories(&self.session, &mission_url).await?;
            if products.contains(&remote_name) {
                return Ok(format!("{}{}", mission_url, remote_name));
            }
        }

        Err(anyhow!(
            "product {} not found on {}",
            product.remote_name(),
            self.config.base_url
        ))
    }

    /// Download one file with retry and exponential backoff.
    ///
    /// Returns Ok(true) when the file was fetched, Ok(false) when it was
    /// already present.
    pub async fn download_file(&self, url: &str, dest: &Path) -> Result<bool> {
        if dest.exists() {
            debug!(path = %dest.display(), "File already exists, skipping");
            return Ok(false);
        }

        let mut retry_count = 0;
        let mut delay = self.config.initial_retry_delay;

        loop {
            match self.stream_to_file(url, dest).await {
                Ok(bytes) => {
                    debug!(path = %dest.display(), bytes = bytes, "Download completed");
                    return Ok(true);
                }
                Err(e) => {
                    retry_count += 1;
                    if retry_count > self.config.max_retries {
                        return Err(anyhow!(
                            "download failed after {} retries: {}",
                            retry_count,
                            e
                        ));
                    }

                    warn!(
                        error = %e,
                        retry = retry_count,
                        max_retries = self.config.max_retries,
                        delay_secs = delay.as_secs(),
                        "Download failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, self.config.max_retry_delay);
                }
            }
        }
    }

    /// Stream a response body into `<dest>.partial`, then rename.
    async fn stream_to_file(&self, url: &str, dest: &Path) -> Result<u64> {
        let temp_path = dest.with_extension("partial");

        let response = self.session.get(url).await?;
        let expected = response.content_length();

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .context("Failed to open temp file")?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Error reading response chunk")?;
            file.write_all(&chunk)
                .await
                .context("Error writing to file")?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        if let Some(expected) = expected {
            if written != expected {
                fs::remove_file(&temp_path).await.ok();
                return Err(anyhow!(
                    "size mismatch: expected {} bytes, got {}",
                    expected,
                    written
                ));
            }
        }

        fs::rename(&temp_path, dest)
            .await
            .context("Failed to move completed download")?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DownloadConfig::default();
        assert_eq!(config.max_retries, 5);
        assert!(config.base_url.ends_with('/'));
    }

    #[test]
    fn test_run_stats_default() {
        let stats = RunStats::default();
        assert_eq!(stats.downloaded + stats.skipped + stats.failed, 0);
    }
}
