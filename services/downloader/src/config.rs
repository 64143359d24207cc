//! Configuration loading for product download runs.
//!
//! Loads product configurations from YAML files in config/products/

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};

use modis_common::TileId;

/// Root configuration loaded from a product YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductConfig {
    pub product: ProductInfo,
    /// Tiles covering the study area
    pub tiles: Vec<TileId>,
    /// File extension to download
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default)]
    pub dates: DateRange,
}

/// Basic product identification.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInfo {
    /// Short name, e.g. "MOD16A2"
    pub id: String,
    /// Collection version, e.g. "061"
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_format() -> String {
    "hdf".to_string()
}

/// Inclusive acquisition date window.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Check a date against the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

impl ProductConfig {
    /// The directory name the server lists the product under
    /// ("MOD16A2.061").
    pub fn remote_name(&self) -> String {
        format!("{}.{}", self.product.id, self.product.version)
    }

    /// Load a product configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ProductConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(product = %config.product.id, path = %path.display(), "Loaded product config");
        Ok(config)
    }
}

/// Load all enabled product configurations from a directory.
pub fn load_product_configs(config_dir: &Path) -> Result<Vec<ProductConfig>> {
    let products_dir = config_dir.join("products");

    if !products_dir.exists() {
        warn!(path = %products_dir.display(), "Products config directory not found");
        return Ok(Vec::new());
    }

    let mut configs = Vec::new();

    for entry in std::fs::read_dir(&products_dir)? {
        let entry = entry?;
        let path = entry.path();

        if path
            .extension()
            .map_or(false, |ext| ext == "yaml" || ext == "yml")
        {
            match ProductConfig::load(&path) {
                Ok(config) => {
                    if config.product.enabled {
                        info!(
                            product = %config.product.id,
                            version = %config.product.version,
                            tiles = config.tiles.len(),
                            "Loaded product configuration"
                        );
                        configs.push(config);
                    } else {
                        debug!(product = %config.product.id, "Skipping disabled product");
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to load product config");
                }
            }
        }
    }

    info!(count = configs.len(), "Loaded product configurations");
    Ok(configs)
}
