//! Pipeline configuration.
//!
//! One YAML file describes a full run: where the downloaded tiles are,
//! what to extract, and which transforms and outputs to apply.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use modis_common::TileId;
use render::ColorScale;

/// Root pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub reproject: Option<ReprojectConfig>,
    #[serde(default)]
    pub clip: Option<ClipConfig>,
    #[serde(default)]
    pub aggregate: AggregateConfig,
    pub output: OutputConfig,
}

/// What to extract from the local product directory.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Base directory holding one subdirectory per product
    pub base_dir: PathBuf,
    /// Product short name (e.g. "MOD16A2")
    pub product: String,
    /// Variable inside the tile files
    pub variable: String,
    pub tiles: Vec<TileId>,
    #[serde(default)]
    pub scale_factor: Option<f32>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    /// Optional pre-crop extent in sinusoidal meters: [minx, miny, maxx, maxy]
    #[serde(default)]
    pub extent: Option<[f64; 4]>,
}

/// Target grid for reprojection.
#[derive(Debug, Clone, Deserialize)]
pub struct ReprojectConfig {
    /// Target CRS, e.g. "EPSG:25830"
    pub crs: String,
    /// Target cell size in CRS units
    pub cellsize: f64,
    #[serde(default = "default_neighbors")]
    pub n_neighbors: usize,
    #[serde(default = "default_power")]
    pub power: f64,
}

fn default_neighbors() -> usize {
    1
}

fn default_power() -> f64 {
    2.0
}

/// Basin mask clipping.
///
/// The mask must be in the CRS the raster has when clipping runs (the
/// reprojection target when one is configured, sinusoidal otherwise).
#[derive(Debug, Clone, Deserialize)]
pub struct ClipConfig {
    pub mask: PathBuf,
    #[serde(default)]
    pub buffer: Option<f64>,
}

/// Optional temporal aggregations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregateConfig {
    /// "mean" or "sum"
    #[serde(default)]
    pub monthly: Option<String>,
    #[serde(default)]
    pub annual: Option<String>,
    #[serde(default = "default_annual_threshold")]
    pub annual_threshold: usize,
}

fn default_annual_threshold() -> usize {
    40
}

/// Where results land.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// NetCDF path for the extracted series; aggregations land next to it
    /// with `_monthly` / `_annual` suffixes
    pub netcdf: PathBuf,
    #[serde(default)]
    pub description: Option<String>,
    /// Directory for animation frames; no frames when unset
    #[serde(default)]
    pub frames_dir: Option<PathBuf>,
    #[serde(default)]
    pub color_scale: ColorScale,
}

impl PipelineConfig {
    /// Load a pipeline configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}
