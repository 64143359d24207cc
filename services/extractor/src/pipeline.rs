//! The extract -> reproject -> clip -> aggregate -> export pipeline.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::info;

use ascii_grid::AsciiGrid;
use ingestion::{extract, ExtractOptions};
use modis_common::{BoundingBox, CrsCode};
use raster::{
    annual_series, monthly_series, write_series, Aggregation, Raster3, ReprojectOptions,
};
use render::{export_frames, FrameOptions};

use crate::config::PipelineConfig;

/// Run a configured pipeline end to end.
pub fn run(config: &PipelineConfig) -> Result<()> {
    let mut series = extract_series(config)?;

    if let Some(reproject) = &config.reproject {
        let target = CrsCode::parse(&reproject.crs)
            .map_err(|e| anyhow!("invalid reprojection CRS: {}", e))?;
        let opts = ReprojectOptions {
            cellsize: reproject.cellsize,
            n_neighbors: reproject.n_neighbors,
            power: reproject.power,
        };
        info!(crs = %target, cellsize = reproject.cellsize, "Reprojecting");
        series = series.reproject(target, &opts)?;
    }

    if let Some(clip) = &config.clip {
        info!(mask = %clip.mask.display(), "Clipping to basin mask");
        let mask = AsciiGrid::read(&clip.mask)
            .with_context(|| format!("Failed to read mask {}", clip.mask.display()))?;
        series = series.clip(&mask, clip.buffer)?;
    }

    export(config, &series)?;
    Ok(())
}

fn extract_series(config: &PipelineConfig) -> Result<Raster3> {
    let e = &config.extraction;

    let date_range = match (e.start, e.end) {
        (Some(start), Some(end)) => Some((start, end)),
        (None, None) => None,
        _ => {
            return Err(anyhow!(
                "extraction date range needs both start and end (or neither)"
            ))
        }
    };

    let opts = ExtractOptions {
        product: e.product.clone(),
        variable: e.variable.clone(),
        tiles: e.tiles.clone(),
        scale_factor: e.scale_factor,
        date_range,
        extent: e
            .extent
            .map(|[min_x, min_y, max_x, max_y]| BoundingBox::new(min_x, min_y, max_x, max_y)),
        units: e.units.clone(),
    };

    info!(
        product = %e.product,
        variable = %e.variable,
        tiles = e.tiles.len(),
        "Extracting series"
    );
    Ok(extract(&e.base_dir, &opts)?)
}

fn export(config: &PipelineConfig, series: &Raster3) -> Result<()> {
    let out = &config.output;

    if let Some(parent) = out.netcdf.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_series(&out.netcdf, series, out.description.as_deref())?;

    if let Some(agg) = parse_aggregation(config.aggregate.monthly.as_deref())? {
        let monthly = monthly_series(series, agg)?;
        let path = suffixed(&out.netcdf, "_monthly");
        write_series(&path, &monthly, out.description.as_deref())?;
        info!(path = %path.display(), layers = monthly.nt(), "Wrote monthly series");
    }

    if let Some(agg) = parse_aggregation(config.aggregate.annual.as_deref())? {
        let annual = annual_series(series, agg, config.aggregate.annual_threshold)?;
        let path = suffixed(&out.netcdf, "_annual");
        write_series(&path, &annual, out.description.as_deref())?;
        info!(path = %path.display(), layers = annual.nt(), "Wrote annual series");
    }

    if let Some(frames_dir) = &out.frames_dir {
        let frame_opts = FrameOptions {
            scale: out.color_scale,
            min_max: None,
            prefix: config.extraction.variable.clone(),
        };
        export_frames(series, frames_dir, &frame_opts)?;
    }

    Ok(())
}

fn parse_aggregation(name: Option<&str>) -> Result<Option<Aggregation>> {
    match name {
        None => Ok(None),
        Some("mean") => Ok(Some(Aggregation::Mean)),
        Some("sum") => Ok(Some(Aggregation::Sum)),
        Some(other) => Err(anyhow!(
            "unknown aggregation '{}', expected 'mean' or 'sum'",
            other
        )),
    }
}

/// `out/et.nc` + `_monthly` -> `out/et_monthly.nc`
fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("series");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("nc");
    path.with_file_name(format!("{}{}.{}", stem, suffix, ext))
}
