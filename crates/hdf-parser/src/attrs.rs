//! HDF-EOS `StructMetadata.0` parsing.
//!
//! Every MODIS land-product tile carries a global `StructMetadata.0` text
//! attribute describing its grid: pixel dimensions and the projected
//! coordinates of the upper-left and lower-right corners. Those four corner
//! values are what positions a tile inside a mosaic.

use crate::error::{HdfError, HdfResult};

/// Grid attributes of a single MODIS tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileAttributes {
    /// Number of columns (XDim)
    pub ncols: usize,
    /// Number of rows (YDim)
    pub nrows: usize,
    /// X of the upper-left corner (meters, sinusoidal)
    pub x_min: f64,
    /// Y of the upper-left corner
    pub y_max: f64,
    /// X of the lower-right corner
    pub x_max: f64,
    /// Y of the lower-right corner
    pub y_min: f64,
}

impl TileAttributes {
    /// Column width in meters.
    pub fn col_size(&self) -> f64 {
        (self.x_max - self.x_min) / self.ncols as f64
    }

    /// Row height in meters.
    pub fn row_size(&self) -> f64 {
        (self.y_max - self.y_min) / self.nrows as f64
    }

    /// Cell-center X coordinates (ascending).
    pub fn x_centers(&self) -> Vec<f64> {
        let size = self.col_size();
        (0..self.ncols)
            .map(|c| self.x_min + (c as f64 + 0.5) * size)
            .collect()
    }

    /// Cell-center Y coordinates (descending, matching row order).
    pub fn y_centers(&self) -> Vec<f64> {
        let size = self.row_size();
        (0..self.nrows)
            .map(|r| self.y_max - (r as f64 + 0.5) * size)
            .collect()
    }
}

/// Parse `TileAttributes` from `StructMetadata.0` text.
///
/// The metadata is an ODL-like block; the grid keys of interest look like:
///
/// ```text
/// XDim=1200
/// YDim=1200
/// UpperLeftPointMtrs=(-1111950.519667,4447802.078667)
/// LowerRightMtrs=(0.000000,3335851.559000)
/// ```
///
/// Keys are located by name rather than line position; tiles from different
/// collections pad the block differently.
pub fn parse_struct_metadata(metadata: &str) -> HdfResult<TileAttributes> {
    let ncols = find_scalar(metadata, "XDim")? as usize;
    let nrows = find_scalar(metadata, "YDim")? as usize;
    let (x_min, y_max) = find_pair(metadata, "UpperLeftPointMtrs")?;
    let (x_max, y_min) = find_pair(metadata, "LowerRightMtrs")?;

    if ncols == 0 || nrows == 0 {
        return Err(HdfError::InvalidStructMetadata(format!(
            "zero grid dimension: {}x{}",
            ncols, nrows
        )));
    }

    Ok(TileAttributes {
        ncols,
        nrows,
        x_min,
        y_max,
        x_max,
        y_min,
    })
}

/// Find `key=value` in the metadata text and parse the value as a number.
fn find_scalar(metadata: &str, key: &str) -> HdfResult<f64> {
    let raw = find_value(metadata, key)?;
    raw.parse().map_err(|_| {
        HdfError::InvalidStructMetadata(format!("{}={} is not a number", key, raw))
    })
}

/// Find `key=(a,b)` in the metadata text and parse the coordinate pair.
fn find_pair(metadata: &str, key: &str) -> HdfResult<(f64, f64)> {
    let raw = find_value(metadata, key)?;
    let inner = raw
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| {
            HdfError::InvalidStructMetadata(format!("{}={} is not a coordinate pair", key, raw))
        })?;

    let mut parts = inner.split(',');
    let a: f64 = parts
        .next()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| {
            HdfError::InvalidStructMetadata(format!("{}={} is not a coordinate pair", key, raw))
        })?;
    let b: f64 = parts
        .next()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| {
            HdfError::InvalidStructMetadata(format!("{}={} is not a coordinate pair", key, raw))
        })?;

    Ok((a, b))
}

fn find_value<'a>(metadata: &'a str, key: &str) -> HdfResult<&'a str> {
    for line in metadata.lines() {
        let trimmed = line.trim().trim_start_matches('\t');
        if let Some(rest) = trimmed.strip_prefix(key) {
            if let Some(value) = rest.trim_start().strip_prefix('=') {
                return Ok(value.trim());
            }
        }
    }
    Err(HdfError::MissingAttribute(format!(
        "StructMetadata key {}",
        key
    )))
}
