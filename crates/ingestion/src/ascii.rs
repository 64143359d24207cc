//! Building a series from per-date ASCII map exports.
//!
//! GIS tooling sometimes delivers MODIS maps as one ESRI ASCII grid per
//! date instead of HDF tiles. All maps must share the grid geometry of the
//! first one; product fill codes become NaN, the scale factor is applied,
//! and all-NaN border rows/columns are trimmed.

use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use ascii_grid::AsciiGrid;
use modis_common::CrsCode;
use raster::Raster3;

use crate::error::{IngestionError, Result};
use crate::filename::parse_ascii_filename_date;

/// Product fill codes marking missing cells, on top of the grid's own
/// NODATA marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillValues {
    /// One exact code
    Single(f32),
    /// An inclusive code range (MODIS quality codes are contiguous, e.g.
    /// 32761..=32767)
    Range(f32, f32),
}

impl FillValues {
    /// Build from a config-level list; only one or two values are valid.
    pub fn from_list(values: &[f32]) -> Result<Option<Self>> {
        match values {
            [] => Ok(None),
            [single] => Ok(Some(FillValues::Single(*single))),
            [low, high] => Ok(Some(FillValues::Range(*low, *high))),
            other => Err(IngestionError::InvalidFillValues(other.len())),
        }
    }

    fn matches(&self, v: f32) -> bool {
        match *self {
            FillValues::Single(code) => (v - code).abs() < 1e-6,
            FillValues::Range(low, high) => v >= low && v <= high,
        }
    }
}

/// Options for assembling a series from ASCII exports.
#[derive(Debug, Clone)]
pub struct AsciiSeriesOptions {
    /// Product token expected in the (lowercased) filenames
    pub product: String,
    /// Scale factor applied after fill handling
    pub scale_factor: Option<f32>,
    /// Product fill codes
    pub fill_values: Option<FillValues>,
    /// CRS the exported maps are in
    pub crs: CrsCode,
}

/// Build a `Raster3` from all matching `.asc` files in a directory.
pub fn from_ascii_dir(dir: &Path, opts: &AsciiSeriesOptions) -> Result<Raster3> {
    let needle = opts.product.to_lowercase();

    // Collect (date, path) sorted by date
    let mut dated: Vec<(NaiveDate, std::path::PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !name.to_lowercase().contains(&needle) {
            continue;
        }
        let Some(date) = parse_ascii_filename_date(name) else {
            continue;
        };
        dated.push((date, entry.path()));
    }
    dated.sort_by_key(|(date, _)| *date);

    if dated.is_empty() {
        return Err(IngestionError::NoFiles(format!(
            "no {} ASCII maps in {}",
            opts.product,
            dir.display()
        )));
    }

    info!(maps = dated.len(), product = %opts.product, "Reading ASCII maps");

    let mut times = Vec::with_capacity(dated.len());
    let mut data: Vec<f32> = Vec::new();
    let mut first: Option<AsciiGrid> = None;

    for (i, (date, path)) in dated.iter().enumerate() {
        debug!(map = i + 1, total = dated.len(), date = %date, "Reading map");
        let grid = AsciiGrid::read(path)?;

        if let Some(reference) = &first {
            if grid.ncols != reference.ncols || grid.nrows != reference.nrows {
                return Err(IngestionError::NoFiles(format!(
                    "{} is {}x{}, expected {}x{}",
                    path.display(),
                    grid.nrows,
                    grid.ncols,
                    reference.nrows,
                    reference.ncols
                )));
            }
        }

        for &v in &grid.data {
            let masked = match &opts.fill_values {
                Some(fill) if !v.is_nan() && fill.matches(v) => f32::NAN,
                _ => v,
            };
            data.push(masked);
        }
        times.push(*date);

        if first.is_none() {
            first = Some(grid);
        }
    }

    let reference = first
        .ok_or_else(|| IngestionError::NoFiles("no ASCII maps were read".to_string()))?;
    let mut series = Raster3::new(
        data,
        reference.x_centers(),
        reference.y_centers(),
        times,
        opts.crs,
    )?;

    if let Some(factor) = opts.scale_factor {
        series.scale(factor);
    }

    Ok(series.trim_nan_borders()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_map(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    const MAP_A: &str = "\
ncols 3
nrows 2
xllcorner 0
yllcorner 0
cellsize 10
NODATA_value -9999
-9999 10 32767
-9999 30 40
";

    const MAP_B: &str = "\
ncols 3
nrows 2
xllcorner 0
yllcorner 0
cellsize 10
NODATA_value -9999
-9999 11 21
-9999 31 41
";

    fn opts() -> AsciiSeriesOptions {
        AsciiSeriesOptions {
            product: "MOD16A2".to_string(),
            scale_factor: Some(0.1),
            fill_values: Some(FillValues::Range(32761.0, 32767.0)),
            crs: CrsCode::Epsg25830,
        }
    }

    #[test]
    fn test_fill_values_from_list() {
        assert_eq!(FillValues::from_list(&[]).unwrap(), None);
        assert_eq!(
            FillValues::from_list(&[9.0]).unwrap(),
            Some(FillValues::Single(9.0))
        );
        assert_eq!(
            FillValues::from_list(&[1.0, 5.0]).unwrap(),
            Some(FillValues::Range(1.0, 5.0))
        );
        assert!(matches!(
            FillValues::from_list(&[1.0, 2.0, 3.0]),
            Err(IngestionError::InvalidFillValues(3))
        ));
    }

    #[test]
    fn test_series_from_ascii_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_map(dir.path(), "mod16a2_A2003001.asc", MAP_A);
        write_map(dir.path(), "mod16a2_A2003009.asc", MAP_B);
        write_map(dir.path(), "other_A2003001.asc", MAP_A);

        let series = from_ascii_dir(dir.path(), &opts()).unwrap();
        assert_eq!(series.nt(), 2);
        // The all-NODATA west column is trimmed
        assert_eq!(series.nx(), 2);
        assert_eq!(series.ny(), 2);
        // Scale factor applied; fill code masked
        assert!((series.get(0, 0, 0) - 1.0).abs() < 1e-6);
        assert!(series.get(0, 0, 1).is_nan());
        assert!((series.get(1, 0, 1) - 2.1).abs() < 1e-6);
    }

    #[test]
    fn test_empty_dir_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            from_ascii_dir(dir.path(), &opts()),
            Err(IngestionError::NoFiles(_))
        ));
    }

    #[test]
    fn test_geometry_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_map(dir.path(), "mod16a2_A2003001.asc", MAP_A);
        write_map(
            dir.path(),
            "mod16a2_A2003009.asc",
            "\
ncols 2
nrows 2
xllcorner 0
yllcorner 0
cellsize 10
NODATA_value -9999
1 2
3 4
",
        );

        assert!(from_ascii_dir(dir.path(), &opts()).is_err());
    }
}
