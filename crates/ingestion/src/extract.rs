//! Assembling a raster series from a local product directory.
//!
//! The directory layout mirrors the download service: one subdirectory per
//! product under a base path, holding per-tile per-date HDF files. For each
//! selected date every tile is read and mosaicked; the per-date mosaics
//! stack into one `Raster3` on the sinusoidal grid.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info};

use hdf_parser::read_tile;
use modis_common::{BoundingBox, CrsCode, TileId};
use raster::{mosaic, Raster3, TileBlock};

use crate::error::{IngestionError, Result};
use crate::filename::parse_tile_filename;

/// Options for series extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Product short name, also the subdirectory name (e.g. "MOD16A2")
    pub product: String,
    /// Variable to read from each tile file
    pub variable: String,
    /// Tiles that cover the study area
    pub tiles: Vec<TileId>,
    /// Product scale factor applied to the stacked series
    pub scale_factor: Option<f32>,
    /// Inclusive acquisition date range; None extracts everything present
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Optional pre-crop extent in sinusoidal meters
    pub extent: Option<BoundingBox>,
    /// Units recorded on the result
    pub units: Option<String>,
}

/// Extract a product's series from `<base_dir>/<product>/`.
pub fn extract(base_dir: &Path, opts: &ExtractOptions) -> Result<Raster3> {
    if opts.tiles.is_empty() {
        return Err(IngestionError::NoFiles("no tiles requested".to_string()));
    }

    let product_dir = base_dir.join(&opts.product);
    let files = select_files(&product_dir, opts)?;

    let dates: Vec<NaiveDate> = files
        .values()
        .next()
        .map(|per_tile| per_tile.keys().copied().collect())
        .unwrap_or_default();

    info!(
        product = %opts.product,
        tiles = opts.tiles.len(),
        dates = dates.len(),
        "Selected tile files"
    );

    let mut data: Vec<f32> = Vec::new();
    let mut x: Vec<f64> = Vec::new();
    let mut y: Vec<f64> = Vec::new();
    let mut col_keep: Option<Vec<usize>> = None;
    let mut row_keep: Option<Vec<usize>> = None;

    for (d, date) in dates.iter().enumerate() {
        debug!(date = %date, step = d + 1, total = dates.len(), "Mosaicking date");

        let mut blocks = Vec::with_capacity(opts.tiles.len());
        for tile in &opts.tiles {
            let path = &files[tile][date];
            let tile_data = read_tile(path, &opts.variable)?;
            blocks.push(TileBlock {
                attrs: tile_data.attrs,
                data: tile_data.data,
            });
        }

        let m = mosaic(&blocks)?;

        // The crop indices derive from the first date's grid and apply to
        // every date
        if col_keep.is_none() {
            let (cols, rows) = crop_indices(&m.x, &m.y, opts.extent.as_ref());
            if cols.is_empty() || rows.is_empty() {
                return Err(IngestionError::NoFiles(format!(
                    "extent {:?} does not overlap the mosaic",
                    opts.extent
                )));
            }
            x = cols.iter().map(|&c| m.x[c]).collect();
            y = rows.iter().map(|&r| m.y[r]).collect();
            col_keep = Some(cols);
            row_keep = Some(rows);
        }

        if let (Some(cols), Some(rows)) = (&col_keep, &row_keep) {
            let ncols = m.x.len();
            for &row in rows {
                for &col in cols {
                    data.push(m.data[row * ncols + col]);
                }
            }
        }
    }

    let mut series = Raster3::new(data, x, y, dates, CrsCode::Sinusoidal)?
        .with_metadata(Some(opts.variable.clone()), opts.units.clone());

    if let Some(factor) = opts.scale_factor {
        series.scale(factor);
    }

    info!(
        nt = series.nt(),
        ny = series.ny(),
        nx = series.nx(),
        "Extracted series"
    );
    Ok(series)
}

/// Scan the product directory and group files by tile and date.
///
/// Every requested tile must cover exactly the same set of dates.
fn select_files(
    product_dir: &Path,
    opts: &ExtractOptions,
) -> Result<BTreeMap<TileId, BTreeMap<NaiveDate, PathBuf>>> {
    if !product_dir.is_dir() {
        return Err(IngestionError::NoFiles(format!(
            "product directory not found: {}",
            product_dir.display()
        )));
    }

    let mut files: BTreeMap<TileId, BTreeMap<NaiveDate, PathBuf>> =
        opts.tiles.iter().map(|&t| (t, BTreeMap::new())).collect();

    for entry in std::fs::read_dir(product_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };

        let Some(info) = parse_tile_filename(name) else {
            continue;
        };
        if info.product != opts.product {
            continue;
        }
        if let Some((start, end)) = opts.date_range {
            if info.date < start || info.date > end {
                continue;
            }
        }
        if let Some(per_tile) = files.get_mut(&info.tile) {
            per_tile.insert(info.date, entry.path());
        }
    }

    if files.values().all(|m| m.is_empty()) {
        return Err(IngestionError::NoFiles(format!(
            "no matching files for {} in {}",
            opts.product,
            product_dir.display()
        )));
    }

    // All tiles must agree on the available dates
    let reference: Vec<NaiveDate> = files
        .values()
        .next()
        .map(|m| m.keys().copied().collect())
        .unwrap_or_default();
    for per_tile in files.values() {
        let dates: Vec<NaiveDate> = per_tile.keys().copied().collect();
        if dates != reference {
            let counts: Vec<String> = files
                .iter()
                .map(|(t, m)| format!("{}: {}", t, m.len()))
                .collect();
            return Err(IngestionError::DateCountMismatch(counts.join(", ")));
        }
    }

    Ok(files)
}

/// Indices of the columns/rows whose centers fall inside the extent.
fn crop_indices(
    x: &[f64],
    y: &[f64],
    extent: Option<&BoundingBox>,
) -> (Vec<usize>, Vec<usize>) {
    match extent {
        None => ((0..x.len()).collect(), (0..y.len()).collect()),
        Some(e) => (
            (0..x.len())
                .filter(|&c| x[c] >= e.min_x && x[c] <= e.max_x)
                .collect(),
            (0..y.len())
                .filter(|&r| y[r] >= e.min_y && y[r] <= e.max_y)
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(tiles: &[&str]) -> ExtractOptions {
        ExtractOptions {
            product: "MOD16A2".to_string(),
            variable: "ET_500m".to_string(),
            tiles: tiles.iter().map(|t| t.parse().unwrap()).collect(),
            scale_factor: Some(0.1),
            date_range: None,
            extent: None,
            units: Some("mm/8d".to_string()),
        }
    }

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_select_files_groups_by_tile_and_date() {
        let dir = tempfile::tempdir().unwrap();
        let product_dir = dir.path().join("MOD16A2");
        std::fs::create_dir(&product_dir).unwrap();

        touch(&product_dir, "MOD16A2.A2003001.h17v04.105.x.hdf");
        touch(&product_dir, "MOD16A2.A2003009.h17v04.105.x.hdf");
        touch(&product_dir, "MOD16A2.A2003001.h17v05.105.x.hdf");
        touch(&product_dir, "MOD16A2.A2003009.h17v05.105.x.hdf");
        touch(&product_dir, "notes.txt");

        let files = select_files(&product_dir, &opts(&["h17v04", "h17v05"])).unwrap();
        assert_eq!(files.len(), 2);
        for per_tile in files.values() {
            assert_eq!(per_tile.len(), 2);
        }
    }

    #[test]
    fn test_select_files_date_filter() {
        let dir = tempfile::tempdir().unwrap();
        let product_dir = dir.path().join("MOD16A2");
        std::fs::create_dir(&product_dir).unwrap();

        touch(&product_dir, "MOD16A2.A2003001.h17v04.105.x.hdf");
        touch(&product_dir, "MOD16A2.A2004001.h17v04.105.x.hdf");

        let mut o = opts(&["h17v04"]);
        o.date_range = Some((
            NaiveDate::from_ymd_opt(2003, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2003, 12, 31).unwrap(),
        ));

        let files = select_files(&product_dir, &o).unwrap();
        assert_eq!(files[&"h17v04".parse::<TileId>().unwrap()].len(), 1);
    }

    #[test]
    fn test_select_files_mismatched_dates_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let product_dir = dir.path().join("MOD16A2");
        std::fs::create_dir(&product_dir).unwrap();

        touch(&product_dir, "MOD16A2.A2003001.h17v04.105.x.hdf");
        touch(&product_dir, "MOD16A2.A2003009.h17v04.105.x.hdf");
        touch(&product_dir, "MOD16A2.A2003001.h17v05.105.x.hdf");

        let err = select_files(&product_dir, &opts(&["h17v04", "h17v05"])).unwrap_err();
        assert!(matches!(err, IngestionError::DateCountMismatch(_)));
    }

    #[test]
    fn test_missing_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract(dir.path(), &opts(&["h17v04"])).unwrap_err();
        assert!(matches!(err, IngestionError::NoFiles(_)));
    }

    #[test]
    fn test_crop_indices() {
        let x = vec![5.0, 15.0, 25.0, 35.0];
        let y = vec![35.0, 25.0, 15.0, 5.0];
        let extent = BoundingBox::new(10.0, 10.0, 30.0, 30.0);

        let (cols, rows) = crop_indices(&x, &y, Some(&extent));
        assert_eq!(cols, vec![1, 2]);
        assert_eq!(rows, vec![1, 2]);
    }
}
