//! Stitching per-tile grids into one unified grid.
//!
//! Each MODIS tile covers a fixed block of the sinusoidal plane; its
//! position inside a multi-tile mosaic follows from the offset of its
//! corners relative to the combined bounding box, divided by the tile pixel
//! size. Tiles are placed as whole blocks, so any rectangular tile layout
//! works, not just two-tile strips.

use hdf_parser::TileAttributes;
use tracing::debug;

use crate::error::{RasterError, Result};

/// Relative tolerance for cell-size agreement between tiles.
const CELL_SIZE_TOLERANCE: f64 = 1e-3;

/// One tile's attributes and values, ready for placement.
#[derive(Debug, Clone)]
pub struct TileBlock {
    pub attrs: TileAttributes,
    /// Row-major values, `attrs.nrows * attrs.ncols`
    pub data: Vec<f32>,
}

/// The combined grid derived from a set of tile attributes.
#[derive(Debug, Clone)]
pub struct MosaicLayout {
    pub ncols: usize,
    pub nrows: usize,
    /// Mean column width (meters)
    pub col_size: f64,
    /// Mean row height (meters, positive)
    pub row_size: f64,
    /// Upper-left corner of the combined extent
    pub x_min: f64,
    pub y_max: f64,
    /// Lower-right corner of the combined extent
    pub x_max: f64,
    pub y_min: f64,
}

impl MosaicLayout {
    /// Derive the combined layout from per-tile attributes.
    pub fn from_tiles(tiles: &[TileAttributes]) -> Result<Self> {
        if tiles.is_empty() {
            return Err(RasterError::EmptyInput("no tiles to mosaic".to_string()));
        }

        let x_min = tiles.iter().map(|t| t.x_min).fold(f64::INFINITY, f64::min);
        let y_max = tiles
            .iter()
            .map(|t| t.y_max)
            .fold(f64::NEG_INFINITY, f64::max);
        let x_max = tiles
            .iter()
            .map(|t| t.x_max)
            .fold(f64::NEG_INFINITY, f64::max);
        let y_min = tiles.iter().map(|t| t.y_min).fold(f64::INFINITY, f64::min);

        let col_size =
            tiles.iter().map(|t| t.col_size()).sum::<f64>() / tiles.len() as f64;
        let row_size =
            tiles.iter().map(|t| t.row_size()).sum::<f64>() / tiles.len() as f64;

        for tile in tiles {
            if (tile.col_size() - col_size).abs() / col_size > CELL_SIZE_TOLERANCE
                || (tile.row_size() - row_size).abs() / row_size > CELL_SIZE_TOLERANCE
            {
                return Err(RasterError::InconsistentTiles(format!(
                    "tile cell size ({:.3}, {:.3}) deviates from mosaic mean ({:.3}, {:.3})",
                    tile.col_size(),
                    tile.row_size(),
                    col_size,
                    row_size
                )));
            }
        }

        let ncols = ((x_max - x_min) / col_size).round() as usize;
        let nrows = ((y_max - y_min) / row_size).round() as usize;

        Ok(Self {
            ncols,
            nrows,
            col_size,
            row_size,
            x_min,
            y_max,
            x_max,
            y_min,
        })
    }

    /// Pixel offset (row, col) of a tile's upper-left corner inside the
    /// combined grid.
    pub fn tile_offset(&self, tile: &TileAttributes) -> Result<(usize, usize)> {
        let row = ((self.y_max - tile.y_max) / self.row_size).round();
        let col = ((tile.x_min - self.x_min) / self.col_size).round();

        if row < 0.0 || col < 0.0 {
            return Err(RasterError::InconsistentTiles(format!(
                "tile corner outside combined extent (offset {}, {})",
                row, col
            )));
        }

        let (row, col) = (row as usize, col as usize);
        if row + tile.nrows > self.nrows || col + tile.ncols > self.ncols {
            return Err(RasterError::InconsistentTiles(format!(
                "tile block ({}+{} rows, {}+{} cols) exceeds mosaic ({} x {})",
                row, tile.nrows, col, tile.ncols, self.nrows, self.ncols
            )));
        }

        Ok((row, col))
    }

    /// Cell-center X coordinates of the combined grid (ascending).
    pub fn x_centers(&self) -> Vec<f64> {
        (0..self.ncols)
            .map(|c| self.x_min + (c as f64 + 0.5) * self.col_size)
            .collect()
    }

    /// Cell-center Y coordinates of the combined grid (descending).
    pub fn y_centers(&self) -> Vec<f64> {
        (0..self.nrows)
            .map(|r| self.y_max - (r as f64 + 0.5) * self.row_size)
            .collect()
    }
}

/// One date's mosaicked grid.
#[derive(Debug, Clone)]
pub struct Mosaic {
    pub data: Vec<f32>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Mosaic a set of same-date tiles into one grid.
///
/// Cells not covered by any tile stay NaN.
pub fn mosaic(tiles: &[TileBlock]) -> Result<Mosaic> {
    let attrs: Vec<TileAttributes> = tiles.iter().map(|t| t.attrs).collect();
    let layout = MosaicLayout::from_tiles(&attrs)?;

    let mut data = vec![f32::NAN; layout.nrows * layout.ncols];

    for tile in tiles {
        if tile.data.len() != tile.attrs.nrows * tile.attrs.ncols {
            return Err(RasterError::ShapeMismatch(format!(
                "tile data has {} values, attributes imply {}",
                tile.data.len(),
                tile.attrs.nrows * tile.attrs.ncols
            )));
        }

        let (row0, col0) = layout.tile_offset(&tile.attrs)?;
        debug!(
            row = row0,
            col = col0,
            nrows = tile.attrs.nrows,
            ncols = tile.attrs.ncols,
            "Placing tile block"
        );

        for r in 0..tile.attrs.nrows {
            let src = &tile.data[r * tile.attrs.ncols..(r + 1) * tile.attrs.ncols];
            let dst_start = (row0 + r) * layout.ncols + col0;
            data[dst_start..dst_start + tile.attrs.ncols].copy_from_slice(src);
        }
    }

    Ok(Mosaic {
        data,
        x: layout.x_centers(),
        y: layout.y_centers(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(x_min: f64, y_max: f64, n: usize, size: f64, value: f32) -> TileBlock {
        TileBlock {
            attrs: TileAttributes {
                ncols: n,
                nrows: n,
                x_min,
                y_max,
                x_max: x_min + n as f64 * size,
                y_min: y_max - n as f64 * size,
            },
            data: vec![value; n * n],
        }
    }

    #[test]
    fn test_two_tiles_side_by_side() {
        // Two 2x2 tiles, east and west
        let west = tile(0.0, 20.0, 2, 10.0, 1.0);
        let east = tile(20.0, 20.0, 2, 10.0, 2.0);

        let result = mosaic(&[west, east]).unwrap();
        assert_eq!(result.x.len(), 4);
        assert_eq!(result.y.len(), 2);
        // Row 0: west west east east
        assert_eq!(&result.data[0..4], &[1.0, 1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_two_tiles_stacked() {
        let north = tile(0.0, 40.0, 2, 10.0, 1.0);
        let south = tile(0.0, 20.0, 2, 10.0, 2.0);

        let result = mosaic(&[south, north]).unwrap();
        assert_eq!(result.x.len(), 2);
        assert_eq!(result.y.len(), 4);
        // Northern rows first regardless of input order
        assert_eq!(&result.data[0..2], &[1.0, 1.0]);
        assert_eq!(&result.data[6..8], &[2.0, 2.0]);
    }

    #[test]
    fn test_l_shaped_layout_leaves_nan() {
        // Three tiles of a 2x2 arrangement; the SE block is absent
        let nw = tile(0.0, 40.0, 2, 10.0, 1.0);
        let ne = tile(20.0, 40.0, 2, 10.0, 2.0);
        let sw = tile(0.0, 20.0, 2, 10.0, 3.0);

        let result = mosaic(&[nw, ne, sw]).unwrap();
        assert_eq!(result.x.len(), 4);
        assert_eq!(result.y.len(), 4);
        // SE quadrant is NaN
        assert!(result.data[2 * 4 + 2].is_nan());
        assert!(result.data[3 * 4 + 3].is_nan());
        // Other quadrants filled
        assert_eq!(result.data[0], 1.0);
        assert_eq!(result.data[3], 2.0);
        assert_eq!(result.data[2 * 4], 3.0);
    }

    #[test]
    fn test_coordinates_are_cell_centers() {
        let t = tile(0.0, 20.0, 2, 10.0, 1.0);
        let result = mosaic(&[t]).unwrap();
        assert_eq!(result.x, vec![5.0, 15.0]);
        assert_eq!(result.y, vec![15.0, 5.0]);
    }

    #[test]
    fn test_inconsistent_cell_size_rejected() {
        let a = tile(0.0, 20.0, 2, 10.0, 1.0);
        let b = tile(20.0, 20.0, 2, 17.0, 2.0);

        assert!(matches!(
            mosaic(&[a, b]),
            Err(RasterError::InconsistentTiles(_))
        ));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(mosaic(&[]), Err(RasterError::EmptyInput(_))));
    }
}
