//! Clipping a raster to a basin mask.
//!
//! The basin outline arrives pre-rasterized as an ESRI ASCII grid whose
//! NODATA cells lie outside the basin. Clipping crops the raster to the
//! mask extent, blanks every cell whose nearest mask cell is NODATA, and
//! trims border rows/columns left without data. Mask and raster must share
//! a CRS; the mask grid does not need to align with the raster grid.

use ascii_grid::AsciiGrid;
use tracing::debug;

use crate::error::{RasterError, Result};
use crate::types::Raster3;

impl Raster3 {
    /// Clip to a basin mask, returning a new raster.
    ///
    /// `buffer` expands the mask extent (not the basin outline) by a
    /// distance in coordinate units before cropping.
    pub fn clip(&self, mask: &AsciiGrid, buffer: Option<f64>) -> Result<Raster3> {
        let extent = match buffer {
            Some(b) => mask.extent().buffered(b),
            None => mask.extent(),
        };

        // Crop rows/columns to the mask extent
        let cols: Vec<usize> = (0..self.nx())
            .filter(|&c| self.x[c] >= extent.min_x && self.x[c] <= extent.max_x)
            .collect();
        let rows: Vec<usize> = (0..self.ny())
            .filter(|&r| self.y[r] >= extent.min_y && self.y[r] <= extent.max_y)
            .collect();

        if rows.is_empty() || cols.is_empty() {
            return Err(RasterError::EmptyClip);
        }

        debug!(
            rows = rows.len(),
            cols = cols.len(),
            "Cropped raster to mask extent"
        );

        // Basin membership of each cropped cell, by nearest mask cell.
        // Cells inside the buffered extent but beyond the mask grid count
        // as outside.
        let mut inside = vec![false; rows.len() * cols.len()];
        for (ri, &row) in rows.iter().enumerate() {
            for (ci, &col) in cols.iter().enumerate() {
                if let Some(v) = mask.value_at(self.x[col], self.y[row]) {
                    inside[ri * cols.len() + ci] = !v.is_nan();
                }
            }
        }

        let mut data = Vec::with_capacity(self.nt() * rows.len() * cols.len());
        for t in 0..self.nt() {
            let layer = self.layer(t);
            for (ri, &row) in rows.iter().enumerate() {
                for (ci, &col) in cols.iter().enumerate() {
                    if inside[ri * cols.len() + ci] {
                        data.push(layer[row * self.nx() + col]);
                    } else {
                        data.push(f32::NAN);
                    }
                }
            }
        }

        let clipped = Raster3 {
            data,
            x: cols.iter().map(|&c| self.x[c]).collect(),
            y: rows.iter().map(|&r| self.y[r]).collect(),
            times: self.times.clone(),
            crs: self.crs,
            variable: self.variable.clone(),
            units: self.units.clone(),
        };

        clipped.trim_nan_borders()
    }

    /// Clip in place.
    pub fn clip_in_place(&mut self, mask: &AsciiGrid, buffer: Option<f64>) -> Result<()> {
        *self = self.clip(mask, buffer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use modis_common::CrsCode;

    /// 4x4 raster on a 10m grid, values = row * 10 + col.
    fn sample_raster() -> Raster3 {
        let mut data = Vec::new();
        for row in 0..4 {
            for col in 0..4 {
                data.push((row * 10 + col) as f32);
            }
        }
        Raster3::new(
            data,
            vec![5.0, 15.0, 25.0, 35.0],
            vec![35.0, 25.0, 15.0, 5.0],
            vec![NaiveDate::from_ymd_opt(2003, 1, 1).unwrap()],
            CrsCode::Epsg25830,
        )
        .unwrap()
    }

    /// Mask covering the central 2x2 cells, with one of them NODATA.
    fn sample_mask() -> AsciiGrid {
        AsciiGrid::parse(
            "\
ncols 2
nrows 2
xllcorner 10
yllcorner 10
cellsize 10
NODATA_value -9999
1 -9999
1 1
",
        )
        .unwrap()
    }

    #[test]
    fn test_clip_crops_and_masks() {
        let raster = sample_raster();
        let clipped = raster.clip(&sample_mask(), None).unwrap();

        assert_eq!(clipped.ny(), 2);
        assert_eq!(clipped.nx(), 2);
        assert_eq!(clipped.x, vec![15.0, 25.0]);
        assert_eq!(clipped.y, vec![25.0, 15.0]);

        // NE cell of the mask is NODATA
        assert_eq!(clipped.get(0, 0, 0), 11.0);
        assert!(clipped.get(0, 0, 1).is_nan());
        assert_eq!(clipped.get(0, 1, 0), 21.0);
        assert_eq!(clipped.get(0, 1, 1), 22.0);
    }

    #[test]
    fn test_clip_trims_empty_borders() {
        let raster = sample_raster();
        // Mask with only the single cell at (10..20, 10..20) valid
        let mask = AsciiGrid::parse(
            "\
ncols 2
nrows 2
xllcorner 10
yllcorner 10
cellsize 10
NODATA_value -9999
-9999 -9999
1 -9999
",
        )
        .unwrap();

        let clipped = raster.clip(&mask, None).unwrap();
        assert_eq!((clipped.ny(), clipped.nx()), (1, 1));
        assert_eq!(clipped.get(0, 0, 0), 21.0);
    }

    #[test]
    fn test_clip_buffer_extends_crop() {
        let raster = sample_raster();
        let clipped = raster.clip(&sample_mask(), Some(10.0)).unwrap();
        // Buffer widens the crop window, but cells outside the mask grid
        // are blanked and trimmed away again
        assert_eq!((clipped.ny(), clipped.nx()), (2, 2));
    }

    #[test]
    fn test_clip_disjoint_mask_fails() {
        let raster = sample_raster();
        let mask = AsciiGrid::parse(
            "\
ncols 1
nrows 1
xllcorner 1000
yllcorner 1000
cellsize 10
NODATA_value -9999
1
",
        )
        .unwrap();

        assert!(matches!(
            raster.clip(&mask, None),
            Err(RasterError::EmptyClip)
        ));
    }
}
