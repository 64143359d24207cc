//! Reprojecting a raster onto a regular grid in another CRS.
//!
//! Inverse mapping: the target grid is laid out in the destination CRS at a
//! requested cell size, each target cell center is transformed back into the
//! source CRS, and the value is interpolated from the source grid by
//! k-nearest-neighbor inverse-distance weighting. A rectangular source grid
//! maps to a curved region in the target CRS; target cells falling outside
//! it come out NaN.

use projection::CrsTransform;
use rayon::prelude::*;
use tracing::{debug, info};

use modis_common::CrsCode;

use crate::error::{RasterError, Result};
use crate::interpolation::idw_interpolate;
use crate::types::Raster3;

/// Options for grid reprojection.
#[derive(Debug, Clone)]
pub struct ReprojectOptions {
    /// Target grid cell size in destination CRS units
    pub cellsize: f64,
    /// Number of source neighbors per target cell
    pub n_neighbors: usize,
    /// Inverse-distance weighting exponent
    pub power: f64,
}

impl ReprojectOptions {
    pub fn new(cellsize: f64) -> Self {
        Self {
            cellsize,
            n_neighbors: 1,
            power: 2.0,
        }
    }
}

impl Raster3 {
    /// Reproject every layer onto a regular grid in `target` CRS.
    pub fn reproject(&self, target: CrsCode, opts: &ReprojectOptions) -> Result<Raster3> {
        if opts.cellsize <= 0.0 {
            return Err(RasterError::InvalidParameter(format!(
                "cellsize must be positive, got {}",
                opts.cellsize
            )));
        }
        if opts.n_neighbors == 0 {
            return Err(RasterError::InvalidParameter(
                "n_neighbors must be at least 1".to_string(),
            ));
        }
        if target == self.crs {
            return Ok(self.clone());
        }

        let transform = CrsTransform::new(self.crs, target);

        // Transformed extent of the source cell centers
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for &ys in &self.y {
            for &xs in &self.x {
                let (tx, ty) = transform.transform(xs, ys);
                min_x = min_x.min(tx);
                max_x = max_x.max(tx);
                min_y = min_y.min(ty);
                max_y = max_y.max(ty);
            }
        }

        // Snap the target grid outward to cell-size multiples
        let cs = opts.cellsize;
        let x0 = (min_x / cs).floor() * cs;
        let x1 = (max_x / cs).ceil() * cs;
        let y0 = (min_y / cs).floor() * cs;
        let y1 = (max_y / cs).ceil() * cs;

        let nx = ((x1 - x0) / cs).round() as usize + 1;
        let ny = ((y1 - y0) / cs).round() as usize + 1;

        let x_grid: Vec<f64> = (0..nx).map(|c| x0 + c as f64 * cs).collect();
        // North to south, matching the raster row convention
        let y_grid: Vec<f64> = (0..ny).map(|r| y1 - r as f64 * cs).collect();

        debug!(
            nx = nx,
            ny = ny,
            cellsize = cs,
            "Built target grid"
        );

        // The target-to-source index mapping is shared by all layers
        let src_x0 = self.x[0];
        let src_y0 = self.y[0];
        let col_size = self.col_size();
        let row_size = self.row_size();
        if col_size <= 0.0 || row_size <= 0.0 {
            return Err(RasterError::InvalidParameter(
                "source grid needs at least 2 rows and 2 columns".to_string(),
            ));
        }

        let mapping: Vec<(f64, f64)> = y_grid
            .iter()
            .flat_map(|&ty| {
                let transform = &transform;
                x_grid.iter().map(move |&tx| {
                    let (sx, sy) = transform.transform_inverse(tx, ty);
                    let col_f = (sx - src_x0) / col_size;
                    let row_f = (src_y0 - sy) / row_size;
                    (col_f, row_f)
                })
            })
            .collect();

        let src_nx = self.nx();
        let src_ny = self.ny();

        info!(
            layers = self.nt(),
            from = %self.crs,
            to = %target,
            "Reprojecting raster"
        );

        // Layers are independent; interpolate them in parallel
        let layers: Vec<Vec<f32>> = (0..self.nt())
            .into_par_iter()
            .map(|t| {
                let src = self.layer(t);
                mapping
                    .iter()
                    .map(|&(col_f, row_f)| {
                        idw_interpolate(
                            src,
                            src_nx,
                            src_ny,
                            col_f,
                            row_f,
                            opts.n_neighbors,
                            opts.power,
                        )
                    })
                    .collect()
            })
            .collect();

        let mut data = Vec::with_capacity(self.nt() * ny * nx);
        for layer in layers {
            data.extend_from_slice(&layer);
        }

        let out = Raster3::new(data, x_grid, y_grid, self.times.clone(), target)?;
        Ok(out.with_metadata(self.variable.clone(), self.units.clone()))
    }

    /// Reproject in place.
    pub fn reproject_in_place(&mut self, target: CrsCode, opts: &ReprojectOptions) -> Result<()> {
        *self = self.reproject(target, opts)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use projection::Sinusoidal;

    /// A small sinusoidal raster over northern Spain with a linear field.
    fn sample_raster() -> Raster3 {
        let sinu = Sinusoidal::modis();
        // Cell centers on a ~1km sinusoidal grid
        let (x_ul, y_ul) = sinu.forward(-3.5, 42.5);
        let n = 12usize;
        let size = 1000.0;

        let x: Vec<f64> = (0..n).map(|c| x_ul + (c as f64 + 0.5) * size).collect();
        let y: Vec<f64> = (0..n).map(|r| y_ul - (r as f64 + 0.5) * size).collect();

        let mut data = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                data.push((row + col) as f32);
            }
        }

        Raster3::new(
            data,
            x,
            y,
            vec![NaiveDate::from_ymd_opt(2003, 1, 1).unwrap()],
            CrsCode::Sinusoidal,
        )
        .unwrap()
    }

    #[test]
    fn test_reproject_to_utm_grid_is_snapped() {
        let raster = sample_raster();
        let out = raster
            .reproject(CrsCode::Epsg25830, &ReprojectOptions::new(1000.0))
            .unwrap();

        assert_eq!(out.crs, CrsCode::Epsg25830);
        // Grid origin snapped to whole kilometers
        assert_eq!(out.x[0] % 1000.0, 0.0);
        assert_eq!(out.y[0] % 1000.0, 0.0);
        // Y descending
        assert!(out.y[0] > out.y[out.ny() - 1]);
    }

    #[test]
    fn test_reproject_preserves_value_range() {
        let raster = sample_raster();
        let out = raster
            .reproject(CrsCode::Epsg25830, &ReprojectOptions::new(1000.0))
            .unwrap();

        // Interpolated values must stay inside the source range
        let valid: Vec<f32> = out.data.iter().copied().filter(|v| !v.is_nan()).collect();
        assert!(!valid.is_empty());
        assert!(valid.iter().all(|&v| (0.0..=22.0).contains(&v)));
    }

    #[test]
    fn test_reproject_identity_crs() {
        let raster = sample_raster();
        let out = raster
            .reproject(CrsCode::Sinusoidal, &ReprojectOptions::new(1000.0))
            .unwrap();
        assert_eq!(out.data, raster.data);
    }

    #[test]
    fn test_reproject_rejects_bad_params() {
        let raster = sample_raster();
        assert!(raster
            .reproject(CrsCode::Epsg25830, &ReprojectOptions::new(-5.0))
            .is_err());

        let mut opts = ReprojectOptions::new(1000.0);
        opts.n_neighbors = 0;
        assert!(raster.reproject(CrsCode::Epsg25830, &opts).is_err());
    }
}
