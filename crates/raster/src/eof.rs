//! Empirical Orthogonal Function decomposition of a raster time series.
//!
//! The field is weighted by sqrt(cos(latitude)) per row so that every cell
//! contributes proportionally to the area it represents, the temporal mean
//! is removed per cell, and the resulting anomaly matrix is factored by
//! singular value decomposition. Only cells with a complete (NaN-free)
//! series enter the analysis; patterns are scattered back onto the map grid
//! with NaN elsewhere.

use nalgebra::DMatrix;
use projection::CrsTransform;
use tracing::{debug, info};

use modis_common::CrsCode;

use crate::error::{RasterError, Result};
use crate::types::Raster3;

/// Result of an EOF decomposition.
#[derive(Debug, Clone)]
pub struct EofDecomposition {
    /// Number of retained modes
    pub modes: usize,
    /// Grid shape of the pattern maps
    pub ny: usize,
    pub nx: usize,
    /// Grid coordinates of the pattern maps
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Principal component series, `[mode][time]`
    pub pcs: Vec<Vec<f64>>,
    /// EOF spatial patterns (unit norm, weighted space), `[mode]`, each
    /// `ny * nx` row-major with NaN outside the analyzed cells
    pub eof_maps: Vec<Vec<f32>>,
    /// Per-mode correlation between the PC and each cell's series
    pub correlation_maps: Vec<Vec<f32>>,
    /// Per-mode explained variance in percent (correlation squared x 100)
    pub variance_maps: Vec<Vec<f32>>,
    /// Eigenvalues of all resolved modes (descending)
    pub eigenvalues: Vec<f64>,
    /// Fraction of total variance per resolved mode; sums to <= 1 over any
    /// subset
    pub variance_fraction: Vec<f64>,
}

/// Decompose a raster series into its leading `modes` EOFs and PCs.
pub fn eof(raster: &Raster3, modes: usize) -> Result<EofDecomposition> {
    let n = raster.nt();
    if n < 2 {
        return Err(RasterError::Eof(
            "at least two time steps are required".to_string(),
        ));
    }
    if modes == 0 {
        return Err(RasterError::Eof("modes must be at least 1".to_string()));
    }

    let ny = raster.ny();
    let nx = raster.nx();
    let size = ny * nx;

    // Area weights per row from the latitude of the row center
    let weights = row_weights(raster);

    // Cells with a complete series
    let mut cells: Vec<usize> = Vec::new();
    for i in 0..size {
        if (0..n).all(|t| !raster.layer(t)[i].is_nan()) {
            cells.push(i);
        }
    }
    if cells.is_empty() {
        return Err(RasterError::Eof(
            "no cell has a complete series".to_string(),
        ));
    }

    debug!(
        cells = cells.len(),
        total = size,
        "Assembling anomaly matrix"
    );

    // Temporal mean per analyzed cell
    let mut means = vec![0.0f64; cells.len()];
    for (j, &cell) in cells.iter().enumerate() {
        let mut sum = 0.0f64;
        for t in 0..n {
            sum += raster.layer(t)[cell] as f64;
        }
        means[j] = sum / n as f64;
    }

    // Weighted anomaly matrix, time x cells
    let f = DMatrix::from_fn(n, cells.len(), |t, j| {
        let cell = cells[j];
        let w = weights[cell / nx];
        (raster.layer(t)[cell] as f64 - means[j]) * w
    });

    let svd = f.svd(true, true);
    let u = svd
        .u
        .as_ref()
        .ok_or_else(|| RasterError::Eof("SVD did not produce U".to_string()))?;
    let v_t = svd
        .v_t
        .as_ref()
        .ok_or_else(|| RasterError::Eof("SVD did not produce V^T".to_string()))?;
    let singular = &svd.singular_values;

    let rank = singular.len();
    let modes = modes.min(rank);

    // Eigenvalues of the covariance matrix
    let eigenvalues: Vec<f64> = singular
        .iter()
        .map(|&s| s * s / (n as f64 - 1.0))
        .collect();
    let total: f64 = eigenvalues.iter().sum();
    let variance_fraction: Vec<f64> = if total > 0.0 {
        eigenvalues.iter().map(|&l| l / total).collect()
    } else {
        vec![0.0; rank]
    };

    info!(
        modes = modes,
        rank = rank,
        leading_fraction = variance_fraction.first().copied().unwrap_or(0.0),
        "EOF decomposition complete"
    );

    // PC series: projection of the anomalies onto each EOF (U * sigma)
    let mut pcs = Vec::with_capacity(modes);
    for k in 0..modes {
        let pc: Vec<f64> = (0..n).map(|t| u[(t, k)] * singular[k]).collect();
        pcs.push(pc);
    }

    // EOF patterns scattered back onto the grid
    let mut eof_maps = Vec::with_capacity(modes);
    for k in 0..modes {
        let mut map = vec![f32::NAN; size];
        for (j, &cell) in cells.iter().enumerate() {
            map[cell] = v_t[(k, j)] as f32;
        }
        eof_maps.push(map);
    }

    // Correlation of each PC with the raw (unweighted) cell anomalies
    let mut correlation_maps = Vec::with_capacity(modes);
    let mut variance_maps = Vec::with_capacity(modes);
    for pc in pcs.iter() {
        let pc_mean: f64 = pc.iter().sum::<f64>() / n as f64;
        let pc_var: f64 = pc.iter().map(|&p| (p - pc_mean).powi(2)).sum::<f64>();

        let mut corr_map = vec![f32::NAN; size];
        let mut var_map = vec![f32::NAN; size];

        for (j, &cell) in cells.iter().enumerate() {
            let mut cov = 0.0f64;
            let mut cell_var = 0.0f64;
            for t in 0..n {
                let a = raster.layer(t)[cell] as f64 - means[j];
                let p = pc[t] - pc_mean;
                cov += a * p;
                cell_var += a * a;
            }

            let denom = (cell_var * pc_var).sqrt();
            if denom > 0.0 {
                let corr = cov / denom;
                corr_map[cell] = corr as f32;
                var_map[cell] = (corr * corr * 100.0) as f32;
            }
        }

        correlation_maps.push(corr_map);
        variance_maps.push(var_map);
    }

    Ok(EofDecomposition {
        modes,
        ny,
        nx,
        x: raster.x.clone(),
        y: raster.y.clone(),
        pcs,
        eof_maps,
        correlation_maps,
        variance_maps,
        eigenvalues,
        variance_fraction,
    })
}

/// sqrt(cos(latitude)) weight per row.
///
/// For projected rasters the row latitude comes from inverse-projecting the
/// row center at the central column.
fn row_weights(raster: &Raster3) -> Vec<f64> {
    let to_geo = CrsTransform::new(raster.crs, CrsCode::Epsg4326);
    let mid_x = raster.x[raster.nx() / 2];

    raster
        .y
        .iter()
        .map(|&y| {
            let lat = if raster.crs.is_geographic() {
                y
            } else {
                to_geo.transform(mid_x, y).1
            };
            lat.to_radians().cos().max(0.0).sqrt()
        })
        .collect()
}
