//! Interpolation methods for grid resampling.
//!
//! The source is always a regular grid addressed by fractional indices
//! (`x` = column, `y` = row), so the neighbors of a query point come from a
//! fixed window around it rather than a spatial index.

/// Nearest neighbor interpolation.
///
/// Returns the value of the nearest grid point, NaN outside the grid.
pub fn nearest_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    if x < -0.5 || y < -0.5 {
        return f32::NAN;
    }
    let col = x.round() as usize;
    let row = y.round() as usize;

    if col >= width || row >= height {
        return f32::NAN;
    }

    data[row * width + col]
}

/// Inverse-distance-weighted interpolation over the `n_neighbors` nearest
/// valid grid points.
///
/// Weights are `1 / d^power`; with `n_neighbors = 1` this degenerates to
/// nearest-valid-neighbor. Neighbor candidates come from the 4x4 window
/// around the query point; NaN cells are skipped, and a query with no valid
/// candidate returns NaN.
pub fn idw_interpolate(
    data: &[f32],
    width: usize,
    height: usize,
    x: f64,
    y: f64,
    n_neighbors: usize,
    power: f64,
) -> f32 {
    if n_neighbors == 0 {
        return f32::NAN;
    }
    // Reject queries more than a cell outside the grid
    if x < -1.0 || y < -1.0 || x > width as f64 || y > height as f64 {
        return f32::NAN;
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    // Candidate cells: the 4x4 window centered on the containing cell
    let mut candidates: Vec<(f64, f32)> = Vec::with_capacity(16);
    for dy in -1..=2i64 {
        for dx in -1..=2i64 {
            let col = x0 + dx;
            let row = y0 + dy;
            if col < 0 || row < 0 || col >= width as i64 || row >= height as i64 {
                continue;
            }
            let v = data[row as usize * width + col as usize];
            if v.is_nan() {
                continue;
            }
            let ddx = col as f64 - x;
            let ddy = row as f64 - y;
            candidates.push((ddx * ddx + ddy * ddy, v));
        }
    }

    if candidates.is_empty() {
        return f32::NAN;
    }

    candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(n_neighbors);

    // Exact hit: the nearest point coincides with the query
    if candidates[0].0 < 1e-12 {
        return candidates[0].1;
    }

    let mut weight_sum = 0.0f64;
    let mut value_sum = 0.0f64;
    for &(d2, v) in &candidates {
        let w = 1.0 / d2.sqrt().powf(power);
        weight_sum += w;
        value_sum += w * v as f64;
    }

    (value_sum / weight_sum) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_interpolate() {
        let data: Vec<f32> = vec![
            1.0, 2.0, 3.0, //
            4.0, 5.0, 6.0, //
            7.0, 8.0, 9.0,
        ];

        assert_eq!(nearest_interpolate(&data, 3, 3, 0.0, 0.0), 1.0);
        assert_eq!(nearest_interpolate(&data, 3, 3, 1.0, 1.0), 5.0);
        assert_eq!(nearest_interpolate(&data, 3, 3, 0.4, 0.4), 1.0);
        assert_eq!(nearest_interpolate(&data, 3, 3, 0.6, 0.6), 5.0);
        assert!(nearest_interpolate(&data, 3, 3, 5.0, 0.0).is_nan());
    }

    #[test]
    fn test_idw_exact_hit() {
        let data: Vec<f32> = vec![
            1.0, 2.0, //
            3.0, 4.0,
        ];
        assert_eq!(idw_interpolate(&data, 2, 2, 1.0, 0.0, 4, 2.0), 2.0);
    }

    #[test]
    fn test_idw_single_neighbor_is_nearest() {
        let data: Vec<f32> = vec![
            1.0, 2.0, //
            3.0, 4.0,
        ];
        let v = idw_interpolate(&data, 2, 2, 0.8, 0.9, 1, 2.0);
        assert_eq!(v, 4.0);
    }

    #[test]
    fn test_idw_center_of_four() {
        let data: Vec<f32> = vec![
            1.0, 2.0, //
            3.0, 4.0,
        ];
        // Equidistant from all four: plain mean
        let v = idw_interpolate(&data, 2, 2, 0.5, 0.5, 4, 2.0);
        assert!((v - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_idw_skips_nan() {
        let data: Vec<f32> = vec![
            1.0,
            f32::NAN, //
            3.0,
            4.0,
        ];
        let v = idw_interpolate(&data, 2, 2, 0.5, 0.5, 4, 2.0);
        // Mean of the three valid corners
        assert!((v - (1.0 + 3.0 + 4.0) / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_idw_all_nan_window() {
        let data: Vec<f32> = vec![f32::NAN; 4];
        assert!(idw_interpolate(&data, 2, 2, 0.5, 0.5, 2, 2.0).is_nan());
    }

    #[test]
    fn test_idw_outside_grid() {
        let data: Vec<f32> = vec![1.0; 9];
        assert!(idw_interpolate(&data, 3, 3, -5.0, 0.0, 1, 2.0).is_nan());
        assert!(idw_interpolate(&data, 3, 3, 0.0, 10.0, 1, 2.0).is_nan());
    }

    #[test]
    fn test_idw_weights_favor_closer_points() {
        let data: Vec<f32> = vec![
            0.0, 10.0, //
            0.0, 0.0,
        ];
        // Query close to the 10.0 corner
        let near = idw_interpolate(&data, 2, 2, 0.9, 0.1, 4, 2.0);
        let far = idw_interpolate(&data, 2, 2, 0.1, 0.9, 4, 2.0);
        assert!(near > far);
    }
}
