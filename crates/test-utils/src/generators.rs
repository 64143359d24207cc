//! Deterministic synthetic grids for the test suite.

use chrono::NaiveDate;

/// Creates a test grid with predictable values.
///
/// Each cell value is `col * 1000 + row`, so a placement or transposition
/// mistake anywhere in the pipeline shows up as the wrong constant rather
/// than an off-by-a-little float.
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid with a smooth diagonal gradient in `0..=max`.
pub fn create_gradient_grid(width: usize, height: usize, max: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x = col as f32 / width.max(1) as f32;
            let y = row as f32 / height.max(1) as f32;
            data.push((x + y) / 2.0 * max);
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a grid with NaN values at specified `(col, row)` positions.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f32> {
    let mut data = vec![0.0f32; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

/// Dates of an 8-day composite series starting at the given year's first
/// day.
pub fn composite_dates(year: i32, count: usize) -> Vec<NaiveDate> {
    (0..count)
        .map(|k| NaiveDate::from_yo_opt(year, 1 + 8 * k as u32).expect("valid day of year"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0); // col=0, row=0
        assert_eq!(grid[1], 1000.0); // col=1, row=0
        assert_eq!(grid[10], 1.0); // col=0, row=1
    }

    #[test]
    fn test_create_grid_with_nans() {
        let grid = create_grid_with_nans(10, 10, &[(5, 5), (0, 0)]);
        assert!(grid[0].is_nan());
        assert!(grid[55].is_nan());
        assert!(!grid[1].is_nan());
    }

    #[test]
    fn test_composite_dates_spacing() {
        let dates = composite_dates(2003, 4);
        assert_eq!(dates.len(), 4);
        assert_eq!((dates[1] - dates[0]).num_days(), 8);
    }
}
