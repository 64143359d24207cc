//! The 3D raster time-series container.

use chrono::NaiveDate;

use modis_common::{BoundingBox, CrsCode};

use crate::error::{RasterError, Result};

/// A gridded time series: one 2D map per date on a shared regular grid.
///
/// Data is stored row-major as `[time][row][col]` with NaN marking missing
/// cells. Rows run north to south, so `y` is descending while `x` is
/// ascending. The shape invariant `data.len() == times.len() * y.len() *
/// x.len()` is checked at construction and preserved by every transform.
#[derive(Debug, Clone)]
pub struct Raster3 {
    /// Cell values, `[time][row][col]` row-major
    pub data: Vec<f32>,
    /// Cell-center X coordinates of the columns (ascending)
    pub x: Vec<f64>,
    /// Cell-center Y coordinates of the rows (descending)
    pub y: Vec<f64>,
    /// One date per layer (ascending)
    pub times: Vec<NaiveDate>,
    /// Coordinate reference system of `x`/`y`
    pub crs: CrsCode,
    /// Variable name, e.g. "ET"
    pub variable: Option<String>,
    /// Measurement units, e.g. "mm/8d"
    pub units: Option<String>,
}

impl Raster3 {
    /// Create a raster, validating shape agreement between the data block
    /// and its coordinate vectors.
    pub fn new(
        data: Vec<f32>,
        x: Vec<f64>,
        y: Vec<f64>,
        times: Vec<NaiveDate>,
        crs: CrsCode,
    ) -> Result<Self> {
        if x.is_empty() || y.is_empty() || times.is_empty() {
            return Err(RasterError::EmptyInput(
                "raster requires at least one column, row and date".to_string(),
            ));
        }
        if data.len() != times.len() * y.len() * x.len() {
            return Err(RasterError::ShapeMismatch(format!(
                "data has {} values, coordinates imply {} ({} times x {} rows x {} cols)",
                data.len(),
                times.len() * y.len() * x.len(),
                times.len(),
                y.len(),
                x.len()
            )));
        }

        Ok(Self {
            data,
            x,
            y,
            times,
            crs,
            variable: None,
            units: None,
        })
    }

    /// Attach variable/units metadata.
    pub fn with_metadata(mut self, variable: Option<String>, units: Option<String>) -> Self {
        self.variable = variable;
        self.units = units;
        self
    }

    /// Number of time layers.
    pub fn nt(&self) -> usize {
        self.times.len()
    }

    /// Number of rows.
    pub fn ny(&self) -> usize {
        self.y.len()
    }

    /// Number of columns.
    pub fn nx(&self) -> usize {
        self.x.len()
    }

    /// Flat index of `(t, row, col)`.
    #[inline]
    pub fn idx(&self, t: usize, row: usize, col: usize) -> usize {
        (t * self.ny() + row) * self.nx() + col
    }

    /// Value at `(t, row, col)`.
    #[inline]
    pub fn get(&self, t: usize, row: usize, col: usize) -> f32 {
        self.data[self.idx(t, row, col)]
    }

    /// One time layer as a flat row-major slice.
    pub fn layer(&self, t: usize) -> &[f32] {
        let size = self.ny() * self.nx();
        &self.data[t * size..(t + 1) * size]
    }

    /// Mutable access to one time layer.
    pub fn layer_mut(&mut self, t: usize) -> &mut [f32] {
        let size = self.ny() * self.nx();
        &mut self.data[t * size..(t + 1) * size]
    }

    /// Mean column width in coordinate units.
    pub fn col_size(&self) -> f64 {
        if self.nx() < 2 {
            return 0.0;
        }
        (self.x[self.nx() - 1] - self.x[0]) / (self.nx() - 1) as f64
    }

    /// Mean row height in coordinate units (positive).
    pub fn row_size(&self) -> f64 {
        if self.ny() < 2 {
            return 0.0;
        }
        (self.y[0] - self.y[self.ny() - 1]) / (self.ny() - 1) as f64
    }

    /// The bounding box of the grid, cell edges included.
    pub fn extent(&self) -> BoundingBox {
        let half_col = self.col_size() / 2.0;
        let half_row = self.row_size() / 2.0;
        BoundingBox::new(
            self.x[0] - half_col,
            self.y[self.ny() - 1] - half_row,
            self.x[self.nx() - 1] + half_col,
            self.y[0] + half_row,
        )
    }

    /// Multiply every cell by a scale factor (the product scale factor that
    /// converts packed integers to physical values).
    pub fn scale(&mut self, factor: f32) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// Per-cell mean over time, ignoring NaN.
    pub fn temporal_mean(&self) -> Vec<f32> {
        let size = self.ny() * self.nx();
        let mut sum = vec![0.0f64; size];
        let mut count = vec![0u32; size];

        for t in 0..self.nt() {
            let layer = self.layer(t);
            for (i, &v) in layer.iter().enumerate() {
                if !v.is_nan() {
                    sum[i] += v as f64;
                    count[i] += 1;
                }
            }
        }

        sum.iter()
            .zip(count.iter())
            .map(|(&s, &c)| if c == 0 { f32::NAN } else { (s / c as f64) as f32 })
            .collect()
    }

    /// Spatial mean of one layer, ignoring NaN.
    pub fn layer_mean(&self, t: usize) -> f32 {
        let mut sum = 0.0f64;
        let mut count = 0u32;
        for &v in self.layer(t) {
            if !v.is_nan() {
                sum += v as f64;
                count += 1;
            }
        }
        if count == 0 {
            f32::NAN
        } else {
            (sum / count as f64) as f32
        }
    }

    /// Drop border rows and columns that are NaN in every layer.
    ///
    /// Returns an error if nothing remains.
    pub fn trim_nan_borders(&self) -> Result<Raster3> {
        let ny = self.ny();
        let nx = self.nx();

        let mut row_has_data = vec![false; ny];
        let mut col_has_data = vec![false; nx];

        for t in 0..self.nt() {
            let layer = self.layer(t);
            for row in 0..ny {
                for col in 0..nx {
                    if !layer[row * nx + col].is_nan() {
                        row_has_data[row] = true;
                        col_has_data[col] = true;
                    }
                }
            }
        }

        let rows: Vec<usize> = (0..ny).filter(|&r| row_has_data[r]).collect();
        let cols: Vec<usize> = (0..nx).filter(|&c| col_has_data[c]).collect();

        if rows.is_empty() || cols.is_empty() {
            return Err(RasterError::EmptyClip);
        }

        let mut data = Vec::with_capacity(self.nt() * rows.len() * cols.len());
        for t in 0..self.nt() {
            let layer = self.layer(t);
            for &row in &rows {
                for &col in &cols {
                    data.push(layer[row * nx + col]);
                }
            }
        }

        let x = cols.iter().map(|&c| self.x[c]).collect();
        let y = rows.iter().map(|&r| self.y[r]).collect();

        Ok(Raster3 {
            data,
            x,
            y,
            times: self.times.clone(),
            crs: self.crs,
            variable: self.variable.clone(),
            units: self.units.clone(),
        })
    }
}
