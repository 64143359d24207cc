//! ESRI ASCII grid (.asc) reading and writing.
//!
//! The format carries a six-line header (ncols, nrows, xllcorner, yllcorner,
//! cellsize, NODATA_value) followed by row-major cell values, northernmost
//! row first. The pipeline uses it both as the basin clipping mask format
//! and as an interchange format for per-date maps exported by GIS tools.

pub mod error;

pub use error::{AsciiGridError, AsciiGridResult};

use std::fmt::Write as _;
use std::path::Path;

use modis_common::BoundingBox;

/// An ESRI ASCII grid: header metadata plus row-major cell values.
///
/// NODATA cells are stored as NaN.
#[derive(Debug, Clone)]
pub struct AsciiGrid {
    /// Number of columns
    pub ncols: usize,
    /// Number of rows
    pub nrows: usize,
    /// X coordinate of the lower-left corner of the grid
    pub xllcorner: f64,
    /// Y coordinate of the lower-left corner of the grid
    pub yllcorner: f64,
    /// Cell size (cells are square)
    pub cellsize: f64,
    /// The NODATA marker used on disk
    pub nodata: f64,
    /// Cell values, row-major, northernmost row first; NaN where NODATA
    pub data: Vec<f32>,
}

impl AsciiGrid {
    /// Parse a grid from file contents.
    pub fn parse(content: &str) -> AsciiGridResult<Self> {
        let mut lines = content.lines();

        let mut header = AsciiHeader::default();
        let mut values: Vec<f32> = Vec::new();
        let mut nodata = -9999.0_f64;

        // Header lines are `key value`; the first line starting with a
        // number (or sign) begins the data block.
        for line in &mut lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let mut parts = trimmed.split_whitespace();
            let key = parts.next().unwrap_or_default();

            if key
                .chars()
                .next()
                .map(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
                .unwrap_or(false)
            {
                // Start of the data block
                parse_row(trimmed, nodata, &mut values)?;
                break;
            }

            let value = parts
                .next()
                .ok_or_else(|| AsciiGridError::InvalidHeader(trimmed.to_string()))?;

            match key.to_ascii_lowercase().as_str() {
                "ncols" => header.ncols = Some(parse_header_num(value, trimmed)? as usize),
                "nrows" => header.nrows = Some(parse_header_num(value, trimmed)? as usize),
                "xllcorner" => header.xllcorner = Some(parse_header_num(value, trimmed)?),
                "yllcorner" => header.yllcorner = Some(parse_header_num(value, trimmed)?),
                "cellsize" => header.cellsize = Some(parse_header_num(value, trimmed)?),
                "nodata_value" => nodata = parse_header_num(value, trimmed)?,
                _ => return Err(AsciiGridError::InvalidHeader(trimmed.to_string())),
            }
        }

        for line in lines {
            parse_row(line, nodata, &mut values)?;
        }

        let ncols = header.ncols.ok_or(AsciiGridError::MissingHeader("ncols"))?;
        let nrows = header.nrows.ok_or(AsciiGridError::MissingHeader("nrows"))?;
        let xllcorner = header
            .xllcorner
            .ok_or(AsciiGridError::MissingHeader("xllcorner"))?;
        let yllcorner = header
            .yllcorner
            .ok_or(AsciiGridError::MissingHeader("yllcorner"))?;
        let cellsize = header
            .cellsize
            .ok_or(AsciiGridError::MissingHeader("cellsize"))?;

        if values.len() != ncols * nrows {
            return Err(AsciiGridError::CellCountMismatch {
                expected: ncols * nrows,
                found: values.len(),
            });
        }

        Ok(Self {
            ncols,
            nrows,
            xllcorner,
            yllcorner,
            cellsize,
            nodata,
            data: values,
        })
    }

    /// Read a grid from a file.
    pub fn read(path: &Path) -> AsciiGridResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Serialize the grid back to the ASCII format.
    pub fn to_ascii(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "ncols {}", self.ncols);
        let _ = writeln!(out, "nrows {}", self.nrows);
        let _ = writeln!(out, "xllcorner {}", self.xllcorner);
        let _ = writeln!(out, "yllcorner {}", self.yllcorner);
        let _ = writeln!(out, "cellsize {}", self.cellsize);
        let _ = writeln!(out, "NODATA_value {}", self.nodata);

        for row in 0..self.nrows {
            let mut first = true;
            for col in 0..self.ncols {
                if !first {
                    out.push(' ');
                }
                first = false;
                let v = self.data[row * self.ncols + col];
                if v.is_nan() {
                    let _ = write!(out, "{}", self.nodata);
                } else {
                    let _ = write!(out, "{}", v);
                }
            }
            out.push('\n');
        }
        out
    }

    /// Write the grid to a file.
    pub fn write(&self, path: &Path) -> AsciiGridResult<()> {
        std::fs::write(path, self.to_ascii())?;
        Ok(())
    }

    /// Cell-center X coordinates of the columns (ascending).
    pub fn x_centers(&self) -> Vec<f64> {
        (0..self.ncols)
            .map(|c| self.xllcorner + (c as f64 + 0.5) * self.cellsize)
            .collect()
    }

    /// Cell-center Y coordinates of the rows (descending, northernmost row
    /// first, matching the data ordering).
    pub fn y_centers(&self) -> Vec<f64> {
        (0..self.nrows)
            .map(|r| self.yllcorner + (self.nrows as f64 - r as f64 - 0.5) * self.cellsize)
            .collect()
    }

    /// The bounding box of the grid (cell edges, not centers).
    pub fn extent(&self) -> BoundingBox {
        BoundingBox::new(
            self.xllcorner,
            self.yllcorner,
            self.xllcorner + self.ncols as f64 * self.cellsize,
            self.yllcorner + self.nrows as f64 * self.cellsize,
        )
    }

    /// Index of the cell nearest to a point, or None when the point lies
    /// outside the grid extent.
    pub fn nearest_index(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let col_f = (x - self.xllcorner) / self.cellsize;
        let row_f = (self.yllcorner + self.nrows as f64 * self.cellsize - y) / self.cellsize;

        if col_f < 0.0 || row_f < 0.0 {
            return None;
        }
        let col = col_f as usize;
        let row = row_f as usize;
        if col >= self.ncols || row >= self.nrows {
            return None;
        }
        Some((row, col))
    }

    /// Value of the cell nearest to a point (NaN for NODATA cells), or None
    /// outside the grid.
    pub fn value_at(&self, x: f64, y: f64) -> Option<f32> {
        self.nearest_index(x, y)
            .map(|(row, col)| self.data[row * self.ncols + col])
    }
}

#[derive(Default)]
struct AsciiHeader {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xllcorner: Option<f64>,
    yllcorner: Option<f64>,
    cellsize: Option<f64>,
}

fn parse_header_num(value: &str, line: &str) -> AsciiGridResult<f64> {
    value
        .parse()
        .map_err(|_| AsciiGridError::InvalidHeader(line.to_string()))
}

fn parse_row(line: &str, nodata: f64, out: &mut Vec<f32>) -> AsciiGridResult<()> {
    for token in line.split_whitespace() {
        let v: f64 = token
            .parse()
            .map_err(|_| AsciiGridError::InvalidValue(token.to_string()))?;
        if (v - nodata).abs() < 1e-9 {
            out.push(f32::NAN);
        } else {
            out.push(v as f32);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
ncols 4
nrows 3
xllcorner 100.0
yllcorner 200.0
cellsize 10.0
NODATA_value -9999
1 2 3 -9999
5 6 7 8
-9999 10 11 12
";

    #[test]
    fn test_parse_header() {
        let grid = AsciiGrid::parse(SAMPLE).unwrap();
        assert_eq!(grid.ncols, 4);
        assert_eq!(grid.nrows, 3);
        assert_eq!(grid.xllcorner, 100.0);
        assert_eq!(grid.yllcorner, 200.0);
        assert_eq!(grid.cellsize, 10.0);
        assert_eq!(grid.data.len(), 12);
    }

    #[test]
    fn test_nodata_becomes_nan() {
        let grid = AsciiGrid::parse(SAMPLE).unwrap();
        assert!(grid.data[3].is_nan());
        assert!(grid.data[8].is_nan());
        assert_eq!(grid.data[4], 5.0);
    }

    #[test]
    fn test_cell_centers() {
        let grid = AsciiGrid::parse(SAMPLE).unwrap();
        assert_eq!(grid.x_centers(), vec![105.0, 115.0, 125.0, 135.0]);
        // Top row first
        assert_eq!(grid.y_centers(), vec![225.0, 215.0, 205.0]);
    }

    #[test]
    fn test_nearest_index() {
        let grid = AsciiGrid::parse(SAMPLE).unwrap();
        // Center of the top-left cell
        assert_eq!(grid.nearest_index(105.0, 225.0), Some((0, 0)));
        // Center of the bottom-right cell
        assert_eq!(grid.nearest_index(135.0, 205.0), Some((2, 3)));
        // Outside
        assert_eq!(grid.nearest_index(99.0, 225.0), None);
        assert_eq!(grid.nearest_index(105.0, 231.0), None);
    }

    #[test]
    fn test_roundtrip() {
        let grid = AsciiGrid::parse(SAMPLE).unwrap();
        let reparsed = AsciiGrid::parse(&grid.to_ascii()).unwrap();
        assert_eq!(reparsed.ncols, grid.ncols);
        assert_eq!(reparsed.nrows, grid.nrows);
        for (a, b) in grid.data.iter().zip(reparsed.data.iter()) {
            assert!(a.is_nan() == b.is_nan() || a == b);
        }
    }

    #[test]
    fn test_missing_header_rejected() {
        let bad = "ncols 4\nnrows 3\n1 2 3 4\n";
        assert!(matches!(
            AsciiGrid::parse(bad),
            Err(AsciiGridError::MissingHeader(_))
        ));
    }

    #[test]
    fn test_cell_count_mismatch() {
        let bad = "\
ncols 4
nrows 3
xllcorner 0
yllcorner 0
cellsize 1
NODATA_value -9999
1 2 3
";
        assert!(matches!(
            AsciiGrid::parse(bad),
            Err(AsciiGridError::CellCountMismatch { .. })
        ));
    }
}
