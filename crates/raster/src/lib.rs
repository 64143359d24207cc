//! 3D raster time series and the transforms the pipeline applies to them:
//! tile mosaicking, basin clipping, reprojection, temporal aggregation,
//! satellite combination, EOF decomposition and netCDF series I/O.

pub mod aggregate;
pub mod clip;
pub mod combine;
pub mod eof;
pub mod error;
pub mod interpolation;
pub mod mosaic;
pub mod reproject;
pub mod series;
pub mod types;

pub use aggregate::{annual_series, monthly_climatology, monthly_series, Aggregation};
pub use combine::{combine, fill_missing};
pub use eof::{eof, EofDecomposition};
pub use error::{RasterError, Result};
pub use interpolation::{idw_interpolate, nearest_interpolate};
pub use mosaic::{mosaic, Mosaic, MosaicLayout, TileBlock};
pub use reproject::ReprojectOptions;
pub use series::{read_group_series, read_series, write_dual_series, write_series};
pub use types::Raster3;
