//! Error types for the raster crate.

use thiserror::Error;

/// Errors raised by raster transforms.
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Data/coordinate shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Tiles disagree on date coverage: {0}")]
    DateCountMismatch(String),

    #[error("Inconsistent tile geometry: {0}")]
    InconsistentTiles(String),

    #[error("CRS mismatch: expected {expected}, found {found}")]
    CrsMismatch { expected: String, found: String },

    #[error("Clip produced an empty raster (mask does not overlap the grid)")]
    EmptyClip,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("EOF decomposition failed: {0}")]
    Eof(String),

    #[error("NetCDF error: {0}")]
    Netcdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<netcdf::Error> for RasterError {
    fn from(err: netcdf::Error) -> Self {
        RasterError::Netcdf(err.to_string())
    }
}

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, RasterError>;
