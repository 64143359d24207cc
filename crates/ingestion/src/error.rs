//! Error types for the ingestion crate.

use thiserror::Error;

/// Errors that can occur while assembling a series from local files.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to read tile: {0}")]
    Hdf(#[from] hdf_parser::HdfError),

    #[error("Failed to read ASCII grid: {0}")]
    Ascii(#[from] ascii_grid::AsciiGridError),

    #[error("Raster operation failed: {0}")]
    Raster(#[from] raster::RasterError),

    #[error("No files found: {0}")]
    NoFiles(String),

    #[error("Tiles disagree on available dates: {0}")]
    DateCountMismatch(String),

    #[error("Fill value specification must have one or two values, got {0}")]
    InvalidFillValues(usize),

    #[error("Unrecognized filename: {0}")]
    Filename(String),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
