//! Error types for MODIS HDF tile reading.

use thiserror::Error;

/// Result type alias using HdfError.
pub type HdfResult<T> = Result<T, HdfError>;

/// Errors raised while reading MODIS tile files.
#[derive(Debug, Error)]
pub enum HdfError {
    #[error("Failed to open file: {0}")]
    Open(String),

    #[error("Missing variable: {0}")]
    MissingVariable(String),

    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    #[error("Invalid StructMetadata: {0}")]
    InvalidStructMetadata(String),

    #[error("Failed to read data: {0}")]
    Read(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
