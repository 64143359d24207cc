//! Error types for ASCII grid parsing.

use thiserror::Error;

/// Result type alias using AsciiGridError.
pub type AsciiGridResult<T> = Result<T, AsciiGridError>;

/// Errors raised while reading or writing ESRI ASCII grids.
#[derive(Debug, Error)]
pub enum AsciiGridError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing header field: {0}")]
    MissingHeader(&'static str),

    #[error("Invalid header line: {0}")]
    InvalidHeader(String),

    #[error("Invalid cell value: {0}")]
    InvalidValue(String),

    #[error("Expected {expected} cell values, found {found}")]
    CellCountMismatch { expected: usize, found: usize },
}
