//! Error types

use thiserror::Error;

/// Result type for gridbook operations
pub type Result<T> = std::result::Result<T, GridbookError>;

/// Errors raised while building or exporting a workbook
#[derive(Debug, Error)]
pub enum GridbookError {
    /// Empty or malformed grid/record input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Table source did not resolve to a table
    #[error("Invalid table source: {0}")]
    InvalidSource(String),

    /// Malformed color specification
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Malformed A1-style cell address
    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),

    /// Download requested on a workbook without sheets
    #[error("Workbook has no sheets")]
    EmptyWorkbook,

    /// Failure inside the xlsx encoder
    #[error("Encode error: {0}")]
    Encode(#[from] rust_xlsxwriter::XlsxError),

    /// CSV table source error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON input error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
