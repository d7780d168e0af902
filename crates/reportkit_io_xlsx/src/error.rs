//! Top-level error type of the report renderer.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised while reading input or building/persisting a report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Input is not JSON or not an array of table descriptors.
    #[error("Invalid input: {0}")]
    Input(#[from] serde_json::Error),

    /// A row value that cannot be written as a single cell.
    #[error("Unsupported cell value in table {table:?} at row {row}, column {col}: {value}")]
    UnsupportedCell {
        /// Table name.
        table: String,
        /// Zero-based body row index.
        row: usize,
        /// Zero-based column index.
        col: usize,
        /// Offending JSON text.
        value: String,
    },

    /// Invalid report option.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Workbook construction or save failed.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Filesystem error while reading input or resolving the output path.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Post-save check did not find a non-empty file.
    #[error("File {} was not created", .0.display())]
    OutputMissing(PathBuf),

    /// Write attempted on a closed writer.
    #[error("Cannot write after close().")]
    Closed,

    /// Row/column index beyond Excel limits.
    #[error("{0}")]
    IndexOverflow(String),
}
