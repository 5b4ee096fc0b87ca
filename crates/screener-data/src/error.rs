//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that abort loading an export.
#[derive(Debug, Error)]
pub enum DataError {
    /// One or more required columns are absent
    #[error("Missing columns in input file: {}", .missing.join(", "))]
    MissingColumns {
        /// Labels of every missing required column
        missing: Vec<String>,
    },

    /// The export has a header but no data rows
    #[error("Input file contains no data rows: {source_name}")]
    EmptyInput {
        /// Path or description of the input
        source_name: String,
    },

    /// Input file could not be found
    #[error("File not found: {0}")]
    NotFound(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
