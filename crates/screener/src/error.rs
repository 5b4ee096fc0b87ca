//! Error types for the screener.

use crate::config::ConfigError;
use crate::ranking::RankError;
use polars::prelude::PolarsError;
use screener_data::DataError;
use screener_output::ExportError;
use thiserror::Error;

/// Errors that abort a screening run.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// Input could not be loaded or resolved.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Ranking request is invalid.
    #[error("Ranking error: {0}")]
    Rank(#[from] RankError),

    /// Report could not be written.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// DataFrame operation failed.
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for screening operations.
pub type Result<T> = std::result::Result<T, ScreenError>;
