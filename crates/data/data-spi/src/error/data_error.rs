//! Data error types.

use outlier_spi::OutlierError;
use thiserror::Error;

/// Data loading errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// The input could not be opened or read
    #[error("I/O error: {0}")]
    Io(String),

    /// Malformed CSV framing
    #[error("CSV error: {0}")]
    Csv(String),

    /// A required column is absent from the header
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A row failed to parse (strict mode only)
    #[error("Invalid row at line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    /// No rows survived cleansing
    #[error("No usable rows in input")]
    NoData,

    /// Cleansed rows still violate a series invariant
    #[error("Invalid series: {0}")]
    Series(#[from] OutlierError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;
