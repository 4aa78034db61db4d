//! Outlier detection error types.

use thiserror::Error;

/// Outlier detection errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OutlierError {
    /// A caller-supplied parameter is out of range or unrecognized.
    #[error("Invalid configuration: {name} - {reason}")]
    InvalidConfiguration { name: String, reason: String },

    /// Covariance matrix or regression fit cannot be computed.
    #[error("Degenerate distribution: {0}")]
    DegenerateDistribution(String),

    /// Input series violates an invariant (non-finite value, unsorted timestamps).
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl OutlierError {
    /// Shorthand for an [`OutlierError::InvalidConfiguration`].
    pub fn invalid_config(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`OutlierError::DegenerateDistribution`].
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateDistribution(reason.into())
    }

    /// Whether this error stems from caller configuration rather than the data.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }

    /// Whether this error reports a degenerate distribution.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateDistribution(_))
    }
}

/// Result type for outlier detection operations.
pub type Result<T> = std::result::Result<T, OutlierError>;
