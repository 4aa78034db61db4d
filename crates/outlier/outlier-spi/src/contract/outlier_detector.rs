//! Outlier detector trait definition.

use crate::error::Result;
use crate::model::{DetectionMethod, OutlierSet, ScoredSeries};

/// Flags anomalous records of a scored series.
pub trait OutlierDetector: Send + Sync {
    /// Method tag carried by the sets this detector produces.
    fn method(&self) -> DetectionMethod;

    /// Detect outliers. Calling twice with the same input yields the same set.
    fn detect(&self, scored: &ScoredSeries) -> Result<OutlierSet>;
}
