//! Outlier Detection Facade
//!
//! Unified re-exports for interval Mahalanobis outlier detection:
//! - Series model, `OutlierError` and the `DistanceMetric` / `OutlierDetector`
//!   contracts from SPI
//! - Configuration types and builders from API
//! - Segmenter, scorer, detectors, report helpers and the pipeline from Core

// Re-export everything from SPI
pub use outlier_spi::*;

// Re-export everything from API
pub use outlier_api::*;

// Re-export everything from Core
pub use outlier_core::*;

/// Convenient imports for the common workflow.
pub mod prelude {
    pub use outlier_api::{PipelineConfig, PipelineConfigBuilder};
    pub use outlier_core::{
        distributional_outliers, merged_outliers, relational_outliers, score, segment,
        AnomalyPipeline, AnomalyReport, AnomalyScorer,
    };
    pub use outlier_spi::{
        OutlierError, OutlierSet, Record, RecordId, Result, ScoredSeries, Series, TargetColumn,
    };
}
