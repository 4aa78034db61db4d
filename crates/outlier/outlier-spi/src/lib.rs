//! Outlier Detection Service Provider Interface
//!
//! Defines the series model, error types and the contracts implemented by
//! distance metrics and outlier detectors.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{DistanceMetric, OutlierDetector};
pub use error::{OutlierError, Result};
pub use model::{
    DegenerateInterval, DetectionMethod, IntervalLabel, OutlierSet, Point, Record, RecordId,
    ScoredRecord, ScoredSeries, Segmentation, Series, TargetColumn,
};
