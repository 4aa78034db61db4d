//! Data models for outlier detection.
//!
//! This module contains data structures used throughout the outlier detection system.

mod interval;
mod outlier_set;
mod point;
mod record;
mod scored;
mod series;
mod target;

pub use interval::{IntervalLabel, Segmentation};
pub use outlier_set::{DetectionMethod, OutlierSet};
pub use point::Point;
pub use record::{Record, RecordId};
pub use scored::{DegenerateInterval, ScoredRecord, ScoredSeries};
pub use series::Series;
pub use target::TargetColumn;
