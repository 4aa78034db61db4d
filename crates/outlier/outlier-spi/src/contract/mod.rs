//! Contract definitions for outlier detection.
//!
//! This module contains trait definitions that providers must implement.

mod distance_metric;
mod outlier_detector;

pub use distance_metric::DistanceMetric;
pub use outlier_detector::OutlierDetector;
