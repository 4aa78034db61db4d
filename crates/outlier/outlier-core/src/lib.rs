//! Outlier Detection Core
//!
//! Implementations for interval segmentation, Mahalanobis scoring, the
//! distributional and relational detectors, and report helpers.

pub mod detectors;
pub mod mahalanobis;
pub mod pipeline;
pub mod regression;
pub mod report;
pub mod scorer;
pub mod segmenter;
pub mod stats;

pub use detectors::*;
pub use mahalanobis::*;
pub use pipeline::*;
pub use regression::*;
pub use report::*;
pub use scorer::*;
pub use segmenter::*;
