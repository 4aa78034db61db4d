//! Distance metric trait definition.

use crate::error::Result;
use crate::model::Point;

/// Distance of a point from a reference point cloud.
///
/// Implementations are pure: the same inputs always give the same distance.
pub trait DistanceMetric: Send + Sync {
    /// Metric name.
    fn name(&self) -> &str;

    /// Distance of `point` from the distribution of `reference`.
    ///
    /// Fails with `DegenerateDistribution` when the reference set cannot
    /// define a distribution.
    fn distance(&self, reference: &[Point], point: Point) -> Result<f64>;
}
