//! Mahalanobis distance in the `[timestamp, price]` plane
//!
//! The reference cloud is summarised by its sample mean and the inverse of
//! its 2x2 sample covariance (divided by `n - 1`). A point's distance is
//! `sqrt((p - mu)^T S^-1 (p - mu))`.
//!
//! Timestamps are ~1e9 while prices are ~1e4, so the covariance is computed
//! on centered data and singularity is judged relative to the variances.

use outlier_spi::{DistanceMetric, OutlierError, Point, Result};
use serde::{Deserialize, Serialize};

/// `|det S| <= SINGULAR_TOLERANCE * var_x * var_y` is treated as singular.
///
/// Equivalent to a squared correlation within 1e-12 of one.
pub const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Mean and inverse covariance of a reference point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDistribution {
    mean: Point,
    /// Inverse covariance as `[a, b, c]` for the symmetric matrix `[[a, b], [b, c]]`
    inverse: [f64; 3],
    count: usize,
}

impl ReferenceDistribution {
    /// Fit the distribution of a reference set.
    ///
    /// Sums are accumulated in sorted `(x, y)` order, so any permutation of
    /// `reference` produces a bit-identical distribution.
    ///
    /// # Errors
    ///
    /// `DegenerateDistribution` when fewer than two points are given, when
    /// either coordinate has zero variance, or when the points are collinear.
    pub fn fit(reference: &[Point]) -> Result<Self> {
        if reference.len() < 2 {
            return Err(OutlierError::degenerate(format!(
                "covariance needs at least 2 reference points, got {}",
                reference.len()
            )));
        }

        let mut points = reference.to_vec();
        points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;

        let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
        for p in &points {
            let dx = p.x - mean_x;
            let dy = p.y - mean_y;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }
        let denom = n - 1.0;
        let (var_x, var_y, cov_xy) = (sxx / denom, syy / denom, sxy / denom);

        // NaN-safe: a NaN variance fails the comparison too
        if !(var_x > 0.0 && var_y > 0.0) {
            return Err(OutlierError::degenerate(format!(
                "zero variance in reference points (var_x={}, var_y={})",
                var_x, var_y
            )));
        }

        let det = var_x * var_y - cov_xy * cov_xy;
        if det <= SINGULAR_TOLERANCE * var_x * var_y {
            return Err(OutlierError::degenerate(
                "singular covariance matrix: reference points are collinear",
            ));
        }

        Ok(Self {
            mean: Point::new(mean_x, mean_y),
            inverse: [var_y / det, -cov_xy / det, var_x / det],
            count: points.len(),
        })
    }

    pub fn mean(&self) -> Point {
        self.mean
    }

    /// Number of reference points the distribution was fitted on.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mahalanobis distance of `point` from this distribution.
    pub fn distance(&self, point: Point) -> f64 {
        let dx = point.x - self.mean.x;
        let dy = point.y - self.mean.y;
        let [a, b, c] = self.inverse;
        let q = dx * dx * a + 2.0 * dx * dy * b + dy * dy * c;
        // the quadratic form is positive definite; clamp rounding below zero
        q.max(0.0).sqrt()
    }
}

/// Mahalanobis distance of `point` from the distribution of `reference`.
pub fn mahalanobis_distance(reference: &[Point], point: Point) -> Result<f64> {
    ReferenceDistribution::fit(reference).map(|dist| dist.distance(point))
}

/// [`DistanceMetric`] backed by [`mahalanobis_distance`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Mahalanobis;

impl DistanceMetric for Mahalanobis {
    fn name(&self) -> &str {
        "mahalanobis"
    }

    fn distance(&self, reference: &[Point], point: Point) -> Result<f64> {
        mahalanobis_distance(reference, point)
    }
}
