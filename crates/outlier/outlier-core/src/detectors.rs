//! Outlier detector implementations.

use outlier_api::{validate_std_threshold, DistributionalConfig, RelationalConfig};
use outlier_spi::{
    DetectionMethod, OutlierDetector, OutlierSet, Record, RecordId, Result, ScoredSeries, Series,
    TargetColumn,
};
use tracing::debug;

use crate::regression::LinearFit;
use crate::stats::{is_negligible, mean, population_std, sample_std};

// ============================================================================
// Distributional Detector
// ============================================================================

/// Records whose Mahalanobis distance lies more than `std_threshold` sample
/// standard deviations from the mean distance.
///
/// Unscored records (`distance = None`) are excluded from the statistics and
/// never flagged. Fewer than two scored records, or zero spread, yield an
/// empty set.
pub fn distributional_outliers(scored: &ScoredSeries, std_threshold: f64) -> Result<OutlierSet> {
    validate_std_threshold(std_threshold)?;
    let method = DetectionMethod::Distributional;

    let defined: Vec<(RecordId, f64)> = scored
        .iter()
        .filter_map(|r| r.distance.map(|d| (r.id, d)))
        .collect();
    let distances: Vec<f64> = defined.iter().map(|&(_, d)| d).collect();

    let (mean, std) = match (mean(&distances), sample_std(&distances)) {
        (Some(m), Some(s)) => (m, s),
        _ => return Ok(OutlierSet::empty(method)),
    };
    if is_negligible(std, mean, distances.len()) {
        debug!(mean, "distances have no spread; no distributional outliers");
        return Ok(OutlierSet::empty(method));
    }

    let threshold = std_threshold * std;
    let set = OutlierSet::new(
        method,
        defined
            .iter()
            .filter(|&&(_, d)| (d - mean).abs() > threshold)
            .map(|&(id, _)| id),
    );
    debug!(
        scored = distances.len(),
        mean,
        std,
        std_threshold,
        outliers = set.len(),
        "distributional detection"
    );
    Ok(set)
}

/// Distance-threshold detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionalDetector {
    std_threshold: f64,
}

impl DistributionalDetector {
    /// Create a new detector; the threshold must be positive.
    pub fn new(std_threshold: f64) -> Result<Self> {
        validate_std_threshold(std_threshold)?;
        Ok(Self { std_threshold })
    }

    /// Create from configuration.
    pub fn from_config(config: DistributionalConfig) -> Result<Self> {
        Self::new(config.std_threshold)
    }

    pub fn std_threshold(&self) -> f64 {
        self.std_threshold
    }
}

impl Default for DistributionalDetector {
    fn default() -> Self {
        Self {
            std_threshold: DistributionalConfig::default().std_threshold,
        }
    }
}

impl OutlierDetector for DistributionalDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Distributional
    }

    fn detect(&self, scored: &ScoredSeries) -> Result<OutlierSet> {
        distributional_outliers(scored, self.std_threshold)
    }
}

// ============================================================================
// Relational Detector
// ============================================================================

/// Records whose `target` volume departs from the OLS price/volume line by
/// more than `std_threshold` population standard deviations of the residuals.
///
/// # Errors
///
/// `DegenerateDistribution` when the price is constant across the series or
/// the series has fewer than two records (an empty series yields an empty set).
pub fn relational_outliers(
    series: &Series,
    target: TargetColumn,
    std_threshold: f64,
) -> Result<OutlierSet> {
    validate_std_threshold(std_threshold)?;
    residual_outliers(series.iter(), target, std_threshold)
}

fn residual_outliers<'a>(
    records: impl Iterator<Item = (RecordId, &'a Record)>,
    target: TargetColumn,
    std_threshold: f64,
) -> Result<OutlierSet> {
    let method = DetectionMethod::Relational(target);

    let mut ids = Vec::new();
    let mut prices = Vec::new();
    let mut volumes = Vec::new();
    for (id, record) in records {
        ids.push(id);
        prices.push(record.price);
        volumes.push(target.value(record));
    }
    if ids.is_empty() {
        return Ok(OutlierSet::empty(method));
    }

    let fit = LinearFit::fit(&prices, &volumes)?;
    let residuals = fit.residuals(&prices, &volumes);
    let std = population_std(&residuals).unwrap_or(0.0);

    let scale = volumes.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if is_negligible(std, scale, volumes.len()) {
        debug!(%target, "volume is an exact linear function of price; no relational outliers");
        return Ok(OutlierSet::empty(method));
    }

    let threshold = std_threshold * std;
    let set = OutlierSet::new(
        method,
        ids.iter()
            .zip(&residuals)
            .filter(|&(_, r)| r.abs() > threshold)
            .map(|(&id, _)| id),
    );
    debug!(
        %target,
        slope = fit.slope(),
        intercept = fit.intercept(),
        r_squared = fit.r_squared(),
        observations = fit.n_observations(),
        residual_std = std,
        std_threshold,
        outliers = set.len(),
        "relational detection"
    );
    Ok(set)
}

/// Price/volume residual detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelationalDetector {
    target: TargetColumn,
    std_threshold: f64,
}

impl RelationalDetector {
    /// Create a new detector; the threshold must be positive.
    pub fn new(target: TargetColumn, std_threshold: f64) -> Result<Self> {
        validate_std_threshold(std_threshold)?;
        Ok(Self {
            target,
            std_threshold,
        })
    }

    /// Create from configuration.
    pub fn from_config(config: RelationalConfig) -> Result<Self> {
        Self::new(config.target, config.std_threshold)
    }

    pub fn target(&self) -> TargetColumn {
        self.target
    }

    pub fn std_threshold(&self) -> f64 {
        self.std_threshold
    }

    /// Detect directly on a series.
    pub fn detect_series(&self, series: &Series) -> Result<OutlierSet> {
        relational_outliers(series, self.target, self.std_threshold)
    }
}

impl OutlierDetector for RelationalDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Relational(self.target)
    }

    fn detect(&self, scored: &ScoredSeries) -> Result<OutlierSet> {
        residual_outliers(
            scored.iter().map(|r| (r.id, &r.record)),
            self.target,
            self.std_threshold,
        )
    }
}

// ============================================================================
// Merge
// ============================================================================

/// Records flagged by both detectors, matched by [`RecordId`].
pub fn merged_outliers(distributional: &OutlierSet, relational: &OutlierSet) -> OutlierSet {
    distributional.intersection(relational)
}

#[cfg(test)]
mod tests {
    use super::*;
    use outlier_spi::{IntervalLabel, ScoredRecord};

    fn scored_from(distances: &[Option<f64>]) -> ScoredSeries {
        let records = distances
            .iter()
            .enumerate()
            .map(|(i, &distance)| ScoredRecord {
                id: RecordId(i),
                record: Record::new(i as i64 * 3600, 100.0, 1.0, 100.0),
                interval: IntervalLabel(1),
                distance,
            })
            .collect();
        ScoredSeries::new(records, Vec::new())
    }

    fn series_from(rows: &[(f64, f64)]) -> Series {
        Series::new(
            rows.iter()
                .enumerate()
                .map(|(i, &(price, volume))| Record::new(i as i64 * 3600, price, volume, volume * price))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_distributional_flags_far_distance() {
        let mut distances = vec![Some(1.0); 20];
        distances[3] = Some(1.1);
        distances[7] = Some(0.9);
        distances[12] = Some(9.0);
        let set = distributional_outliers(&scored_from(&distances), 3.0).unwrap();
        assert_eq!(set.method(), DetectionMethod::Distributional);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![RecordId(12)]);
    }

    #[test]
    fn test_distributional_ignores_unscored() {
        let mut distances = vec![Some(1.0); 20];
        distances[12] = Some(9.0);
        distances[4] = None;
        let set = distributional_outliers(&scored_from(&distances), 3.0).unwrap();
        assert!(!set.contains(RecordId(4)));
        assert!(set.contains(RecordId(12)));
    }

    #[test]
    fn test_distributional_zero_spread_is_empty() {
        let set = distributional_outliers(&scored_from(&[Some(1.5); 10]), 1.0).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_distributional_too_few_scored_is_empty() {
        let set = distributional_outliers(&scored_from(&[Some(1.5), None, None]), 1.0).unwrap();
        assert!(set.is_empty());
        let set = distributional_outliers(&ScoredSeries::default(), 1.0).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_distributional_rejects_bad_threshold() {
        let scored = scored_from(&[Some(1.0), Some(2.0)]);
        assert!(distributional_outliers(&scored, 0.0).unwrap_err().is_configuration());
        assert!(distributional_outliers(&scored, -2.0).is_err());
        assert!(DistributionalDetector::new(0.0).is_err());
    }

    #[test]
    fn test_distributional_uses_sample_std() {
        // mean 2, sample std 1 -> threshold 1 at k = 1; |3 - 2| = 1 is not > 1
        let scored = scored_from(&[Some(1.0), Some(2.0), Some(3.0)]);
        assert!(distributional_outliers(&scored, 1.0).unwrap().is_empty());
        // population std would be 0.816 and flag both ends
        assert_eq!(distributional_outliers(&scored, 0.8).unwrap().len(), 2);
    }

    #[test]
    fn test_relational_flags_volume_spike() {
        let mut rows: Vec<(f64, f64)> = (0..30)
            .map(|i| (100.0 + i as f64, 50.0 + 0.5 * i as f64 + if i % 2 == 0 { 0.3 } else { -0.3 }))
            .collect();
        rows[17].1 += 40.0;
        let set = relational_outliers(&series_from(&rows), TargetColumn::VolumeBtc, 3.0).unwrap();
        assert_eq!(set.method(), DetectionMethod::Relational(TargetColumn::VolumeBtc));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![RecordId(17)]);
    }

    #[test]
    fn test_relational_flags_small_spike_on_large_volume() {
        // USD volume sits near 1e10 and wobbles by one dollar
        let records = (0..100)
            .map(|i| {
                let mut usd = 1e10 + if i % 2 == 0 { 1.0 } else { -1.0 };
                if i == 40 {
                    usd += 50.0;
                }
                Record::new(i as i64 * 3600, 100.0 + i as f64, 1.0, usd)
            })
            .collect();
        let series = Series::new(records).unwrap();
        let set = relational_outliers(&series, TargetColumn::VolumeUsd, 4.0).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![RecordId(40)]);
    }

    #[test]
    fn test_relational_exact_line_is_empty() {
        let rows: Vec<(f64, f64)> = (0..50).map(|i| (9_000.0 + 13.0 * i as f64, 0.0)).collect();
        let rows: Vec<(f64, f64)> = rows.iter().map(|&(p, _)| (p, 2.5 * p - 1_000.0)).collect();
        for k in [0.1, 1.0, 4.0] {
            let set = relational_outliers(&series_from(&rows), TargetColumn::VolumeBtc, k).unwrap();
            assert!(set.is_empty());
        }
    }

    #[test]
    fn test_relational_constant_price_is_degenerate() {
        let rows = vec![(100.0, 1.0), (100.0, 2.0), (100.0, 3.0)];
        let err = relational_outliers(&series_from(&rows), TargetColumn::VolumeUsd, 4.0).unwrap_err();
        assert!(err.is_degenerate());
    }

    #[test]
    fn test_relational_empty_series() {
        let set = relational_outliers(&Series::default(), TargetColumn::VolumeBtc, 4.0).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_relational_detector_trait_matches_function() {
        let mut rows: Vec<(f64, f64)> = (0..30)
            .map(|i| (100.0 + i as f64, 50.0 + if i % 3 == 0 { 1.0 } else { -0.5 }))
            .collect();
        rows[5].1 = 120.0;
        let series = series_from(&rows);
        let scored = crate::scorer::score(&series, 1).unwrap();

        let detector = RelationalDetector::new(TargetColumn::VolumeBtc, 2.0).unwrap();
        assert_eq!(
            detector.detect(&scored).unwrap(),
            detector.detect_series(&series).unwrap()
        );
        assert_eq!(detector.method(), DetectionMethod::Relational(TargetColumn::VolumeBtc));
    }

    #[test]
    fn test_merged_is_intersection() {
        let a = OutlierSet::new(DetectionMethod::Distributional, [RecordId(1), RecordId(4), RecordId(6)]);
        let b = OutlierSet::new(
            DetectionMethod::Relational(TargetColumn::VolumeUsd),
            [RecordId(4), RecordId(6), RecordId(9)],
        );
        let merged = merged_outliers(&a, &b);
        assert_eq!(merged.method(), DetectionMethod::Merged);
        assert_eq!(merged.iter().collect::<Vec<_>>(), vec![RecordId(4), RecordId(6)]);
        assert_eq!(merged_outliers(&b, &a).ids(), merged.ids());
    }

    #[test]
    fn test_detector_defaults() {
        let detector = DistributionalDetector::default();
        assert_eq!(detector.std_threshold(), 4.0);
        let detector = RelationalDetector::from_config(RelationalConfig::default()).unwrap();
        assert_eq!(detector.target(), TargetColumn::VolumeBtc);
        assert_eq!(detector.std_threshold(), 4.0);
    }
}
