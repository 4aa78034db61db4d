//! End-to-end scoring, detection and reporting.

use outlier_api::PipelineConfig;
use outlier_spi::{
    DetectionMethod, OutlierDetector, OutlierSet, RecordId, Result, ScoredSeries, Segmentation,
    Series,
};
use serde::Serialize;
use tracing::info;

use crate::detectors::{merged_outliers, DistributionalDetector, RelationalDetector};
use crate::report::{anomaly_mask, interval_summaries, DistanceStats, IntervalSummary};
use crate::scorer::AnomalyScorer;

/// A flagged record with the fields a reader needs to locate it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlaggedRecord {
    pub id: RecordId,
    pub timestamp: i64,
    pub price: f64,
    pub distance: Option<f64>,
}

/// One outlier set, resolved against the scored series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub method: DetectionMethod,
    pub count: usize,
    pub records: Vec<FlaggedRecord>,
    #[serde(skip)]
    set: OutlierSet,
}

impl OutlierReport {
    fn new(set: OutlierSet, scored: &ScoredSeries) -> Self {
        let records = set
            .iter()
            .filter_map(|id| scored.get(id))
            .map(|r| FlaggedRecord {
                id: r.id,
                timestamp: r.record.timestamp,
                price: r.record.price,
                distance: r.distance,
            })
            .collect();
        Self {
            method: set.method(),
            count: set.len(),
            records,
            set,
        }
    }

    pub fn set(&self) -> &OutlierSet {
        &self.set
    }
}

/// Everything a pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub config: PipelineConfig,
    pub record_count: usize,
    pub interval_count: usize,
    pub distributional: OutlierReport,
    pub relational: OutlierReport,
    pub merged: OutlierReport,
    pub intervals: Vec<IntervalSummary>,
    pub distance_stats: DistanceStats,
    pub scored: ScoredSeries,
}

impl AnomalyReport {
    /// Per-row flags for records in both outlier sets.
    pub fn merged_mask(&self) -> Vec<bool> {
        anomaly_mask(self.record_count, self.merged.set())
    }
}

/// Scorer plus both detectors, built from one validated configuration.
#[derive(Debug, Clone)]
pub struct AnomalyPipeline {
    config: PipelineConfig,
    scorer: AnomalyScorer,
    distributional: DistributionalDetector,
    relational: RelationalDetector,
}

impl AnomalyPipeline {
    /// Build a pipeline; fails on the first invalid configuration field.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            scorer: AnomalyScorer::from_config(config.scoring)?,
            distributional: DistributionalDetector::from_config(config.distributional)?,
            relational: RelationalDetector::from_config(config.relational)?,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn scorer(&self) -> &AnomalyScorer {
        &self.scorer
    }

    /// Score, detect and merge.
    pub fn run(&self, series: &Series) -> Result<AnomalyReport> {
        let segmentation = self.scorer.segmenter().segment(series)?;
        let scored = self.score(series, &segmentation)?;

        let distributional = self.distributional.detect(&scored)?;
        let relational = self.relational.detect(&scored)?;
        let merged = merged_outliers(&distributional, &relational);

        info!(
            records = series.len(),
            intervals = segmentation.interval_count(),
            degenerate_intervals = scored.degenerate.len(),
            distributional = distributional.len(),
            relational = relational.len(),
            merged = merged.len(),
            "anomaly detection complete"
        );

        Ok(AnomalyReport {
            config: self.config,
            record_count: series.len(),
            interval_count: segmentation.interval_count(),
            distributional: OutlierReport::new(distributional, &scored),
            relational: OutlierReport::new(relational, &scored),
            merged: OutlierReport::new(merged, &scored),
            intervals: interval_summaries(series, &segmentation),
            distance_stats: DistanceStats::from_scored(&scored),
            scored,
        })
    }

    #[cfg(not(feature = "parallel"))]
    fn score(&self, series: &Series, segmentation: &Segmentation) -> Result<ScoredSeries> {
        self.scorer.score_segmented(series, segmentation)
    }

    #[cfg(feature = "parallel")]
    fn score(&self, series: &Series, segmentation: &Segmentation) -> Result<ScoredSeries> {
        self.scorer.score_segmented_parallel(series, segmentation)
    }
}
