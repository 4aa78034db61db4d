//! Per-interval Mahalanobis scoring.
//!
//! Each interval's `[timestamp, price]` cloud is fitted once and every member
//! is scored against its own interval only. An interval that cannot be
//! fitted leaves its records with `distance = None` and is reported in
//! [`ScoredSeries::degenerate`]; the remaining intervals are unaffected.

use outlier_api::ScoringConfig;
use outlier_spi::{
    DegenerateInterval, IntervalLabel, OutlierError, Point, Record, RecordId, Result,
    ScoredRecord, ScoredSeries, Segmentation, Series,
};
use tracing::{debug, warn};

use crate::mahalanobis::ReferenceDistribution;
use crate::segmenter::IntervalSegmenter;

/// Scores records by Mahalanobis distance to their interval's distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnomalyScorer {
    segmenter: IntervalSegmenter,
}

impl AnomalyScorer {
    /// Create a scorer; `interval_days` must be positive.
    pub fn new(interval_days: i64) -> Result<Self> {
        Ok(Self {
            segmenter: IntervalSegmenter::new(interval_days)?,
        })
    }

    /// Create from configuration.
    pub fn from_config(config: ScoringConfig) -> Result<Self> {
        Self::new(config.interval_days)
    }

    pub fn interval_days(&self) -> i64 {
        self.segmenter.interval_days()
    }

    pub fn segmenter(&self) -> &IntervalSegmenter {
        &self.segmenter
    }

    /// Segment and score `series`.
    pub fn score(&self, series: &Series) -> Result<ScoredSeries> {
        let segmentation = self.segmenter.segment(series)?;
        self.score_segmented(series, &segmentation)
    }

    /// Score `series` using a segmentation computed for it.
    pub fn score_segmented(
        &self,
        series: &Series,
        segmentation: &Segmentation,
    ) -> Result<ScoredSeries> {
        check_alignment(series, segmentation)?;

        let outcomes = segmentation
            .groups()
            .iter()
            .map(|(&label, members)| (label, members.len(), score_interval(series, members)));

        Ok(assemble(series, segmentation, outcomes))
    }

    /// Like [`score`](Self::score) but scores intervals on the rayon pool.
    ///
    /// Each task reads only its own interval; results are merged by record
    /// id, so the output is identical to the sequential path.
    #[cfg(feature = "parallel")]
    pub fn score_parallel(&self, series: &Series) -> Result<ScoredSeries> {
        let segmentation = self.segmenter.segment(series)?;
        self.score_segmented_parallel(series, &segmentation)
    }

    /// Like [`score_segmented`](Self::score_segmented) but scores intervals
    /// on the rayon pool.
    #[cfg(feature = "parallel")]
    pub fn score_segmented_parallel(
        &self,
        series: &Series,
        segmentation: &Segmentation,
    ) -> Result<ScoredSeries> {
        use rayon::prelude::*;

        check_alignment(series, segmentation)?;

        let outcomes: Vec<_> = segmentation
            .groups()
            .par_iter()
            .map(|(&label, members)| (label, members.len(), score_interval(series, members)))
            .collect();

        Ok(assemble(series, segmentation, outcomes))
    }
}

/// Score `series` with `interval_days`-wide intervals.
pub fn score(series: &Series, interval_days: i64) -> Result<ScoredSeries> {
    AnomalyScorer::new(interval_days)?.score(series)
}

fn check_alignment(series: &Series, segmentation: &Segmentation) -> Result<()> {
    if segmentation.len() != series.len() {
        return Err(OutlierError::InvalidData(format!(
            "segmentation covers {} records but the series has {}",
            segmentation.len(),
            series.len()
        )));
    }
    Ok(())
}

/// Fit one interval and score each member against it.
fn score_interval(series: &Series, members: &[RecordId]) -> Result<Vec<(RecordId, f64)>> {
    let points = members
        .iter()
        .map(|&id| {
            series
                .get(id)
                .map(Record::time_price)
                .ok_or_else(|| OutlierError::InvalidData(format!("unknown record {}", id)))
        })
        .collect::<Result<Vec<Point>>>()?;

    let distribution = ReferenceDistribution::fit(&points)?;
    let mean = distribution.mean();
    debug!(
        points = distribution.count(),
        mean_timestamp = mean.x,
        mean_price = mean.y,
        "fitted interval distribution"
    );
    Ok(members
        .iter()
        .zip(&points)
        .map(|(&id, &p)| (id, distribution.distance(p)))
        .collect())
}

fn assemble(
    series: &Series,
    segmentation: &Segmentation,
    outcomes: impl IntoIterator<Item = (IntervalLabel, usize, Result<Vec<(RecordId, f64)>>)>,
) -> ScoredSeries {
    let mut distances: Vec<Option<f64>> = vec![None; series.len()];
    let mut degenerate = Vec::new();

    for (label, size, outcome) in outcomes {
        match outcome {
            Ok(scores) => {
                debug!(interval = label.get(), records = size, "scored interval");
                for (id, d) in scores {
                    distances[id.index()] = Some(d);
                }
            }
            Err(err) => {
                warn!(
                    interval = label.get(),
                    records = size,
                    error = %err,
                    "interval left unscored"
                );
                degenerate.push(DegenerateInterval {
                    interval: label,
                    size,
                    reason: err.to_string(),
                });
            }
        }
    }
    degenerate.sort_by_key(|d| d.interval);

    let records = series
        .iter()
        .zip(segmentation.labels())
        .zip(distances)
        .map(|(((id, record), &interval), distance)| ScoredRecord {
            id,
            record: *record,
            interval,
            distance,
        })
        .collect();

    ScoredSeries::new(records, degenerate)
}
