//! Fixed-width calendar interval segmentation.

use outlier_api::{validate_interval_days, ScoringConfig};
use outlier_spi::{IntervalLabel, OutlierError, Result, Segmentation, Series};
use tracing::debug;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Interval of a timestamp given the series start.
///
/// Elapsed seconds are floored to whole days, the day count is
/// integer-divided by the interval width, and labels start at 1.
pub fn interval_label(timestamp: i64, start: i64, interval_days: i64) -> Result<IntervalLabel> {
    validate_interval_days(interval_days)?;
    let elapsed = timestamp.checked_sub(start).ok_or_else(|| {
        OutlierError::InvalidData(format!(
            "elapsed time from {} to {} overflows",
            start, timestamp
        ))
    })?;
    let days = elapsed.div_euclid(SECONDS_PER_DAY);
    let index = days.div_euclid(interval_days) + 1;
    u32::try_from(index)
        .map(IntervalLabel)
        .map_err(|_| OutlierError::InvalidData(format!("interval index {} out of range", index)))
}

/// Assigns every record of a series to a fixed-width calendar interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSegmenter {
    interval_days: i64,
}

impl IntervalSegmenter {
    /// Create a segmenter; `interval_days` must be positive.
    pub fn new(interval_days: i64) -> Result<Self> {
        validate_interval_days(interval_days)?;
        Ok(Self { interval_days })
    }

    /// Create from configuration.
    pub fn from_config(config: ScoringConfig) -> Result<Self> {
        Self::new(config.interval_days)
    }

    pub fn interval_days(&self) -> i64 {
        self.interval_days
    }

    /// Label every record, preserving series order.
    ///
    /// The start is the minimum timestamp of the series, not wall-clock time.
    pub fn segment(&self, series: &Series) -> Result<Segmentation> {
        let start = match series.records().iter().map(|r| r.timestamp).min() {
            Some(start) => start,
            None => return Ok(Segmentation::from_labels(self.interval_days, Vec::new())),
        };

        let labels = series
            .records()
            .iter()
            .map(|r| interval_label(r.timestamp, start, self.interval_days))
            .collect::<Result<Vec<_>>>()?;

        let segmentation = Segmentation::from_labels(self.interval_days, labels);
        debug!(
            records = series.len(),
            intervals = segmentation.interval_count(),
            interval_days = self.interval_days,
            "segmented series"
        );
        Ok(segmentation)
    }
}

/// Segment `series` into `interval_days`-wide intervals.
///
/// Fails with `InvalidConfiguration` before touching any record when
/// `interval_days <= 0`.
pub fn segment(series: &Series, interval_days: i64) -> Result<Segmentation> {
    IntervalSegmenter::new(interval_days)?.segment(series)
}
