//! Records annotated with their interval-local Mahalanobis distance.

use serde::{Deserialize, Serialize};

use super::interval::IntervalLabel;
use super::record::{Record, RecordId};

/// A record with its interval and Mahalanobis distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: RecordId,
    pub record: Record,
    pub interval: IntervalLabel,
    /// Distance to the record's own interval distribution.
    ///
    /// `None` when the interval has fewer than two records or a singular
    /// covariance matrix.
    pub distance: Option<f64>,
}

impl ScoredRecord {
    pub fn is_scored(&self) -> bool {
        self.distance.is_some()
    }
}

/// An interval the scorer could not fit a distribution to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenerateInterval {
    pub interval: IntervalLabel,
    /// Number of records in the interval
    pub size: usize,
    pub reason: String,
}

/// Scoring output: one [`ScoredRecord`] per series record, in series order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredSeries {
    pub records: Vec<ScoredRecord>,
    /// Intervals whose records carry no distance.
    pub degenerate: Vec<DegenerateInterval>,
}

impl ScoredSeries {
    pub fn new(records: Vec<ScoredRecord>, degenerate: Vec<DegenerateInterval>) -> Self {
        Self {
            records,
            degenerate,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: RecordId) -> Option<&ScoredRecord> {
        self.records.get(id.index())
    }

    /// Defined distances only, in series order.
    pub fn defined_distances(&self) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.distance).collect()
    }

    pub fn has_degenerate_intervals(&self) -> bool {
        !self.degenerate.is_empty()
    }
}

impl<'a> IntoIterator for &'a ScoredSeries {
    type Item = &'a ScoredRecord;
    type IntoIter = std::slice::Iter<'a, ScoredRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
