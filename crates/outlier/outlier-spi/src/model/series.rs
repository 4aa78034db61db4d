//! Time-ordered series of hourly bars.

use serde::{Deserialize, Serialize};

use super::record::{Record, RecordId};
use super::target::TargetColumn;
use crate::error::{OutlierError, Result};

/// An ordered sequence of [`Record`]s, strictly ascending by timestamp.
///
/// The series is the single source of truth: segmentations, scores and
/// outlier sets are all projections of it keyed by [`RecordId`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Record>", into = "Vec<Record>")]
pub struct Series {
    records: Vec<Record>,
}

impl Series {
    /// Build a series from records that are already sorted and cleansed.
    ///
    /// Fails with [`OutlierError::InvalidData`] if any price or volume is
    /// NaN/Inf, or if timestamps are not strictly ascending.
    pub fn new(records: Vec<Record>) -> Result<Self> {
        for (i, record) in records.iter().enumerate() {
            if !record.is_finite() {
                return Err(OutlierError::InvalidData(format!(
                    "non-finite value at row {} (timestamp {})",
                    i, record.timestamp
                )));
            }
        }
        if let Some(i) = records
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(OutlierError::InvalidData(format!(
                "timestamps must be strictly ascending: row {} ({}) follows row {} ({})",
                i + 1,
                records[i + 1].timestamp,
                i,
                records[i].timestamp
            )));
        }
        Ok(Self { records })
    }

    /// Sort by timestamp and drop duplicate timestamps (first occurrence wins)
    /// before validating.
    pub fn from_unsorted(mut records: Vec<Record>) -> Result<Self> {
        // stable sort keeps the original order among equal timestamps
        records.sort_by_key(|r| r.timestamp);
        records.dedup_by_key(|r| r.timestamp);
        Self::new(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Look up a record by identity.
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.index())
    }

    /// Iterate `(id, record)` pairs in series order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Record)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (RecordId(i), r))
    }

    /// Earliest timestamp, if any.
    pub fn start_timestamp(&self) -> Option<i64> {
        self.records.first().map(|r| r.timestamp)
    }

    /// Latest timestamp, if any.
    pub fn end_timestamp(&self) -> Option<i64> {
        self.records.last().map(|r| r.timestamp)
    }

    pub fn timestamps(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.timestamp).collect()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.price).collect()
    }

    /// Values of a volume column.
    pub fn column(&self, target: TargetColumn) -> Vec<f64> {
        self.records.iter().map(|r| target.value(r)).collect()
    }
}

impl TryFrom<Vec<Record>> for Series {
    type Error = OutlierError;

    fn try_from(records: Vec<Record>) -> Result<Self> {
        Self::new(records)
    }
}

impl From<Series> for Vec<Record> {
    fn from(series: Series) -> Self {
        series.records
    }
}
