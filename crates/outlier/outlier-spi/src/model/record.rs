//! Hourly bar records.

use serde::{Deserialize, Serialize};

use super::point::Point;

/// A single hourly bar: close price plus traded volume in both currencies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unix timestamp (seconds)
    pub timestamp: i64,
    /// Closing price
    pub price: f64,
    /// Volume traded, denominated in BTC
    pub volume_btc: f64,
    /// Volume traded, denominated in USD
    pub volume_usd: f64,
}

impl Record {
    /// Create a new Record.
    pub fn new(timestamp: i64, price: f64, volume_btc: f64, volume_usd: f64) -> Self {
        Self {
            timestamp,
            price,
            volume_btc,
            volume_usd,
        }
    }

    /// The `[timestamp, price]` point used for Mahalanobis scoring.
    pub fn time_price(&self) -> Point {
        Point::new(self.timestamp as f64, self.price)
    }

    /// True when price and both volumes are finite.
    pub fn is_finite(&self) -> bool {
        self.price.is_finite() && self.volume_btc.is_finite() && self.volume_usd.is_finite()
    }
}

/// Stable record identity: the row index of the record in its [`Series`](super::Series).
///
/// Every derived structure carries this id so results from different
/// detectors can be intersected without positional alignment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub usize);

impl RecordId {
    /// Row index into the originating series.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for RecordId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
