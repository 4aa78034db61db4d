//! Data source trait definition.

use outlier_spi::Series;

use crate::error::Result;
use crate::model::LoadStats;

/// Source of a cleansed, time-ordered bar series.
pub trait DataSource: Send + Sync {
    /// Data source name.
    fn name(&self) -> &str;

    /// Load the series along with what cleansing discarded.
    fn load_with_stats(&self) -> Result<(Series, LoadStats)>;

    /// Load the series.
    fn load(&self) -> Result<Series> {
        self.load_with_stats().map(|(series, _)| series)
    }
}
