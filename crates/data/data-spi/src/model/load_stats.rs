//! Row accounting for a load.

use serde::{Deserialize, Serialize};

/// Counts of rows read and discarded while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    /// Data rows read, excluding banner and header
    pub rows_read: usize,
    /// Rows with a missing, unparsable, NaN or infinite field
    pub dropped_invalid: usize,
    /// Rows sharing a timestamp with an earlier row
    pub dropped_duplicate: usize,
}

impl LoadStats {
    /// Rows that made it into the series.
    pub fn rows_kept(&self) -> usize {
        self.rows_read
            .saturating_sub(self.dropped_invalid)
            .saturating_sub(self.dropped_duplicate)
    }

    pub fn dropped(&self) -> usize {
        self.dropped_invalid + self.dropped_duplicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_kept() {
        let stats = LoadStats {
            rows_read: 10,
            dropped_invalid: 2,
            dropped_duplicate: 1,
        };
        assert_eq!(stats.rows_kept(), 7);
        assert_eq!(stats.dropped(), 3);
        assert_eq!(LoadStats::default().rows_kept(), 0);
    }
}
