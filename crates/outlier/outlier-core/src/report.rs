//! Report helpers: anomaly masks, interval summaries, rolling means and
//! sigma bands of the distance distribution.

use outlier_spi::{
    IntervalLabel, OutlierError, OutlierSet, Result, ScoredSeries, Segmentation, Series,
};
use serde::{Deserialize, Serialize};

use crate::stats::{is_negligible, mean, sample_std};

/// Widest sigma band reported; distances beyond it fall outside every band.
pub const MAX_SIGMA_BAND: u8 = 4;

/// Per-row anomaly flags for a series of `len` records.
///
/// Ids at or beyond `len` are ignored.
pub fn anomaly_mask(len: usize, outliers: &OutlierSet) -> Vec<bool> {
    let mut mask = vec![false; len];
    for id in outliers.iter() {
        if let Some(flag) = mask.get_mut(id.index()) {
            *flag = true;
        }
    }
    mask
}

/// Time extent and mean price of one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSummary {
    pub label: IntervalLabel,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub count: usize,
    pub mean_price: f64,
}

/// One summary per non-empty interval, ascending by label.
pub fn interval_summaries(series: &Series, segmentation: &Segmentation) -> Vec<IntervalSummary> {
    segmentation
        .groups()
        .iter()
        .filter_map(|(&label, members)| {
            let records: Vec<_> = members.iter().filter_map(|&id| series.get(id)).collect();
            let first = records.first()?;
            let (start, end) = records.iter().fold(
                (first.timestamp, first.timestamp),
                |(lo, hi), r| (lo.min(r.timestamp), hi.max(r.timestamp)),
            );
            let prices: Vec<f64> = records.iter().map(|r| r.price).collect();
            Some(IntervalSummary {
                label,
                start_timestamp: start,
                end_timestamp: end,
                count: records.len(),
                mean_price: mean(&prices)?,
            })
        })
        .collect()
}

/// Trailing mean over `window` values; `None` until the window is full.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(OutlierError::invalid_config(
            "window",
            "rolling window must cover at least one value",
        ));
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }
    Ok(out)
}

/// Shape of the distance distribution and its sigma-band occupancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceStats {
    /// Number of scored records
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation
    pub std: Option<f64>,
    /// Records inside 1σ, 2σ, 3σ and 4σ (exclusive of inner bands)
    pub band_counts: [usize; MAX_SIGMA_BAND as usize],
    /// Records at or beyond 4σ
    pub beyond: usize,
}

impl DistanceStats {
    /// Summarise the defined distances of `scored`.
    pub fn from_scored(scored: &ScoredSeries) -> Self {
        let distances = scored.defined_distances();
        let mut stats = Self {
            count: distances.len(),
            mean: mean(&distances),
            std: sample_std(&distances),
            band_counts: [0; MAX_SIGMA_BAND as usize],
            beyond: 0,
        };
        if stats.has_spread() {
            for &d in &distances {
                match stats.sigma_band(d) {
                    Some(band) => stats.band_counts[usize::from(band - 1)] += 1,
                    None => stats.beyond += 1,
                }
            }
        }
        stats
    }

    fn has_spread(&self) -> bool {
        match (self.mean, self.std) {
            (Some(m), Some(s)) => !is_negligible(s, m, self.count),
            _ => false,
        }
    }

    /// Smallest `i` in `1..=4` with `|d - mean| < i * std`.
    ///
    /// `None` beyond 4σ, or when the distribution has no spread.
    pub fn sigma_band(&self, distance: f64) -> Option<u8> {
        if !self.has_spread() {
            return None;
        }
        let (m, s) = (self.mean?, self.std?);
        let deviation = (distance - m).abs();
        (1..=MAX_SIGMA_BAND).find(|&i| deviation < f64::from(i) * s)
    }
}
