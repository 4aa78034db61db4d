//! Ordinary least squares for the price/volume relation
//!
//! Fits `y = intercept + slope * x` where `x` is the close price and `y` a
//! volume column. Used by the relational detector to find bars whose volume
//! departs from what the price level predicts.

use outlier_spi::{OutlierError, Result};
use serde::{Deserialize, Serialize};

/// Fitted simple linear regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Slope (change in y per unit of x)
    slope: f64,
    /// Y-intercept
    intercept: f64,
    /// R-squared value
    r_squared: f64,
    /// Number of observations used in fitting
    n_observations: usize,
}

impl LinearFit {
    /// Fit by OLS on centered data.
    ///
    /// # Errors
    ///
    /// - `InvalidData` if `x` and `y` differ in length.
    /// - `DegenerateDistribution` with fewer than two observations or a
    ///   constant `x`, where the slope is undefined.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(OutlierError::InvalidData(format!(
                "regression inputs differ in length: {} vs {}",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(OutlierError::degenerate(format!(
                "regression needs at least 2 observations, got {}",
                x.len()
            )));
        }
        if x.iter().all(|&v| v == x[0]) {
            return Err(OutlierError::degenerate(
                "price is constant; regression slope is undefined",
            ));
        }

        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        let mut syy = 0.0;
        for (&xi, &yi) in x.iter().zip(y) {
            let dx = xi - mean_x;
            let dy = yi - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        if !(sxx > 0.0) {
            return Err(OutlierError::degenerate(
                "price has no spread; regression slope is undefined",
            ));
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        let r_squared = if syy > 0.0 { (sxy * sxy) / (sxx * syy) } else { 1.0 };

        Ok(Self {
            slope,
            intercept,
            r_squared,
            n_observations: x.len(),
        })
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Get R-squared (coefficient of determination)
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// `actual - predicted` for each pair.
    pub fn residuals(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(y)
            .map(|(&xi, &yi)| yi - self.predict(xi))
            .collect()
    }
}
