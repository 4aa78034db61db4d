//! Outlier Detection API
//!
//! Configuration types and builders for interval scoring and outlier detection.

use serde::{Deserialize, Serialize};

// Re-export SPI types
pub use outlier_spi::{OutlierError, Result, TargetColumn};

/// Default interval width, in days.
pub const DEFAULT_INTERVAL_DAYS: i64 = 150;

/// Default number of standard deviations for both detectors.
pub const DEFAULT_STD_THRESHOLD: f64 = 4.0;

/// Reject non-positive or non-finite thresholds.
pub fn validate_std_threshold(std_threshold: f64) -> Result<()> {
    if !std_threshold.is_finite() || std_threshold <= 0.0 {
        return Err(OutlierError::invalid_config(
            "std_threshold",
            format!("must be a positive finite number, got {}", std_threshold),
        ));
    }
    Ok(())
}

/// Reject non-positive interval widths.
pub fn validate_interval_days(interval_days: i64) -> Result<()> {
    if interval_days <= 0 {
        return Err(OutlierError::invalid_config(
            "interval_days",
            format!("must be a positive number of days, got {}", interval_days),
        ));
    }
    Ok(())
}

// ============================================================================
// Scoring Configuration
// ============================================================================

/// Interval scoring configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Width of each calendar interval in days (default: 150).
    pub interval_days: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            interval_days: DEFAULT_INTERVAL_DAYS,
        }
    }
}

impl ScoringConfig {
    pub fn new(interval_days: i64) -> Self {
        Self { interval_days }
    }

    pub fn validate(&self) -> Result<()> {
        validate_interval_days(self.interval_days)
    }

    /// Rolling window, in hourly rows, spanning one interval.
    pub fn rolling_window_hours(&self) -> usize {
        (self.interval_days.max(0) as usize).saturating_mul(24)
    }
}

// ============================================================================
// Detector Configuration
// ============================================================================

/// Distributional (Mahalanobis distance) detector configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionalConfig {
    /// Standard deviations from the mean distance (default: 4.0).
    pub std_threshold: f64,
}

impl Default for DistributionalConfig {
    fn default() -> Self {
        Self {
            std_threshold: DEFAULT_STD_THRESHOLD,
        }
    }
}

impl DistributionalConfig {
    pub fn new(std_threshold: f64) -> Self {
        Self { std_threshold }
    }

    pub fn validate(&self) -> Result<()> {
        validate_std_threshold(self.std_threshold)
    }
}

/// Relational (price/volume regression residual) detector configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationalConfig {
    /// Volume column regressed against price (default: volume_btc).
    pub target: TargetColumn,
    /// Standard deviations of the residuals (default: 4.0).
    pub std_threshold: f64,
}

impl Default for RelationalConfig {
    fn default() -> Self {
        Self {
            target: TargetColumn::VolumeBtc,
            std_threshold: DEFAULT_STD_THRESHOLD,
        }
    }
}

impl RelationalConfig {
    pub fn new(target: TargetColumn, std_threshold: f64) -> Self {
        Self {
            target,
            std_threshold,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_std_threshold(self.std_threshold)
    }
}

// ============================================================================
// Pipeline Configuration
// ============================================================================

/// End-to-end scoring and detection configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub scoring: ScoringConfig,
    pub distributional: DistributionalConfig,
    pub relational: RelationalConfig,
}

impl PipelineConfig {
    /// Validate every section; the first invalid field is reported.
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        self.distributional.validate()?;
        self.relational.validate()
    }

    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

/// Builder for PipelineConfig.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Create a new builder starting from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interval width in days.
    pub fn interval_days(mut self, interval_days: i64) -> Self {
        self.config.scoring.interval_days = interval_days;
        self
    }

    /// Set the distributional detector threshold.
    pub fn distributional_threshold(mut self, std_threshold: f64) -> Self {
        self.config.distributional.std_threshold = std_threshold;
        self
    }

    /// Set the relational detector threshold.
    pub fn relational_threshold(mut self, std_threshold: f64) -> Self {
        self.config.relational.std_threshold = std_threshold;
        self
    }

    /// Set the volume column for the relational detector.
    pub fn target(mut self, target: TargetColumn) -> Self {
        self.config.relational.target = target;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
