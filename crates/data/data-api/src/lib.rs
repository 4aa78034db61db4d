//! Data Source API
//!
//! Configuration types and builders for loading bar series.

mod config;

pub use config::{CsvConfig, CsvConfigBuilder};

// Re-export SPI types
pub use data_spi::{DataError, Result};
