//! Data Source Facade
//!
//! Unified re-exports for the data module.
//!
//! This facade provides a single entry point for all data source functionality:
//! - `data_spi` - `DataSource` contract, `LoadStats` and errors
//! - `data_api` - `CsvConfig` column mapping and builder
//! - `data_core` - `CsvSource` loader
//!
//! # Example
//!
//! ```rust,no_run
//! use data_facade::{CsvSource, DataSource};
//!
//! let series = CsvSource::with_defaults("BTC-Hourly.csv").load().unwrap();
//! println!("Loaded {} bars", series.len());
//! ```

// Re-export everything from SPI
pub use data_spi::*;

// Re-export everything from API
pub use data_api::*;

// Re-export everything from Core
pub use data_core::*;
