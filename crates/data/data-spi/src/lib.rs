//! Data Source Service Provider Interface
//!
//! Defines the contract and error types for loading hourly bar series.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::DataSource;
pub use error::{DataError, Result};
pub use model::LoadStats;
