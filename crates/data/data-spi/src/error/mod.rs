//! Error types for data loading.

mod data_error;

pub use data_error::{DataError, Result};
