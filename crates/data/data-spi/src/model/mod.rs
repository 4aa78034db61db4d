//! Data models for loading.

mod load_stats;

pub use load_stats::LoadStats;
