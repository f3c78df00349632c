//! Data models and structures for the bufferbloat tester

pub mod config;
pub mod trial;

// Re-export main model types
pub use config::Config;
pub use trial::{Trial, TrialSeries, TIMESTAMP_FORMAT};
