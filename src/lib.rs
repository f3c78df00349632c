//! Bufferbloat Tester
//!
//! Measures round-trip latency before, during and after a bandwidth-saturating
//! speed test, repeats that over several trials, and grades the latency
//! inflation observed under load.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod stats;
pub mod throughput;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use executor::TrialOrchestrator;
pub use models::{Config, Trial, TrialSeries};
pub use probe::{LatencyProber, LatencyResult, PingProber};
pub use stats::{RunSummary, SeriesSummary};
pub use throughput::{HttpThroughputMeasurer, ThroughputMeasurer, ThroughputResult};
pub use types::BufferbloatGrade;
pub use output::{OutputFormatter, ColoredFormatter, PlainFormatter, OutputCoordinator, OutputFormatterFactory};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata stamped by build.rs
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_PING_HOST: &str = "8.8.8.8";
    pub const DEFAULT_PING_COUNT: u32 = 1;
    pub const DEFAULT_TRIAL_COUNT: u32 = 5;
    pub const DEFAULT_INTERVAL_SECONDS: f64 = 5.0;
    pub const DEFAULT_SPEED_SERVERS: &[&str] = &["https://speed.cloudflare.com"];
    pub const DEFAULT_DOWNLOAD_BYTES: u64 = 25_000_000;
    pub const DEFAULT_UPLOAD_BYTES: u64 = 10_000_000;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
