//! JSON report export

use crate::{
    error::{AppError, Result},
    executor::ExecutionResults,
    models::{Config, Trial},
    stats::RunSummary,
};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings a run was performed with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    pub ping_host: String,
    pub ping_count: u32,
    pub trial_count: u32,
    pub interval_seconds: f64,
    pub speed_servers: Vec<String>,
    pub download_bytes: u64,
    pub upload_bytes: u64,
}

impl From<&Config> for ReportSettings {
    fn from(config: &Config) -> Self {
        Self {
            ping_host: config.ping_host.clone(),
            ping_count: config.ping_count,
            trial_count: config.trial_count,
            interval_seconds: config.interval_seconds,
            speed_servers: config.speed_servers.clone(),
            download_bytes: config.download_bytes,
            upload_bytes: config.upload_bytes,
        }
    }
}

/// Complete, serializable record of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Producing tool and version
    pub tool: String,
    pub version: String,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
    /// When the run started
    pub started_at: DateTime<Local>,
    /// Run duration in seconds
    pub duration_seconds: f64,
    pub settings: ReportSettings,
    pub trials: Vec<Trial>,
    pub summary: RunSummary,
}

impl RunReport {
    /// Assemble a report from a finished run
    pub fn new(config: &Config, results: &ExecutionResults, summary: &RunSummary) -> Self {
        Self {
            tool: crate::PKG_NAME.to_string(),
            version: crate::VERSION.to_string(),
            generated_at: Utc::now(),
            started_at: results.started_at,
            duration_seconds: results.total_duration.as_secs_f64(),
            settings: ReportSettings::from(config),
            trials: results.series.trials().to_vec(),
            summary: summary.clone(),
        }
    }
}

/// Writes run reports as pretty-printed JSON
pub struct ReportExporter;

impl ReportExporter {
    /// Serialize a report
    pub fn to_json(report: &RunReport) -> Result<String> {
        serde_json::to_string_pretty(report)
            .map_err(|e| AppError::render(format!("Failed to serialize report: {}", e)))
    }

    /// Serialize a report to `path`
    pub fn write(report: &RunReport, path: &Path) -> Result<()> {
        let json = Self::to_json(report)?;
        std::fs::write(path, json)
            .map_err(|e| AppError::io(format!("Failed to write report to {}: {}", path.display(), e)))
    }
}
