//! Latency probing through the system `ping` utility
//!
//! The prober spawns one `ping` process per call and scrapes the first
//! `time=<value> ms` fragment out of its standard output. Every failure
//! (spawn error, non-zero exit, missing marker, unparsable number) collapses
//! to [`LatencyResult::Failed`]; the cause only reaches the log.

use crate::{
    error::{AppError, Result},
    logging::{LogLevel, Logger},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::process::Command;

/// Marker preceding the round-trip time in ping output
pub const TIME_MARKER: &str = "time=";
/// Unit suffix terminating the round-trip time
pub const UNIT_MARKER: &str = "ms";
/// Default program used for probing
pub const DEFAULT_PING_PROGRAM: &str = "ping";
/// Level of the raw ping output dump, shown with `--debug`
pub const PING_OUTPUT_LEVEL: LogLevel = LogLevel::Debug;

/// Outcome of a single latency probe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LatencyResult {
    /// Round-trip time in milliseconds
    Measured(f64),
    /// The probe did not yield a usable value
    Failed,
}

impl LatencyResult {
    /// Convert into the optional value stored in a trial
    pub fn as_option(&self) -> Option<f64> {
        match self {
            LatencyResult::Measured(ms) => Some(*ms),
            LatencyResult::Failed => None,
        }
    }

    /// Check whether the probe failed
    pub fn is_failed(&self) -> bool {
        matches!(self, LatencyResult::Failed)
    }
}

impl From<Result<f64>> for LatencyResult {
    fn from(result: Result<f64>) -> Self {
        match result {
            Ok(ms) => LatencyResult::Measured(ms),
            Err(_) => LatencyResult::Failed,
        }
    }
}

/// Latency prober abstraction, swappable for tests or other probing strategies
#[async_trait]
pub trait LatencyProber: Send + Sync {
    /// Measure the round-trip latency to `host` using `count` echo requests
    async fn probe(&self, host: &str, count: u32) -> LatencyResult;
}

/// Build the argument list for the platform ping utility
pub fn ping_arguments(host: &str, count: u32, windows: bool) -> Vec<String> {
    let count_flag = if windows { "-n" } else { "-c" };
    vec![count_flag.to_string(), count.to_string(), host.to_string()]
}

/// Extract the first round-trip time from ping output.
///
/// Everything after the first `time=` up to the next `ms` is trimmed and
/// parsed. When no `ms` follows the marker the whole remainder is used.
pub fn parse_ping_output(output: &str) -> Result<f64> {
    let start = output
        .find(TIME_MARKER)
        .ok_or_else(|| AppError::probe("No 'time=' marker in ping output"))?;

    let rest = &output[start + TIME_MARKER.len()..];
    let raw = match rest.find(UNIT_MARKER) {
        Some(end) => &rest[..end],
        None => rest,
    };
    let raw = raw.trim();

    let value: f64 = raw
        .parse()
        .map_err(|e| AppError::probe(format!("Unparsable round-trip time '{}': {}", raw, e)))?;

    if !value.is_finite() {
        return Err(AppError::probe(format!("Non-finite round-trip time '{}'", raw)));
    }

    Ok(value)
}

/// Prober backed by the system `ping` command
#[derive(Clone)]
pub struct PingProber {
    program: String,
    logger: Logger,
}

impl PingProber {
    /// Create a prober using the system `ping`
    pub fn new(logger: Logger) -> Self {
        Self::with_program(DEFAULT_PING_PROGRAM, logger)
    }

    /// Create a prober running a different program with ping-style arguments
    pub fn with_program(program: &str, logger: Logger) -> Self {
        Self {
            program: program.to_string(),
            logger,
        }
    }

    /// Program this prober spawns
    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run_ping(&self, host: &str, count: u32) -> Result<f64> {
        let args = ping_arguments(host, count, cfg!(windows));

        self.logger.debug(&format!("Running {} {}", self.program, args.join(" ")))
            .field("program", &self.program)
            .field("host", host)
            .field("count", count)
            .log()
            .await;

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| AppError::probe(format!("Failed to run {}: {}", self.program, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() {
            return Err(AppError::probe(format!(
                "{} exited with {} for host {}",
                self.program, output.status, host
            )));
        }

        self.logger.log(PING_OUTPUT_LEVEL, "Ping output")
            .field("stdout", stdout.to_string())
            .log()
            .await;

        parse_ping_output(&stdout)
    }
}

#[async_trait]
impl LatencyProber for PingProber {
    async fn probe(&self, host: &str, count: u32) -> LatencyResult {
        match self.run_ping(host, count).await {
            Ok(ms) => LatencyResult::Measured(ms),
            Err(e) => {
                self.logger.warn(&format!("Ping to {} failed", host))
                    .error_info(&e)
                    .log()
                    .await;
                LatencyResult::Failed
            }
        }
    }
}
