//! Trial and trial-series data models

use crate::types::BufferbloatGrade;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Time format used for trial timestamps in tables and charts
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// One before/load/during/after measurement cycle.
///
/// Every measurement is optional: `None` is the missing marker for a failed
/// probe or transfer and is never replaced by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// 0-based position in the run
    pub index: usize,

    /// Captured when the throughput measurement succeeds
    pub timestamp: Option<DateTime<Local>>,

    /// Idle latency before the speed test (ms)
    pub latency_before_ms: Option<f64>,

    /// Latency right after the load-generating transfer (ms)
    pub latency_during_ms: Option<f64>,

    /// Latency after the recovery interval (ms)
    pub latency_after_ms: Option<f64>,

    /// Download throughput (Mbps)
    pub download_mbps: Option<f64>,

    /// Upload throughput (Mbps)
    pub upload_mbps: Option<f64>,

    /// `None` when either the before or the during probe failed
    pub grade: Option<BufferbloatGrade>,
}

impl Trial {
    /// Create an empty trial for the given position
    pub fn new(index: usize) -> Self {
        Self {
            index,
            timestamp: None,
            latency_before_ms: None,
            latency_during_ms: None,
            latency_after_ms: None,
            download_mbps: None,
            upload_mbps: None,
            grade: None,
        }
    }

    /// 1-based number used in user-facing labels
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Latency inflation under load, when both probes succeeded
    pub fn latency_delta_ms(&self) -> Option<f64> {
        match (self.latency_before_ms, self.latency_during_ms) {
            (Some(before), Some(during)) => Some(during - before),
            _ => None,
        }
    }

    /// Whether the speed test produced numbers for this trial
    pub fn has_throughput(&self) -> bool {
        self.download_mbps.is_some() && self.upload_mbps.is_some()
    }

    /// Timestamp rendered as wall-clock time
    pub fn timestamp_label(&self) -> Option<String> {
        self.timestamp.map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Label for chart axes and table headers: "Test N", plus the time when known
    pub fn label(&self) -> String {
        match self.timestamp_label() {
            Some(time) => format!("Test {} ({})", self.number(), time),
            None => format!("Test {}", self.number()),
        }
    }
}

/// All trials of one run, in index order.
///
/// Only the crate appends to a series; consumers get read-only views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialSeries {
    trials: Vec<Trial>,
}

impl TrialSeries {
    /// Create an empty series
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty series with room for `capacity` trials
    pub fn with_capacity(capacity: usize) -> Self {
        Self { trials: Vec::with_capacity(capacity) }
    }

    /// Append the next trial, re-indexing it to its position in the series
    pub(crate) fn push(&mut self, mut trial: Trial) {
        trial.index = self.trials.len();
        self.trials.push(trial);
    }

    /// All trials in index order
    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Trial> {
        self.trials.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trial> {
        self.trials.iter()
    }

    pub fn latencies_before(&self) -> Vec<Option<f64>> {
        self.column(|t| t.latency_before_ms)
    }

    pub fn latencies_during(&self) -> Vec<Option<f64>> {
        self.column(|t| t.latency_during_ms)
    }

    pub fn latencies_after(&self) -> Vec<Option<f64>> {
        self.column(|t| t.latency_after_ms)
    }

    pub fn download_speeds(&self) -> Vec<Option<f64>> {
        self.column(|t| t.download_mbps)
    }

    pub fn upload_speeds(&self) -> Vec<Option<f64>> {
        self.column(|t| t.upload_mbps)
    }

    /// One entry per trial; `None` where the speed test failed
    pub fn timestamps(&self) -> Vec<Option<DateTime<Local>>> {
        self.column(|t| t.timestamp)
    }

    /// One entry per trial; `None` renders as "N/A"
    pub fn grades(&self) -> Vec<Option<BufferbloatGrade>> {
        self.column(|t| t.grade)
    }

    fn column<T, F>(&self, f: F) -> Vec<T>
    where
        F: Fn(&Trial) -> T,
    {
        self.trials.iter().map(f).collect()
    }
}

impl<'a> IntoIterator for &'a TrialSeries {
    type Item = &'a Trial;
    type IntoIter = std::slice::Iter<'a, Trial>;

    fn into_iter(self) -> Self::IntoIter {
        self.trials.iter()
    }
}

impl FromIterator<Trial> for TrialSeries {
    /// Collect trials in order; indices are reassigned by position
    fn from_iter<I: IntoIterator<Item = Trial>>(iter: I) -> Self {
        let mut series = TrialSeries::new();
        for trial in iter {
            series.push(trial);
        }
        series
    }
}
