//! Statistical summaries over a finished trial series
//!
//! Missing values are skipped, never counted as zero. A column without any
//! sample has no min/max/mean at all.

use crate::{
    models::TrialSeries,
    types::BufferbloatGrade,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one optional-valued column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Number of present values
    pub samples: usize,
    /// Number of missing values
    pub missing: usize,
    /// Smallest present value
    pub min: Option<f64>,
    /// Largest present value
    pub max: Option<f64>,
    /// Arithmetic mean of present values
    pub mean: Option<f64>,
    /// Median of present values
    pub median: Option<f64>,
    /// Population standard deviation of present values
    pub std_dev: Option<f64>,
}

impl SeriesSummary {
    /// Summarise a column, skipping missing entries
    pub fn from_values(values: &[Option<f64>]) -> Self {
        let mut present: Vec<f64> = values.iter().flatten().copied().collect();
        let missing = values.len() - present.len();

        if present.is_empty() {
            return Self {
                samples: 0,
                missing,
                min: None,
                max: None,
                mean: None,
                median: None,
                std_dev: None,
            };
        }

        present.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = present.len() as f64;
        let mean = present.iter().sum::<f64>() / count;
        let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;

        Self {
            samples: present.len(),
            missing,
            min: present.first().copied(),
            max: present.last().copied(),
            mean: Some(mean),
            median: Some(percentile(&present, 50.0)),
            std_dev: Some(variance.sqrt()),
        }
    }

    /// Spread between the largest and smallest value
    pub fn range(&self) -> Option<f64> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some(max - min),
            _ => None,
        }
    }
}

/// Linear-interpolated percentile over sorted values
pub fn percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let index = (percentile / 100.0) * (sorted_values.len() as f64 - 1.0);
    let lower_index = index.floor() as usize;
    let upper_index = index.ceil() as usize;

    if lower_index == upper_index {
        sorted_values[lower_index]
    } else {
        let lower_value = sorted_values[lower_index];
        let upper_value = sorted_values[upper_index];
        let weight = index - lower_index as f64;
        lower_value + weight * (upper_value - lower_value)
    }
}

/// Aggregate view of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Trials in the run
    pub trials: usize,
    /// Trials with every value present
    pub complete_trials: usize,
    /// Idle latency column
    pub latency_before: SeriesSummary,
    /// Loaded latency column
    pub latency_during: SeriesSummary,
    /// Recovered latency column
    pub latency_after: SeriesSummary,
    /// Download column
    pub download: SeriesSummary,
    /// Upload column
    pub upload: SeriesSummary,
    /// Latency inflation (during - before) over graded trials
    pub inflation: SeriesSummary,
    /// Grade of the mean inflation
    pub overall_grade: Option<BufferbloatGrade>,
    /// Best grade seen
    pub best_grade: Option<BufferbloatGrade>,
    /// Worst grade seen
    pub worst_grade: Option<BufferbloatGrade>,
    /// Count of trials per grade, every grade present
    pub grade_distribution: BTreeMap<BufferbloatGrade, usize>,
    /// Trials without a grade
    pub ungraded_trials: usize,
    /// When this summary was computed
    pub generated_at: DateTime<Utc>,
}

impl RunSummary {
    /// Summarise a finished series
    pub fn from_series(series: &TrialSeries) -> Self {
        let grades = series.grades();
        let inflation: Vec<Option<f64>> = series.iter().map(|t| t.latency_delta_ms()).collect();

        let mut grade_distribution: BTreeMap<BufferbloatGrade, usize> =
            BufferbloatGrade::ALL.iter().map(|g| (*g, 0)).collect();
        for grade in grades.iter().flatten() {
            *grade_distribution.entry(*grade).or_insert(0) += 1;
        }

        let complete_trials = series
            .iter()
            .filter(|t| {
                t.latency_before_ms.is_some()
                    && t.latency_during_ms.is_some()
                    && t.latency_after_ms.is_some()
                    && t.has_throughput()
            })
            .count();

        let inflation = SeriesSummary::from_values(&inflation);
        let overall_grade = inflation.mean.map(BufferbloatGrade::from_delta);

        Self {
            trials: series.len(),
            complete_trials,
            latency_before: SeriesSummary::from_values(&series.latencies_before()),
            latency_during: SeriesSummary::from_values(&series.latencies_during()),
            latency_after: SeriesSummary::from_values(&series.latencies_after()),
            download: SeriesSummary::from_values(&series.download_speeds()),
            upload: SeriesSummary::from_values(&series.upload_speeds()),
            inflation,
            overall_grade,
            best_grade: grades.iter().flatten().min().copied(),
            worst_grade: grades.iter().flatten().max().copied(),
            grade_distribution,
            ungraded_trials: grades.iter().filter(|g| g.is_none()).count(),
            generated_at: Utc::now(),
        }
    }

    /// Fraction of trials with every value present, in percent
    pub fn completion_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.complete_trials as f64 / self.trials as f64 * 100.0
        }
    }

    /// Trials that received `grade`
    pub fn grade_count(&self, grade: BufferbloatGrade) -> usize {
        self.grade_distribution.get(&grade).copied().unwrap_or(0)
    }
}
