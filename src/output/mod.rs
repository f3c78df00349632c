//! Output formatting and display system
//!
//! This module renders finished runs: the trial table and summary for the
//! terminal (colored or plain), per-trial progress lines, the HTML chart and
//! the JSON report.

mod formatter;
mod colored;
mod chart;
mod export;

pub use formatter::{
    OutputFormatter,
    PlainFormatter,
    TableFormat,
    TableRow,
    FormattingOptions,
    Column,
    Alignment,
    RowData,
    MISSING_VALUE,
    format_optional,
    format_grade,
};
pub use colored::{
    ColoredFormatter,
    ColorScheme,
    grade_color,
};
pub use chart::{ChartRenderer, DEFAULT_CHART_TITLE};
pub use export::{ReportExporter, ReportSettings, RunReport};

use crate::{
    error::Result,
    executor::ExecutionResults,
    models::{Config, Trial},
    stats::RunSummary,
};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..Default::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }
}

/// Main output coordinator that handles all result display
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
    config: Config,
}

impl OutputCoordinator {
    /// Create a new output coordinator with the specified formatter
    pub fn new(formatter: Box<dyn OutputFormatter>, config: &Config) -> Self {
        Self {
            formatter,
            config: config.clone(),
        }
    }

    /// Create a coordinator whose formatter follows the configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            OutputFormatterFactory::create_formatter(config.enable_color, config.verbose),
            config,
        )
    }

    /// Formatter in use
    pub fn formatter(&self) -> &dyn OutputFormatter {
        self.formatter.as_ref()
    }

    /// Display complete run results
    pub fn display_results(&self, results: &ExecutionResults, summary: &RunSummary) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.formatter.format_header("Bufferbloat Test Results")?);
        output.push_str("\n\n");

        output.push_str(&self.formatter.format_execution_summary(results)?);
        output.push_str("\n\n");

        output.push_str(&self.formatter.format_trial_table(&results.series)?);
        output.push_str("\n\n");

        output.push_str(&self.formatter.format_summary(summary)?);

        Ok(output)
    }

    /// Display one completed trial during execution
    pub fn display_trial(&self, trial: &Trial) -> Result<String> {
        self.formatter.format_trial_progress(trial, self.config.trial_count)
    }

    /// Write the artifacts requested by the configuration.
    ///
    /// Returns one line per artifact: a success line when it was written, a
    /// warning line when it could not be. A failed write never discards the
    /// finished run.
    pub fn write_artifacts(&self, results: &ExecutionResults, summary: &RunSummary) -> Result<Vec<String>> {
        let mut lines = Vec::new();

        if let Some(path) = &self.config.chart_path {
            let line = match ChartRenderer::default().write_html(&results.series, path) {
                Ok(()) => self.formatter.format_success(&format!("Chart written to {}", path.display()))?,
                Err(e) => self.formatter.format_warning(&format!("Chart not written: {}", e))?,
            };
            lines.push(line);
        }

        if let Some(path) = &self.config.json_path {
            let report = RunReport::new(&self.config, results, summary);
            let line = match ReportExporter::write(&report, path) {
                Ok(()) => self.formatter.format_success(&format!("Report written to {}", path.display()))?,
                Err(e) => self.formatter.format_warning(&format!("Report not written: {}", e))?,
            };
            lines.push(line);
        }

        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrialSeries;
    use chrono::Local;
    use std::time::Duration;
    use tempfile::TempDir;

    fn results() -> ExecutionResults {
        let mut trial = Trial::new(0);
        trial.latency_before_ms = Some(10.0);
        trial.latency_during_ms = Some(15.0);
        ExecutionResults {
            series: std::iter::once(trial).collect::<TrialSeries>(),
            started_at: Local::now(),
            total_duration: Duration::from_millis(5500),
        }
    }

    fn plain_config() -> Config {
        Config { enable_color: false, trial_count: 1, ..Default::default() }
    }

    #[test]
    fn test_display_results_sections() {
        let coordinator = OutputCoordinator::from_config(&plain_config());
        let results = results();
        let text = coordinator.display_results(&results, &RunSummary::from_series(&results.series)).unwrap();

        assert!(text.contains("Bufferbloat Test Results"));
        assert!(text.contains("Duration:  5.50s"));
        assert!(text.contains("Latency during (ms)"));
        assert!(text.contains("Summary:"));
    }

    #[test]
    fn test_display_trial() {
        let coordinator = OutputCoordinator::from_config(&plain_config());
        let line = coordinator.display_trial(&results().series.trials()[0]).unwrap();
        assert!(line.starts_with("Test 1/1:"));
    }

    #[test]
    fn test_write_artifacts() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            chart_path: Some(dir.path().join("chart.html")),
            json_path: Some(dir.path().join("report.json")),
            ..plain_config()
        };
        let coordinator = OutputCoordinator::from_config(&config);
        let results = results();

        let written = coordinator.write_artifacts(&results, &RunSummary::from_series(&results.series)).unwrap();

        assert_eq!(written.len(), 2);
        assert!(dir.path().join("chart.html").exists());
        assert!(dir.path().join("report.json").exists());
    }

    #[test]
    fn test_unwritable_artifacts_become_warnings() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            chart_path: Some(dir.path().join("missing").join("chart.html")),
            json_path: Some(dir.path().join("report.json")),
            ..plain_config()
        };
        let coordinator = OutputCoordinator::from_config(&config);
        let results = results();

        let lines = coordinator.write_artifacts(&results, &RunSummary::from_series(&results.series)).unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Chart not written"));
        assert!(lines[1].contains("Report written to"));
        assert!(dir.path().join("report.json").exists());
    }

    #[test]
    fn test_no_artifacts_by_default() {
        let coordinator = OutputCoordinator::from_config(&plain_config());
        let results = results();
        let written = coordinator.write_artifacts(&results, &RunSummary::from_series(&results.series)).unwrap();
        assert!(written.is_empty());
    }
}
