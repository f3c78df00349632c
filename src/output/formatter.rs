//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation with table formatting capabilities.

use crate::{
    error::{AppError, Result},
    executor::ExecutionResults,
    models::{Trial, TrialSeries},
    stats::{RunSummary, SeriesSummary},
    types::{BufferbloatGrade, GRADE_NOT_APPLICABLE},
};
use std::fmt::Write as _;

/// Placeholder for a missing measurement
pub const MISSING_VALUE: &str = "-";

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format run timing and settings
    fn format_execution_summary(&self, results: &ExecutionResults) -> Result<String>;

    /// Format the trial table (one row per measurement kind, one column per trial)
    fn format_trial_table(&self, series: &TrialSeries) -> Result<String>;

    /// Format the aggregate summary
    fn format_summary(&self, summary: &RunSummary) -> Result<String>;

    /// Format one completed trial for progress output
    fn format_trial_progress(&self, trial: &Trial, total: u32) -> Result<String>;

    /// Format error messages
    fn format_error(&self, error: &str) -> Result<String>;

    /// Format warning messages
    fn format_warning(&self, warning: &str) -> Result<String>;

    /// Format success messages
    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Enable verbose mode with detailed information
    pub verbose_mode: bool,
    /// Show table borders
    pub table_borders: bool,
    /// Maximum width of a single table column
    pub max_column_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
            max_column_width: 32,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Show borders around table
    pub show_borders: bool,
    /// Show header row
    pub show_header: bool,
    /// Minimum column width
    pub min_column_width: usize,
    /// Maximum column width
    pub max_column_width: usize,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    /// Column header
    pub header: String,
    /// Column alignment
    pub alignment: Alignment,
    /// Minimum width
    pub min_width: usize,
    /// Maximum width
    pub max_width: usize,
}

/// Text alignment options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Kind of value a trial-table row carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRow {
    Time,
    Download,
    Upload,
    LatencyBefore,
    LatencyDuring,
    LatencyAfter,
    Grade,
}

impl TableRow {
    /// Rows in display order
    pub const ALL: [TableRow; 7] = [
        TableRow::Time,
        TableRow::Download,
        TableRow::Upload,
        TableRow::LatencyBefore,
        TableRow::LatencyDuring,
        TableRow::LatencyAfter,
        TableRow::Grade,
    ];

    /// Row label shown in the first column
    pub fn label(&self) -> &'static str {
        match self {
            TableRow::Time => "Time",
            TableRow::Download => "Download (Mbps)",
            TableRow::Upload => "Upload (Mbps)",
            TableRow::LatencyBefore => "Latency before (ms)",
            TableRow::LatencyDuring => "Latency during (ms)",
            TableRow::LatencyAfter => "Latency after (ms)",
            TableRow::Grade => "Bufferbloat",
        }
    }

    /// Plain text of this row's cell for `trial`
    pub fn cell(&self, trial: &Trial) -> String {
        match self {
            TableRow::Time => trial.timestamp_label().unwrap_or_else(|| MISSING_VALUE.to_string()),
            TableRow::Download => format_optional(trial.download_mbps),
            TableRow::Upload => format_optional(trial.upload_mbps),
            TableRow::LatencyBefore => format_optional(trial.latency_before_ms),
            TableRow::LatencyDuring => format_optional(trial.latency_during_ms),
            TableRow::LatencyAfter => format_optional(trial.latency_after_ms),
            TableRow::Grade => format_grade(trial.grade),
        }
    }
}

/// Render an optional measurement with two decimals, or the missing marker
pub fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| MISSING_VALUE.to_string())
}

/// Render an optional grade, `N/A` when missing
pub fn format_grade(grade: Option<BufferbloatGrade>) -> String {
    grade
        .map(|g| g.as_str().to_string())
        .unwrap_or_else(|| GRADE_NOT_APPLICABLE.to_string())
}

/// Table layout and plain rows for a trial series
pub(crate) fn trial_table(series: &TrialSeries, options: &FormattingOptions) -> (TableFormat, Vec<RowData>) {
    let mut columns = vec![Column {
        header: "Metric".to_string(),
        alignment: Alignment::Left,
        min_width: 6,
        max_width: 24,
    }];
    columns.extend(series.iter().map(|trial| Column {
        header: format!("Test {}", trial.number()),
        alignment: Alignment::Right,
        min_width: 8,
        max_width: options.max_column_width,
    }));

    let rows = TableRow::ALL
        .iter()
        .map(|row| {
            let mut data = vec![row.label().to_string()];
            data.extend(series.iter().map(|trial| row.cell(trial)));
            data
        })
        .collect();

    let format = TableFormat {
        columns,
        show_borders: options.table_borders,
        show_header: true,
        min_column_width: 6,
        max_column_width: options.max_column_width,
    };

    (format, rows)
}

/// Render a column summary like `min 10.00 / mean 12.50 / max 15.00 ms`
pub fn describe_series(summary: &SeriesSummary, unit: &str) -> String {
    match (summary.min, summary.mean, summary.max) {
        (Some(min), Some(mean), Some(max)) => {
            let mut text = format!("min {:.2} / mean {:.2} / max {:.2} {}", min, mean, max, unit);
            if summary.missing > 0 {
                text.push_str(&format!(" ({} missing)", summary.missing));
            }
            text
        }
        _ => format!("no samples ({} missing)", summary.missing),
    }
}

/// Render the per-grade counts, ending with the ungraded count
pub fn describe_distribution(summary: &RunSummary) -> String {
    let mut parts: Vec<String> = BufferbloatGrade::ALL
        .iter()
        .map(|g| format!("{}:{}", g, summary.grade_count(*g)))
        .collect();
    parts.push(format!("{}:{}", GRADE_NOT_APPLICABLE, summary.ungraded_trials));
    parts.join(" ")
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    /// Create a table with the given format and data
    fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> Result<String> {
        self.create_styled_table(format, rows, &|_, _, cell| cell)
    }

    /// Create a table, passing every padded cell through `style`.
    ///
    /// `style` receives the row index (`None` for the header), the column index
    /// and the padded cell text. Widths are computed on unstyled text so
    /// escape sequences never break the alignment.
    pub(crate) fn create_styled_table(
        &self,
        format: &TableFormat,
        rows: &[RowData],
        style: &dyn Fn(Option<usize>, usize, String) -> String,
    ) -> Result<String> {
        if rows.is_empty() {
            return Ok(String::new());
        }

        let column_widths = self.calculate_column_widths(format, rows);

        let mut output = String::new();

        if format.show_header && !format.columns.is_empty() {
            if format.show_borders {
                writeln!(output, "{}", self.create_horizontal_border(&column_widths))
                    .map_err(|e| AppError::io(format!("Failed to format table: {}", e)))?;
            }

            let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
            writeln!(output, "{}", self.create_row(&headers, &column_widths, format, None, style))
                .map_err(|e| AppError::io(format!("Failed to format table: {}", e)))?;

            if format.show_borders {
                writeln!(output, "{}", self.create_horizontal_border(&column_widths))
                    .map_err(|e| AppError::io(format!("Failed to format table: {}", e)))?;
            }
        }

        for (idx, row) in rows.iter().enumerate() {
            writeln!(output, "{}", self.create_row(row, &column_widths, format, Some(idx), style))
                .map_err(|e| AppError::io(format!("Failed to format table: {}", e)))?;
        }

        if format.show_borders {
            write!(output, "{}", self.create_horizontal_border(&column_widths))
                .map_err(|e| AppError::io(format!("Failed to format table: {}", e)))?;
        }

        Ok(output)
    }

    /// Calculate optimal column widths
    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        let num_columns = format.columns.len().max(
            rows.iter().map(|r| r.len()).max().unwrap_or(0)
        );

        (0..num_columns)
            .map(|col_idx| {
                let column = format.columns.get(col_idx);
                let mut width = column
                    .map(|c| c.min_width.max(c.header.chars().count()))
                    .unwrap_or(format.min_column_width);

                for row in rows {
                    if let Some(cell) = row.get(col_idx) {
                        width = width.max(cell.chars().count());
                    }
                }

                width.min(column.map(|c| c.max_width).unwrap_or(format.max_column_width))
            })
            .collect()
    }

    /// Create a table row
    fn create_row(
        &self,
        data: &[String],
        widths: &[usize],
        format: &TableFormat,
        row_idx: Option<usize>,
        style: &dyn Fn(Option<usize>, usize, String) -> String,
    ) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format.columns.get(idx).map(|c| c.alignment).unwrap_or(Alignment::Left);
            let padded_cell = style(row_idx, idx, self.align_text(cell, width, alignment));

            if format.show_borders {
                row.push(' ');
            }
            row.push_str(&padded_cell);
            if format.show_borders {
                row.push_str(" |");
            } else {
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    /// Create horizontal border for table
    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::new();

        if !widths.is_empty() {
            border.push('+');
            for &width in widths {
                border.push_str(&"-".repeat(width + 2));
                border.push('+');
            }
        }

        border
    }

    /// Align text within specified width
    fn align_text(&self, text: &str, width: usize, alignment: Alignment) -> String {
        let len = text.chars().count();
        if len >= width {
            return text.chars().take(width).collect();
        }

        let padding = width - len;
        match alignment {
            Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
            Alignment::Right => format!("{}{}", " ".repeat(padding), text),
            Alignment::Center => {
                let left_pad = padding / 2;
                let right_pad = padding - left_pad;
                format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
            }
        }
    }

    /// Format duration in human-readable format
    pub(crate) fn format_duration(duration_ms: f64) -> String {
        if duration_ms < 1000.0 {
            format!("{:.0}ms", duration_ms)
        } else if duration_ms < 60000.0 {
            format!("{:.2}s", duration_ms / 1000.0)
        } else {
            let minutes = (duration_ms / 60000.0) as u32;
            let seconds = (duration_ms % 60000.0) / 1000.0;
            format!("{}m{:.1}s", minutes, seconds)
        }
    }

    /// Format percentage with appropriate precision
    pub(crate) fn format_percentage(percentage: f64) -> String {
        if percentage >= 99.95 {
            "100.0%".to_string()
        } else if percentage < 0.05 {
            "0.0%".to_string()
        } else {
            format!("{:.1}%", percentage)
        }
    }
}

/// One-line description of a completed trial
pub(crate) fn progress_text(trial: &Trial, total: u32) -> String {
    let throughput = match (trial.download_mbps, trial.upload_mbps) {
        (Some(down), Some(up)) => format!("down {:.2} Mbps, up {:.2} Mbps", down, up),
        _ => "speed test failed".to_string(),
    };

    format!(
        "Test {}/{}: before {} ms, during {} ms, after {} ms | {} | grade {}",
        trial.number(),
        total,
        format_optional(trial.latency_before_ms),
        format_optional(trial.latency_during_ms),
        format_optional(trial.latency_after_ms),
        throughput,
        format_grade(trial.grade),
    )
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.len() + 4);

        writeln!(output, "{}", border)
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        writeln!(output, "  {}  ", title)
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        write!(output, "{}", border)
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;

        Ok(output)
    }

    fn format_execution_summary(&self, results: &ExecutionResults) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Started:   {}", results.started_at.format("%Y-%m-%d %H:%M:%S"))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        write!(output, "Duration:  {}", Self::format_duration(results.total_duration.as_secs_f64() * 1000.0))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;

        Ok(output)
    }

    fn format_trial_table(&self, series: &TrialSeries) -> Result<String> {
        if series.is_empty() {
            return Ok("No trials were run.".to_string());
        }

        let (format, rows) = trial_table(series, &self.options);
        self.create_table(&format, &rows)
    }

    fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Summary:")
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "--------")
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Trials:          {} ({} complete, {})",
            summary.trials, summary.complete_trials, Self::format_percentage(summary.completion_rate()))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Download:        {}", describe_series(&summary.download, "Mbps"))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Upload:          {}", describe_series(&summary.upload, "Mbps"))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Latency before:  {}", describe_series(&summary.latency_before, "ms"))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Latency during:  {}", describe_series(&summary.latency_during, "ms"))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Latency after:   {}", describe_series(&summary.latency_after, "ms"))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;

        if let Some(mean) = summary.inflation.mean {
            writeln!(output, "Mean inflation:  {:+.2} ms", mean)
                .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }

        if self.options.verbose_mode {
            if let (Some(median), Some(std_dev)) = (summary.inflation.median, summary.inflation.std_dev) {
                writeln!(output, "Inflation:       median {:+.2} ms, std dev {:.2} ms", median, std_dev)
                    .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
            }
        }

        let overall = match summary.overall_grade {
            Some(grade) => format!("{} ({})", grade, grade.description()),
            None => GRADE_NOT_APPLICABLE.to_string(),
        };
        writeln!(output, "Overall grade:   {}", overall)
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;

        writeln!(output, "Worst grade:     {}", format_grade(summary.worst_grade))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        write!(output, "Grades:          {}", describe_distribution(summary))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;

        Ok(output)
    }

    fn format_trial_progress(&self, trial: &Trial, total: u32) -> Result<String> {
        Ok(progress_text(trial, total))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("SUCCESS: {}", message))
    }
}
