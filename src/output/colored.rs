//! Colored formatter implementation with terminal color support
//!
//! This module provides a colored output formatter that uses ANSI colors
//! to highlight grades, missing values and section headers.

use crate::{
    error::{AppError, Result},
    executor::ExecutionResults,
    models::{Trial, TrialSeries},
    stats::RunSummary,
    types::{BufferbloatGrade, GRADE_NOT_APPLICABLE},
};
use super::formatter::{
    describe_distribution, describe_series, format_grade, progress_text, trial_table,
    FormattingOptions, OutputFormatter, PlainFormatter, TableRow, MISSING_VALUE,
};
use std::fmt::Write as _;
use colored::*;

/// Terminal color for a grade, green for S through red for F
pub fn grade_color(grade: BufferbloatGrade) -> Color {
    match grade {
        BufferbloatGrade::S => Color::BrightGreen,
        BufferbloatGrade::A => Color::Green,
        BufferbloatGrade::B => Color::Cyan,
        BufferbloatGrade::C => Color::Yellow,
        BufferbloatGrade::D => Color::Magenta,
        BufferbloatGrade::F => Color::Red,
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub highlight: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            highlight: Color::Magenta,
            muted: Color::BrightBlack,
            border: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        let plain_formatter = PlainFormatter::new(options.clone());
        Self {
            plain_formatter,
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    /// Apply bold formatting if colors are enabled
    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Apply dimmed formatting if colors are enabled
    fn dimmed(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.dimmed()
        } else {
            text.normal()
        }
    }

    /// Apply bold color if colors are enabled
    fn bold_colored(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.bold().color(color)
        } else {
            text.normal()
        }
    }

    /// Grade text in its grade color, dimmed `N/A` when missing
    fn grade_colored(&self, grade: Option<BufferbloatGrade>) -> ColoredString {
        match grade {
            Some(grade) => self.bold_colored(grade.as_str(), grade_color(grade)),
            None => self.dimmed(GRADE_NOT_APPLICABLE),
        }
    }

    /// Create a colored section header
    fn create_section_header(&self, title: &str) -> String {
        self.bold_colored(title, self.color_scheme.header).to_string()
    }

    /// Style one padded table cell
    fn style_cell(&self, series: &TrialSeries, row_idx: Option<usize>, col_idx: usize, cell: String) -> String {
        let row = match row_idx {
            None => return self.bold(&cell).to_string(),
            Some(idx) => TableRow::ALL.get(idx).copied(),
        };

        if col_idx == 0 {
            return self.colorize(&cell, self.color_scheme.info).to_string();
        }

        if cell.trim() == MISSING_VALUE || cell.trim() == GRADE_NOT_APPLICABLE {
            return self.dimmed(&cell).to_string();
        }

        match row {
            Some(TableRow::Grade) => match series.get(col_idx - 1).and_then(|t| t.grade) {
                Some(grade) => self.bold_colored(&cell, grade_color(grade)).to_string(),
                None => cell,
            },
            Some(TableRow::Time) => self.colorize(&cell, self.color_scheme.muted).to_string(),
            _ => cell,
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.len() + 4);

        writeln!(output, "{}", self.colorize(&border, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        writeln!(output, "  {}  ", self.bold_colored(title, self.color_scheme.header))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        write!(output, "{}", self.colorize(&border, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;

        Ok(output)
    }

    fn format_execution_summary(&self, results: &ExecutionResults) -> Result<String> {
        let mut output = String::new();
        let duration = PlainFormatter::format_duration(results.total_duration.as_secs_f64() * 1000.0);

        writeln!(output, "Started:   {}",
            self.dimmed(&results.started_at.format("%Y-%m-%d %H:%M:%S").to_string()))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        write!(output, "Duration:  {}", self.colorize(&duration, self.color_scheme.info))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;

        Ok(output)
    }

    fn format_trial_table(&self, series: &TrialSeries) -> Result<String> {
        if series.is_empty() {
            return Ok(self.colorize("No trials were run.", self.color_scheme.muted).to_string());
        }

        let (format, rows) = trial_table(series, &self.options);
        self.plain_formatter.create_styled_table(&format, &rows, &|row, col, cell| {
            self.style_cell(series, row, col, cell)
        })
    }

    fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        let mut output = String::new();

        let completion = PlainFormatter::format_percentage(summary.completion_rate());
        let completion_color = if summary.complete_trials == summary.trials {
            self.color_scheme.success
        } else {
            self.color_scheme.warning
        };

        writeln!(output, "{}", self.create_section_header("Summary"))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Trials:          {} ({} complete, {})",
            self.colorize(&summary.trials.to_string(), self.color_scheme.info),
            summary.complete_trials,
            self.colorize(&completion, completion_color))
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
            writeln!(output, "Mean inflation:  {}",
                self.colorize(&format!("{:+.2} ms", mean), grade_color(BufferbloatGrade::from_delta(mean))))
                .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }

        if self.options.verbose_mode {
            if let (Some(median), Some(std_dev)) = (summary.inflation.median, summary.inflation.std_dev) {
                writeln!(output, "Inflation:       median {:+.2} ms, std dev {:.2} ms", median, std_dev)
                    .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
            }
        }

        let overall = match summary.overall_grade {
            Some(grade) => format!("{} ({})", self.grade_colored(Some(grade)), grade.description()),
            None => self.dimmed(GRADE_NOT_APPLICABLE).to_string(),
        };
        writeln!(output, "Overall grade:   {}", overall)
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        writeln!(output, "Worst grade:     {}", self.grade_colored(summary.worst_grade))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        write!(output, "Grades:          {}", self.dimmed(&describe_distribution(summary)))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;

        Ok(output)
    }

    fn format_trial_progress(&self, trial: &Trial, total: u32) -> Result<String> {
        if !self.options.enable_color {
            return Ok(progress_text(trial, total));
        }

        let text = progress_text(trial, total);
        let grade = format_grade(trial.grade);
        let (body, _) = text.split_at(text.len() - grade.len());

        Ok(format!("{}{}", body, self.grade_colored(trial.grade)))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.bold_colored("Error:", self.color_scheme.error), self.colorize(error, self.color_scheme.error)))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.bold_colored("Warning:", self.color_scheme.warning), self.colorize(warning, self.color_scheme.warning)))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(self.colorize(message, self.color_scheme.success).to_string())
    }
}

/// Helper functions for color management
impl ColoredFormatter {
    /// Check if terminal supports colors
    pub fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() &&
        std::env::var("TERM").map(|term| term != "dumb").unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> TrialSeries {
        let mut trial = Trial::new(0);
        trial.latency_before_ms = Some(20.0);
        trial.latency_during_ms = Some(55.0);
        trial.grade = Some(BufferbloatGrade::B);
        vec![trial, Trial::new(1)].into_iter().collect()
    }

    fn uncolored() -> ColoredFormatter {
        ColoredFormatter::new(FormattingOptions { enable_color: false, ..Default::default() })
    }

    #[test]
    fn test_grade_colors_are_distinct() {
        let colors: Vec<Color> = BufferbloatGrade::ALL.iter().map(|g| grade_color(*g)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_uncolored_table_matches_plain() {
        let options = FormattingOptions { enable_color: false, ..Default::default() };
        let plain = PlainFormatter::new(options.clone()).format_trial_table(&series()).unwrap();
        let colored = ColoredFormatter::new(options).format_trial_table(&series()).unwrap();
        assert_eq!(plain, colored);
    }

    #[test]
    fn test_colored_table_keeps_structure() {
        let formatter = ColoredFormatter::new(FormattingOptions::default());
        let table = formatter.format_trial_table(&series()).unwrap();

        assert_eq!(table.lines().count(), 11);
        assert!(table.contains("Bufferbloat"));
        assert!(table.contains("N/A"));
    }

    #[test]
    fn test_progress_without_color() {
        let series = series();
        let line = uncolored().format_trial_progress(&series.trials()[0], 2).unwrap();
        assert!(line.starts_with("Test 1/2: before 20.00 ms, during 55.00 ms"));
        assert!(line.ends_with("grade B"));
    }

    #[test]
    fn test_summary_without_color() {
        let summary = RunSummary::from_series(&series());
        let text = uncolored().format_summary(&summary).unwrap();
        assert!(text.contains("Mean inflation:  +35.00 ms"));
        assert!(text.contains("Worst grade:     B"));
    }

    #[test]
    fn test_messages_without_color() {
        assert_eq!(uncolored().format_error("boom").unwrap(), "Error: boom");
        assert_eq!(uncolored().format_warning("careful").unwrap(), "Warning: careful");
    }
}
