//! Output format validation for the terminal table, summary and JSON report

use bufferbloat_tester::{
    executor::ExecutionResults,
    output::{FormattingOptions, OutputFormatter, PlainFormatter, ReportExporter, RunReport},
    BufferbloatGrade, Config, RunSummary, Trial, TrialSeries,
};
use chrono::Local;
use regex::Regex;
use serde_json::Value;
use std::time::Duration;

/// Validation patterns for the rendered output
struct OutputPatterns {
    /// Border line such as `+--------+-------+`
    pub border: Regex,
    /// Two-decimal measurement cells
    pub measurement: Regex,
    /// Wall-clock timestamp cells
    pub time: Regex,
    /// Grade cells, including the missing marker
    pub grade: Regex,
}

impl Default for OutputPatterns {
    fn default() -> Self {
        Self {
            border: Regex::new(r"^\+(-+\+)+$").unwrap(),
            measurement: Regex::new(r"\|\s+\d+\.\d{2} \|").unwrap(),
            time: Regex::new(r"\d{2}:\d{2}:\d{2}").unwrap(),
            grade: Regex::new(r"^\| Bufferbloat\s+\|(\s+(S|A|B|C|D|F|N/A) \|)+$").unwrap(),
        }
    }
}

fn sample_series() -> TrialSeries {
    let mut first = Trial::new(0);
    first.timestamp = Some(Local::now());
    first.download_mbps = Some(94.25);
    first.upload_mbps = Some(18.5);
    first.latency_before_ms = Some(12.0);
    first.latency_during_ms = Some(48.0);
    first.latency_after_ms = Some(13.0);
    first.grade = BufferbloatGrade::for_latencies(first.latency_before_ms, first.latency_during_ms);

    let mut second = Trial::new(1);
    second.latency_before_ms = Some(11.0);
    second.latency_after_ms = Some(12.0);

    vec![first, second].into_iter().collect()
}

fn formatter() -> PlainFormatter {
    PlainFormatter::new(FormattingOptions { enable_color: false, ..Default::default() })
}

#[test]
fn test_table_structure() {
    let patterns = OutputPatterns::default();
    let table = formatter().format_trial_table(&sample_series()).unwrap();
    let lines: Vec<&str> = table.lines().collect();

    // border, header, border, seven rows, border
    assert_eq!(lines.len(), 11);
    for idx in [0, 2, 10] {
        assert!(patterns.border.is_match(lines[idx]), "not a border: {}", lines[idx]);
    }

    let width = lines[0].chars().count();
    assert!(lines.iter().all(|l| l.chars().count() == width), "ragged table:\n{}", table);

    assert!(lines[1].contains("Metric"));
    assert!(lines[1].contains("Test 1"));
    assert!(lines[1].contains("Test 2"));
}

#[test]
fn test_table_rows_in_order() {
    let table = formatter().format_trial_table(&sample_series()).unwrap();
    let labels: Vec<String> = table
        .lines()
        .skip(3)
        .take(7)
        .map(|l| l.trim_start_matches('|').split('|').next().unwrap_or("").trim().to_string())
        .collect();

    assert_eq!(
        labels,
        vec![
            "Time",
            "Download (Mbps)",
            "Upload (Mbps)",
            "Latency before (ms)",
            "Latency during (ms)",
            "Latency after (ms)",
            "Bufferbloat",
        ]
    );
}

#[test]
fn test_table_cell_formats() {
    let patterns = OutputPatterns::default();
    let table = formatter().format_trial_table(&sample_series()).unwrap();

    let time_row = table.lines().find(|l| l.starts_with("| Time")).unwrap();
    assert!(patterns.time.is_match(time_row));

    let download_row = table.lines().find(|l| l.starts_with("| Download")).unwrap();
    assert!(patterns.measurement.is_match(download_row));
    assert!(download_row.contains("94.25"));
    assert!(download_row.trim_end().ends_with("- |"));

    let grade_row = table.lines().find(|l| l.starts_with("| Bufferbloat")).unwrap();
    assert!(patterns.grade.is_match(grade_row), "bad grade row: {}", grade_row);
    assert!(grade_row.contains(" B |"));
    assert!(grade_row.contains(" N/A |"));
}

#[test]
fn test_summary_lines() {
    let summary = RunSummary::from_series(&sample_series());
    let text = formatter().format_summary(&summary).unwrap();

    assert!(text.starts_with("Summary:"));
    assert!(text.contains("Trials:          2 (1 complete"));
    assert!(text.contains("Mean inflation:  +36.00 ms"));
    assert!(Regex::new(r"Latency before:\s+min 11\.00 / mean 11\.50 / max 12\.00 ms").unwrap().is_match(&text));
}

#[test]
fn test_json_report_shape() {
    let series = sample_series();
    let results = ExecutionResults {
        series: series.clone(),
        started_at: Local::now(),
        total_duration: Duration::from_secs(12),
    };
    let summary = RunSummary::from_series(&series);
    let report = RunReport::new(&Config::default(), &results, &summary);

    let json: Value = serde_json::from_str(&ReportExporter::to_json(&report).unwrap()).unwrap();

    assert_eq!(json["trials"].as_array().unwrap().len(), 2);
    assert_eq!(json["trials"][0]["grade"], "B");
    assert!(json["trials"][1]["grade"].is_null());
    assert!(json["trials"][1]["latency_during_ms"].is_null());
    assert_eq!(json["settings"]["ping_host"], "8.8.8.8");
    assert!(json["summary"].is_object());
}
