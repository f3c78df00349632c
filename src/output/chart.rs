//! Two-panel HTML chart of a trial series
//!
//! The top panel plots download/upload throughput, the bottom panel the three
//! latency series. Missing values are emitted as `null` so the lines show gaps
//! instead of dropping to zero.

use crate::{
    error::{AppError, Result},
    models::TrialSeries,
};
use plotly::common::{Mode, Title};
use plotly::layout::{Axis, Layout};
use plotly::{Plot, Scatter};
use std::path::Path;

/// Default chart title
pub const DEFAULT_CHART_TITLE: &str = "Bufferbloat test results";

/// Builds plotly charts from finished runs
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    title: String,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CHART_TITLE)
    }
}

impl ChartRenderer {
    /// Create a renderer with a custom title
    pub fn new(title: &str) -> Self {
        Self { title: title.to_string() }
    }

    /// Build the plot for `series`
    pub fn build(&self, series: &TrialSeries) -> Plot {
        let labels: Vec<String> = series.iter().map(|t| t.label()).collect();
        let mut plot = Plot::new();

        let throughput = [
            ("Download (Mbps)", series.download_speeds()),
            ("Upload (Mbps)", series.upload_speeds()),
        ];
        for (name, values) in throughput {
            plot.add_trace(
                Scatter::new(labels.clone(), values)
                    .name(name)
                    .mode(Mode::LinesMarkers),
            );
        }

        let latency = [
            ("Latency before (ms)", series.latencies_before()),
            ("Latency during (ms)", series.latencies_during()),
            ("Latency after (ms)", series.latencies_after()),
        ];
        for (name, values) in latency {
            plot.add_trace(
                Scatter::new(labels.clone(), values)
                    .name(name)
                    .mode(Mode::LinesMarkers)
                    .x_axis("x2")
                    .y_axis("y2"),
            );
        }

        let layout = Layout::new()
            .title(Title::new(&self.title))
            .y_axis(Axis::new().title(Title::new("Throughput (Mbps)")).domain(&[0.55, 1.0]))
            .x_axis2(Axis::new().anchor("y2"))
            .y_axis2(Axis::new().title(Title::new("Latency (ms)")).domain(&[0.0, 0.45]));
        plot.set_layout(layout);

        plot
    }

    /// Render `series` as a standalone HTML document
    pub fn render_html(&self, series: &TrialSeries) -> String {
        self.build(series).to_html()
    }

    /// Write the chart for `series` to `path`
    pub fn write_html(&self, series: &TrialSeries, path: &Path) -> Result<()> {
        if series.is_empty() {
            return Err(AppError::render("Cannot chart a run without trials"));
        }

        std::fs::write(path, self.render_html(series))
            .map_err(|e| AppError::io(format!("Failed to write chart to {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Trial;
    use tempfile::TempDir;

    fn series() -> TrialSeries {
        let mut first = Trial::new(0);
        first.latency_before_ms = Some(12.5);
        first.download_mbps = Some(87.25);
        first.upload_mbps = Some(11.5);
        vec![first, Trial::new(1)].into_iter().collect()
    }

    #[test]
    fn test_build_has_five_traces() {
        let html = ChartRenderer::default().render_html(&series());
        for name in ["Download (Mbps)", "Upload (Mbps)", "Latency before (ms)", "Latency during (ms)", "Latency after (ms)"] {
            assert!(html.contains(name), "missing trace {}", name);
        }
        assert!(html.contains(DEFAULT_CHART_TITLE));
    }

    #[test]
    fn test_missing_values_become_null() {
        let html = ChartRenderer::default().render_html(&series());
        assert!(html.contains("null"));
        assert!(html.contains("87.25"));
    }

    #[test]
    fn test_write_html() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chart.html");

        ChartRenderer::new("Run").write_html(&series(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }

    #[test]
    fn test_write_empty_series_fails() {
        let dir = TempDir::new().unwrap();
        let err = ChartRenderer::default()
            .write_html(&TrialSeries::new(), &dir.path().join("chart.html"))
            .unwrap_err();
        assert_eq!(err.category(), "RENDER");
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let err = ChartRenderer::default()
            .write_html(&series(), &dir.path().join("missing").join("chart.html"))
            .unwrap_err();
        assert_eq!(err.category(), "IO");
    }
}
