//! Command-line interface module with topic help

pub mod help;

pub use help::HelpSystem;

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Version line shown by `--version`, stamped with build metadata
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_TIME"),
    " for ",
    env!("TARGET_TRIPLE"),
    ")"
);

/// Bufferbloat Tester - measure latency inflation under load
#[derive(Parser, Debug, Clone)]
#[command(name = "bbt")]
#[command(version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// Number of trials to run (1-100)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub trials: Option<u32>,

    /// Seconds to wait between the loaded probe and the after probe
    #[arg(short, long, value_parser = parse_interval)]
    pub interval: Option<f64>,

    /// Host to ping for latency probes
    #[arg(long, value_name = "HOST", allow_hyphen_values = true)]
    pub host: Option<String>,

    /// Echo requests per ping invocation
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub ping_count: Option<u32>,

    /// Speed-test server base URL (can be used multiple times)
    #[arg(long = "server", value_name = "URL", action = ArgAction::Append)]
    pub servers: Vec<String>,

    /// Bytes requested by each download test
    #[arg(long, value_name = "BYTES")]
    pub download_bytes: Option<u64>,

    /// Bytes sent by each upload test
    #[arg(long, value_name = "BYTES")]
    pub upload_bytes: Option<u64>,

    /// Speed-test request timeout in seconds
    #[arg(short, long, value_parser = parse_timeout)]
    pub timeout: Option<u64>,

    /// Write an HTML chart of the run to this path
    #[arg(long, value_name = "PATH")]
    pub chart: Option<PathBuf>,

    /// Write a JSON report of the run to this path
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Show help for specific topic (grades, config, output)
    #[arg(long, value_name = "TOPIC")]
    pub help_topic: Option<String>,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if let Some(ref host) = self.host {
            crate::models::config::validate_ping_host(host).map_err(rule_message)?;
        }

        for server in &self.servers {
            crate::models::config::validate_server_url(server).map_err(rule_message)?;
        }

        Ok(())
    }

    /// Check if help should be displayed for a specific topic
    pub fn should_show_topic_help(&self) -> bool {
        self.help_topic.is_some()
    }

    /// Get the help topic if specified
    pub fn get_help_topic(&self) -> Option<&str> {
        self.help_topic.as_deref()
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }

    /// Display help for the specified topic or main help
    pub fn display_help(&self) -> String {
        let help_system = HelpSystem::new();
        let use_colors = self.use_colors();

        if let Some(topic) = self.get_help_topic() {
            help_system.display_topic_help(topic, use_colors)
                .unwrap_or_else(|| {
                    format!("Unknown help topic: '{}'\n\nAvailable topics: {}\n\n{}",
                        topic, help::HELP_TOPICS.join(", "), help_system.display_main_help(use_colors))
                })
        } else {
            help_system.display_main_help(use_colors)
        }
    }

    /// Summary of the options given on the command line
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Command Line Overrides:\n");
        if let Some(trials) = self.trials {
            summary.push_str(&format!("  Trials: {}\n", trials));
        }
        if let Some(interval) = self.interval {
            summary.push_str(&format!("  Interval: {}s\n", interval));
        }
        if let Some(ref host) = self.host {
            summary.push_str(&format!("  Ping host: {}\n", host));
        }
        if let Some(count) = self.ping_count {
            summary.push_str(&format!("  Ping count: {}\n", count));
        }
        if !self.servers.is_empty() {
            summary.push_str(&format!("  Speed servers: {}\n", self.servers.join(", ")));
        }
        if let Some(bytes) = self.download_bytes {
            summary.push_str(&format!("  Download bytes: {}\n", bytes));
        }
        if let Some(bytes) = self.upload_bytes {
            summary.push_str(&format!("  Upload bytes: {}\n", bytes));
        }
        if let Some(timeout) = self.timeout {
            summary.push_str(&format!("  Timeout: {}s\n", timeout));
        }
        if let Some(ref chart) = self.chart {
            summary.push_str(&format!("  Chart: {}\n", chart.display()));
        }
        if let Some(ref json) = self.json {
            summary.push_str(&format!("  JSON report: {}\n", json.display()));
        }
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        summary
    }
}

/// Message of a shared config rule without the category prefix
fn rule_message(error: crate::error::AppError) -> String {
    match error {
        crate::error::AppError::Config(message) => message,
        other => other.to_string(),
    }
}

/// Parse the recovery interval in (possibly fractional) seconds
fn parse_interval(s: &str) -> Result<f64, String> {
    let secs: f64 = s.trim().parse()
        .map_err(|_| format!("Invalid interval: {}", s))?;

    if !secs.is_finite() || secs < 0.0 {
        Err("Interval must be a non-negative number of seconds".to_string())
    } else if secs > crate::models::config::MAX_INTERVAL_SECONDS {
        Err(format!("Interval cannot exceed {} seconds", crate::models::config::MAX_INTERVAL_SECONDS))
    } else {
        Ok(secs)
    }
}

/// Parse timeout from seconds string
fn parse_timeout(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid timeout: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid timeout: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Timeout must be greater than 0".to_string())
            } else if secs > crate::models::config::MAX_TIMEOUT_SECONDS {
                Err(format!("Timeout cannot exceed {} seconds", crate::models::config::MAX_TIMEOUT_SECONDS))
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing_defaults_are_unset() {
        let cli = Cli::parse_from(["bbt"]);
        assert!(cli.trials.is_none());
        assert!(cli.interval.is_none());
        assert!(cli.host.is_none());
        assert!(cli.servers.is_empty());
        assert!(cli.chart.is_none());
        assert!(!cli.verbose);
        assert!(!cli.debug);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_parsing_all_options() {
        let cli = Cli::parse_from([
            "bbt",
            "--trials", "3",
            "--interval", "2.5",
            "--host", "1.1.1.1",
            "--ping-count", "2",
            "--server", "https://a.example",
            "--server", "https://b.example",
            "--download-bytes", "1000000",
            "--upload-bytes", "500000",
            "--timeout", "30",
            "--chart", "out.html",
            "--json", "out.json",
            "--no-color",
            "--verbose",
            "--debug",
            "--help-topic", "grades",
        ]);

        assert_eq!(cli.trials, Some(3));
        assert_eq!(cli.interval, Some(2.5));
        assert_eq!(cli.host.as_deref(), Some("1.1.1.1"));
        assert_eq!(cli.ping_count, Some(2));
        assert_eq!(cli.servers, vec!["https://a.example", "https://b.example"]);
        assert_eq!(cli.download_bytes, Some(1_000_000));
        assert_eq!(cli.upload_bytes, Some(500_000));
        assert_eq!(cli.timeout, Some(30));
        assert_eq!(cli.chart, Some(PathBuf::from("out.html")));
        assert_eq!(cli.json, Some(PathBuf::from("out.json")));
        assert!(cli.no_color);
        assert!(cli.verbose);
        assert!(cli.debug);
        assert_eq!(cli.get_help_topic(), Some("grades"));
    }

    #[test]
    fn test_trial_range_enforced_by_parser() {
        assert!(Cli::try_parse_from(["bbt", "--trials", "0"]).is_err());
        assert!(Cli::try_parse_from(["bbt", "--trials", "101"]).is_err());
        assert!(Cli::try_parse_from(["bbt", "--trials", "100"]).is_ok());
    }

    #[test]
    fn test_interval_parsing() {
        assert_eq!(parse_interval("0").unwrap(), 0.0);
        assert_eq!(parse_interval("0.5").unwrap(), 0.5);
        assert_eq!(parse_interval("3600").unwrap(), 3600.0);

        assert!(parse_interval("-1").is_err());
        assert!(parse_interval("3601").is_err());
        assert!(parse_interval("NaN").is_err());
        assert!(parse_interval("inf").is_err());
        assert!(parse_interval("soon").is_err());
    }

    #[test]
    fn test_timeout_parsing() {
        assert_eq!(parse_timeout("1").unwrap(), 1);
        assert_eq!(parse_timeout("300").unwrap(), 300);

        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("301").is_err());
        assert!(parse_timeout("+10").is_err());
        assert!(parse_timeout("0x10").is_err());
        assert!(parse_timeout("10.5").is_err());
        assert!(parse_timeout("").is_err());
    }

    #[test]
    fn test_conflicting_color_flags() {
        let cli = Cli::parse_from(["bbt", "--color", "--no-color"]);
        let err = cli.validate().unwrap_err();
        assert!(err.contains("--color"));
    }

    #[test]
    fn test_flag_like_host_rejected() {
        let cli = Cli::parse_from(["bbt", "--host", "-f"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_invalid_server_rejected() {
        let cli = Cli::parse_from(["bbt", "--server", "ftp://files.example"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_use_colors_flags() {
        assert!(!Cli::parse_from(["bbt", "--no-color"]).use_colors());
        assert!(Cli::parse_from(["bbt", "--color"]).use_colors());
    }

    #[test]
    fn test_help_topics() {
        for topic in help::HELP_TOPICS {
            let cli = Cli::parse_from(["bbt", "--no-color", "--help-topic", topic]);
            let help = cli.display_help();
            assert!(!help.is_empty());
            assert!(!help.contains("Unknown help topic"));
        }

        let cli = Cli::parse_from(["bbt", "--no-color", "--help-topic", "bogus"]);
        let help = cli.display_help();
        assert!(help.contains("Unknown help topic: 'bogus'"));
        assert!(help.contains("grades"));
    }

    #[test]
    fn test_main_help() {
        let cli = Cli::parse_from(["bbt", "--no-color"]);
        let help = cli.display_help();
        assert!(help.contains("Bufferbloat Tester"));
        assert!(help.contains("USAGE:"));
    }

    #[test]
    fn test_config_summary() {
        let cli = Cli::parse_from([
            "bbt", "--trials", "4", "--timeout", "20", "--verbose", "--server", "https://s.example",
        ]);

        let summary = cli.get_config_summary();
        assert!(summary.contains("Trials: 4"));
        assert!(summary.contains("Timeout: 20s"));
        assert!(summary.contains("Verbose mode: true"));
        assert!(summary.contains("Speed servers: https://s.example"));
        assert!(!summary.contains("Interval:"));
    }

    #[test]
    fn test_long_version_includes_build_info() {
        assert!(LONG_VERSION.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(LONG_VERSION.contains("built"));
    }
}
