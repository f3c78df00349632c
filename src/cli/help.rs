//! Command-line help system with topic pages and usage examples

use crate::{config::env::EnvManager, models::config, types::BufferbloatGrade};
use colored::*;

/// Topics accepted by `--help-topic`
pub const HELP_TOPICS: [&str; 3] = ["grades", "config", "output"];

/// Help system for the CLI application
pub struct HelpSystem {
    platform: String,
}

impl HelpSystem {
    /// Create a new help system
    pub fn new() -> Self {
        Self {
            platform: std::env::consts::OS.to_string(),
        }
    }

    /// Display the main help message with all available options
    pub fn display_main_help(&self, use_colors: bool) -> String {
        let mut help = String::new();

        help.push_str(&self.format_header(use_colors));
        help.push('\n');
        help.push_str(&self.format_usage_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_options_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_examples_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_footer(use_colors));

        help
    }

    /// Display help for a specific topic; `None` for unknown topics
    pub fn display_topic_help(&self, topic: &str, use_colors: bool) -> Option<String> {
        match topic.to_lowercase().as_str() {
            "grades" | "grade" | "grading" => Some(self.format_grades_help(use_colors)),
            "config" | "configuration" | "env" => Some(self.format_configuration_help(use_colors)),
            "output" | "chart" | "json" => Some(self.format_output_help(use_colors)),
            _ => None,
        }
    }

    fn section_header(&self, title: &str, use_colors: bool) -> String {
        if use_colors {
            title.bright_green().bold().to_string()
        } else {
            title.to_string()
        }
    }

    fn format_header(&self, use_colors: bool) -> String {
        let title = "Bufferbloat Tester";
        let subtitle = "Measures how much your latency grows while the link is saturated";
        let version = crate::VERSION;

        if use_colors {
            format!(
                "{}\n{}\nVersion: {} | Platform: {}\n",
                title.bright_cyan().bold(),
                subtitle.bright_blue(),
                version.green(),
                self.platform.yellow()
            )
        } else {
            format!(
                "{}\n{}\nVersion: {} | Platform: {}\n",
                title, subtitle, version, self.platform
            )
        }
    }

    fn format_usage_section(&self, use_colors: bool) -> String {
        let usage_patterns = [
            "bbt [OPTIONS]",
            "bbt --trials <N> --interval <SECONDS> [OPTIONS]",
            "bbt --chart <PATH> --json <PATH> [OPTIONS]",
            "bbt --help-topic <TOPIC>",
        ];

        let mut usage = format!("{}\n", self.section_header("USAGE:", use_colors));
        for pattern in usage_patterns {
            if use_colors {
                usage.push_str(&format!("  {}\n", pattern.bright_white()));
            } else {
                usage.push_str(&format!("  {}\n", pattern));
            }
        }

        usage
    }

    fn format_options_section(&self, use_colors: bool) -> String {
        let options = [
            OptionHelp {
                short: Some("n"),
                long: "trials",
                value: "<N>",
                description: "Number of trials to run (1-100)",
                example: Some("--trials 10"),
            },
            OptionHelp {
                short: Some("i"),
                long: "interval",
                value: "<SECONDS>",
                description: "Wait before the after-load probe (0-3600, fractions allowed)",
                example: Some("--interval 2.5"),
            },
            OptionHelp {
                short: None,
                long: "host",
                value: "<HOST>",
                description: "Host to ping for latency probes",
                example: Some("--host 1.1.1.1"),
            },
            OptionHelp {
                short: None,
                long: "ping-count",
                value: "<N>",
                description: "Echo requests per probe (1-100)",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "server",
                value: "<URL>",
                description: "Speed-test server base URL (can be used multiple times)",
                example: Some("--server https://speed.cloudflare.com"),
            },
            OptionHelp {
                short: None,
                long: "download-bytes",
                value: "<BYTES>",
                description: "Bytes requested by each download test",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "upload-bytes",
                value: "<BYTES>",
                description: "Bytes sent by each upload test",
                example: None,
            },
            OptionHelp {
                short: Some("t"),
                long: "timeout",
                value: "<SECONDS>",
                description: "Speed-test request timeout (1-300)",
                example: Some("--timeout 30"),
            },
            OptionHelp {
                short: None,
                long: "chart",
                value: "<PATH>",
                description: "Write a two-panel HTML chart of the run",
                example: Some("--chart bufferbloat.html"),
            },
            OptionHelp {
                short: None,
                long: "json",
                value: "<PATH>",
                description: "Write a JSON report of the run",
                example: Some("--json bufferbloat.json"),
            },
            OptionHelp {
                short: None,
                long: "verbose",
                value: "",
                description: "Show per-trial progress and extra statistics",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "debug",
                value: "",
                description: "Emit structured JSON diagnostics on stdout/stderr",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "no-color",
                value: "",
                description: "Disable colored output",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "help-topic",
                value: "<TOPIC>",
                description: "Show detailed help (grades, config, output)",
                example: Some("--help-topic grades"),
            },
        ];

        let mut output = format!("{}\n", self.section_header("OPTIONS:", use_colors));
        for option in options {
            output.push_str(&option.format(use_colors));
            output.push('\n');
        }

        output
    }

    fn format_examples_section(&self, use_colors: bool) -> String {
        let examples = [
            ExampleHelp {
                title: "Quick check",
                command: "bbt",
                description: "Five trials against the default host and speed server",
            },
            ExampleHelp {
                title: "Longer run with artifacts",
                command: "bbt --trials 20 --interval 10 --chart run.html --json run.json",
                description: "Twenty trials, ten seconds of recovery each, chart and report written to disk",
            },
            ExampleHelp {
                title: "Custom targets",
                command: "bbt --host 9.9.9.9 --server https://speed.example.net",
                description: "Probe a different host and use your own speed-test server",
            },
        ];

        let mut output = format!("{}\n", self.section_header("EXAMPLES:", use_colors));
        for example in examples {
            output.push_str(&example.format(use_colors));
            output.push('\n');
        }

        output
    }

    fn format_footer(&self, use_colors: bool) -> String {
        let mut footer = format!("{}\n", self.section_header("ADDITIONAL HELP:", use_colors));

        let help_topics = [
            ("--help-topic grades", "How latency inflation maps to a grade"),
            ("--help-topic config", "Environment variables, .env files and limits"),
            ("--help-topic output", "Reading the table, chart and JSON report"),
        ];

        for (command, description) in help_topics {
            if use_colors {
                footer.push_str(&format!("  {}: {}\n", command.bright_yellow(), description.white()));
            } else {
                footer.push_str(&format!("  {}: {}\n", command, description));
            }
        }

        footer
    }

    fn format_grades_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.section_header("BUFFERBLOAT GRADES:", use_colors));

        help.push_str("Each trial is graded on the latency increase under load:\n");
        help.push_str("  delta = latency during load - latency before load\n\n");

        let mut lower = None;
        for grade in BufferbloatGrade::ALL {
            let range = match (lower, grade.upper_bound_ms()) {
                (None, Some(upper)) => format!("<= {} ms", upper),
                (Some(low), Some(upper)) => format!("> {} ms and <= {} ms", low, upper),
                (Some(low), None) => format!("> {} ms", low),
                (None, None) => "any".to_string(),
            };
            lower = grade.upper_bound_ms();

            let label = if use_colors {
                grade.as_str().color(crate::output::grade_color(grade)).bold().to_string()
            } else {
                grade.as_str().to_string()
            };
            help.push_str(&format!("  {}  {:<24} {}\n", label, range, grade.description()));
        }

        help.push_str("\nNegative deltas grade as S. A trial whose before or during probe failed\n");
        help.push_str("is shown as N/A and left out of the overall grade.\n");

        help
    }

    fn format_configuration_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.section_header("CONFIGURATION REFERENCE:", use_colors));

        help.push_str(&EnvManager::display_env_help());
        help.push('\n');

        help.push_str("PARAMETER LIMITS:\n");
        help.push_str(&format!("- Trials: 1-{}\n", config::MAX_TRIAL_COUNT));
        help.push_str(&format!("- Interval: 0-{} seconds\n", config::MAX_INTERVAL_SECONDS));
        help.push_str(&format!("- Ping count: 1-{}\n", config::MAX_PING_COUNT));
        help.push_str(&format!("- Transfer sizes: 1-{} bytes\n", config::MAX_TRANSFER_BYTES));
        help.push_str(&format!("- Timeout: 1-{} seconds\n", config::MAX_TIMEOUT_SECONDS));
        help.push_str("- Speed servers: http:// or https:// base URLs\n\n");

        help.push_str("EXAMPLE .env FILE:\n");
        help.push_str(&EnvManager::create_example_env_content());

        help
    }

    fn format_output_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.section_header("OUTPUT FORMATS:", use_colors));

        help.push_str("TABLE:\n");
        help.push_str("  One column per trial; rows are Time, Download, Upload, the three\n");
        help.push_str("  latency probes and the Bufferbloat grade. Speeds are in Mbps and\n");
        help.push_str("  latencies in ms. A '-' marks a failed measurement; N/A marks a\n");
        help.push_str("  trial that could not be graded.\n\n");

        help.push_str("SUMMARY:\n");
        help.push_str("  Min/mean/max for every column, mean inflation, overall and worst\n");
        help.push_str("  grade, and the grade distribution.\n\n");

        help.push_str("CHART (--chart):\n");
        help.push_str("  Self-contained HTML with two panels: download/upload speed on top,\n");
        help.push_str("  before/during/after latency below. Failed measurements are gaps.\n\n");

        help.push_str("JSON (--json):\n");
        help.push_str("  The run settings, every trial and the summary, for later analysis.\n");

        help
    }
}

impl Default for HelpSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for formatting individual options
struct OptionHelp {
    short: Option<&'static str>,
    long: &'static str,
    value: &'static str,
    description: &'static str,
    example: Option<&'static str>,
}

impl OptionHelp {
    fn format(&self, use_colors: bool) -> String {
        let mut option_str = String::new();

        if let Some(short) = self.short {
            if use_colors {
                option_str.push_str(&format!("  {}, ", format!("-{}", short).bright_cyan()));
            } else {
                option_str.push_str(&format!("  -{}, ", short));
            }
        } else {
            option_str.push_str("      ");
        }

        let long_with_value = if self.value.is_empty() {
            format!("--{}", self.long)
        } else {
            format!("--{} {}", self.long, self.value)
        };

        if use_colors {
            option_str.push_str(&format!("{:<30} {}",
                long_with_value.bright_cyan(),
                self.description.white()
            ));
        } else {
            option_str.push_str(&format!("{:<30} {}", long_with_value, self.description));
        }

        if let Some(example) = self.example {
            if use_colors {
                option_str.push_str(&format!("\n{}{}", " ".repeat(36),
                    format!("Example: {}", example).bright_blue().italic()
                ));
            } else {
                option_str.push_str(&format!("\n{}Example: {}", " ".repeat(36), example));
            }
        }

        option_str
    }
}

/// Helper struct for formatting examples
struct ExampleHelp {
    title: &'static str,
    command: &'static str,
    description: &'static str,
}

impl ExampleHelp {
    fn format(&self, use_colors: bool) -> String {
        if use_colors {
            format!("  {}:\n    {}\n    {}\n",
                self.title.bright_yellow().bold(),
                self.command.bright_white(),
                self.description.bright_blue().italic()
            )
        } else {
            format!("  {}:\n    {}\n    {}\n", self.title, self.command, self.description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_help_sections() {
        let help = HelpSystem::new().display_main_help(false);

        assert!(help.contains("Bufferbloat Tester"));
        assert!(help.contains("USAGE:"));
        assert!(help.contains("OPTIONS:"));
        assert!(help.contains("EXAMPLES:"));
        assert!(help.contains("--trials <N>"));
        assert!(help.contains("--help-topic grades"));
    }

    #[test]
    fn test_grade_table() {
        let help = HelpSystem::new().display_topic_help("grades", false).unwrap();

        assert!(help.contains("BUFFERBLOAT GRADES:"));
        assert!(help.contains("S  <= 5 ms"));
        assert!(help.contains("A  > 5 ms and <= 30 ms"));
        assert!(help.contains("D  > 200 ms and <= 400 ms"));
        assert!(help.contains("F  > 400 ms"));
        for grade in BufferbloatGrade::ALL {
            assert!(help.contains(grade.description()));
        }
    }

    #[test]
    fn test_configuration_help_lists_env_vars() {
        let help = HelpSystem::new().display_topic_help("config", false).unwrap();

        assert!(help.contains("CONFIGURATION REFERENCE:"));
        assert!(help.contains("TRIAL_COUNT"));
        assert!(help.contains("SPEED_SERVERS"));
        assert!(help.contains("Trials: 1-100"));
        assert!(help.contains("EXAMPLE .env FILE:"));
        assert!(help.contains("# TRIAL_COUNT=5"));
    }

    #[test]
    fn test_output_help() {
        let help = HelpSystem::new().display_topic_help("OUTPUT", false).unwrap();
        assert!(help.contains("OUTPUT FORMATS:"));
        assert!(help.contains("--chart"));
    }

    #[test]
    fn test_unknown_topic() {
        assert!(HelpSystem::new().display_topic_help("dns", false).is_none());
    }

    #[test]
    fn test_option_help_formatting() {
        let option = OptionHelp {
            short: Some("n"),
            long: "trials",
            value: "<N>",
            description: "Number of trials",
            example: Some("--trials 3"),
        };

        let formatted = option.format(false);
        assert!(formatted.starts_with("  -n, --trials <N>"));
        assert!(formatted.contains("Example: --trials 3"));
    }

    #[test]
    fn test_example_help_formatting() {
        let example = ExampleHelp {
            title: "Quick check",
            command: "bbt",
            description: "Defaults",
        };

        assert_eq!(example.format(false), "  Quick check:\n    bbt\n    Defaults\n");
    }
}
