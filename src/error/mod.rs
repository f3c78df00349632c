//! Error handling for the bufferbloat tester

use thiserror::Error;

/// Custom error types for the bufferbloat tester
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (numbers, URLs, JSON, ping output)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Latency probe failures (ping missing, non-zero exit, unreadable output)
    #[error("Probe error: {0}")]
    Probe(String),

    /// Throughput measurement failures (server selection, transfer errors)
    #[error("Throughput error: {0}")]
    Throughput(String),

    /// Table, chart or report rendering errors
    #[error("Render error: {0}")]
    Render(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new probe error
    pub fn probe<S: Into<String>>(message: S) -> Self {
        Self::Probe(message.into())
    }

    /// Create a new throughput error
    pub fn throughput<S: Into<String>>(message: S) -> Self {
        Self::Throughput(message.into())
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Probe(_) => "PROBE",
            Self::Throughput(_) => "THROUGHPUT",
            Self::Render(_) => "RENDER",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Per-trial measurement failures are absorbed as missing values; everything
    /// else ends the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Probe(_) | Self::Throughput(_) => true,
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => false,
            Self::Io(_) | Self::Render(_) | Self::Internal(_) => false,
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file or command line arguments.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Check the ping host, server URLs and numeric limits (see --help-topic config).", msg)
            }
            Self::Io(msg) => {
                format!("File operation failed: {}\n\nSuggestion: Check file permissions and disk space for the chart/JSON output paths.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: Check the format of your input data or configuration values.", msg)
            }
            Self::Probe(msg) => {
                format!("Latency probe failed: {}\n\nSuggestion: Make sure the 'ping' utility is installed and the host is reachable.", msg)
            }
            Self::Throughput(msg) => {
                format!("Speed test failed: {}\n\nSuggestion: Check your internet connection or try a different --server.", msg)
            }
            Self::Render(msg) => {
                format!("Rendering failed: {}\n\nSuggestion: Re-run without --chart/--json to get the terminal table only.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,  // Invalid configuration/usage
            Self::Probe(_) | Self::Throughput(_) => 2,  // Network issues
            Self::Io(_) => 5,
            Self::Render(_) => 6,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Probe(_) | Self::Throughput(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Io(_) | Self::Render(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::throughput(format!("request timed out: {}", error))
        } else {
            Self::throughput(error.to_string())
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::num::ParseFloatError> for AppError {
    fn from(error: std::num::ParseFloatError) -> Self {
        Self::parse(format!("Float parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Prints fatal errors for the command line along with the hints that match
/// their category
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Render the full report for `error`
    pub fn render(&self, error: &AppError) -> String {
        let mut lines = vec![format!("Error: {}", error.format_for_console(self.use_color))];

        if self.verbose {
            lines.push(String::new());
            lines.push(error.user_friendly_message());
        }

        let hints = Self::suggestions(error);
        if let Some((title, items)) = hints.split_first() {
            lines.push(String::new());
            lines.push(title.to_string());
            lines.extend(items.iter().map(|item| format!("  - {}", item)));
        }

        lines.join("\n")
    }

    /// Print the report for `error` to stderr
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", self.render(error));
    }

    /// Section title followed by hints for the error's category
    fn suggestions(error: &AppError) -> &'static [&'static str] {
        match error {
            AppError::Config(_) | AppError::Validation(_) | AppError::Parse(_) => &[
                "Configuration help:",
                "Check your .env file and environment variables",
                "The ping host must not be empty, contain spaces or start with '-'",
                "Speed servers must start with http:// or https://",
                "Run with --help-topic config for all limits",
            ],
            AppError::Probe(_) | AppError::Throughput(_) => &[
                "Network troubleshooting:",
                "Check that the 'ping' utility is installed and on PATH",
                "Check your internet connection",
                "Try a different --host or --server",
                "Increase the speed-test timeout with --timeout",
            ],
            AppError::Io(_) | AppError::Render(_) => &[
                "Output help:",
                "Make sure the working directory and the --chart/--json directories are writable",
            ],
            AppError::Internal(_) => &[],
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_error = AppError::config("Invalid configuration");
        assert_eq!(config_error.category(), "CONFIG");
        assert!(!config_error.is_recoverable());
        assert_eq!(config_error.exit_code(), 1);

        let probe_error = AppError::probe("ping exited with status 1");
        assert_eq!(probe_error.category(), "PROBE");
        assert!(probe_error.is_recoverable());
        assert_eq!(probe_error.exit_code(), 2);
    }

    #[test]
    fn test_error_display() {
        let error = AppError::throughput("no reachable speed-test server");
        let display = error.to_string();
        assert!(display.contains("Throughput error"));
        assert!(display.contains("no reachable speed-test server"));
    }

    #[test]
    fn test_error_categories() {
        let errors = [
            AppError::config("config"),
            AppError::validation("validation"),
            AppError::io("io"),
            AppError::parse("parse"),
            AppError::probe("probe"),
            AppError::throughput("throughput"),
            AppError::render("render"),
            AppError::internal("internal"),
        ];

        let expected_categories = [
            "CONFIG", "VALIDATION", "IO", "PARSE", "PROBE", "THROUGHPUT", "RENDER", "INTERNAL",
        ];

        for (error, expected) in errors.iter().zip(expected_categories.iter()) {
            assert_eq!(error.category(), *expected);
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::validation("test").exit_code(), 1);
        assert_eq!(AppError::throughput("test").exit_code(), 2);
        assert_eq!(AppError::io("test").exit_code(), 5);
        assert_eq!(AppError::render("test").exit_code(), 6);
        assert_eq!(AppError::internal("test").exit_code(), 99);
    }

    #[test]
    fn test_user_friendly_messages() {
        let error = AppError::probe("ping: command not found");
        let message = error.user_friendly_message();
        assert!(message.contains("Latency probe failed"));
        assert!(message.contains("Suggestion:"));
        assert!(message.contains("ping: command not found"));
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();
        assert_eq!(app_error.category(), "IO");

        let parse_error = "not_a_number".parse::<u32>().unwrap_err();
        let app_error: AppError = parse_error.into();
        assert_eq!(app_error.category(), "PARSE");

        let float_error = "ms".parse::<f64>().unwrap_err();
        let app_error: AppError = float_error.into();
        assert!(app_error.to_string().contains("Float parse error"));
    }

    #[test]
    fn test_url_parse_error_conversion() {
        let url_error = url::Url::parse("not-a-valid-url").unwrap_err();
        let app_error: AppError = url_error.into();
        assert_eq!(app_error.category(), "PARSE");
        assert!(app_error.to_string().contains("URL parse error"));
    }

    #[test]
    fn test_json_parse_error_conversion() {
        let json_error: serde_json::Error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_error: AppError = json_error.into();
        assert_eq!(app_error.category(), "PARSE");
    }

    #[test]
    fn test_dotenv_error_conversion() {
        let dotenv_error = dotenv::Error::LineParse(".env".to_string(), 1);
        let app_error: AppError = dotenv_error.into();
        assert_eq!(app_error.category(), "CONFIG");
        assert!(app_error.to_string().contains("Environment file error"));
    }

    #[test]
    fn test_console_formatting() {
        let error = AppError::config("Test error");
        let formatted_no_color = error.format_for_console(false);
        let formatted_color = error.format_for_console(true);

        assert_eq!(formatted_no_color, "[CONFIG] Configuration error: Test error");
        assert!(formatted_color.contains("CONFIG"));
        assert!(formatted_color.contains("Test error"));
    }

    #[test]
    fn test_error_reporter_default() {
        let reporter = ErrorReporter::default();
        assert!(reporter.use_color);
        assert!(!reporter.verbose);
    }

    #[test]
    fn test_error_reporter_config_hints() {
        let text = ErrorReporter::new(false, false).render(&AppError::config("TRIAL_COUNT must be 1..=100"));

        assert!(text.starts_with("Error: [CONFIG] Configuration error: TRIAL_COUNT must be 1..=100"));
        assert!(text.contains("\nConfiguration help:\n  - Check your .env file"));
    }

    #[test]
    fn test_error_reporter_internal_has_no_hints() {
        let text = ErrorReporter::new(false, false).render(&AppError::internal("unexpected state"));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_error_reporter_verbose_adds_explanation() {
        let error = AppError::render("chart");
        let quiet = ErrorReporter::new(false, false).render(&error);
        let verbose = ErrorReporter::new(false, true).render(&error);

        assert!(verbose.contains(&error.user_friendly_message()));
        assert!(verbose.lines().count() > quiet.lines().count());
        assert!(verbose.contains("Output help:"));
    }
}
