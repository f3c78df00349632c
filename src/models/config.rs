//! Configuration data model and validation

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound for trials in one run
pub const MAX_TRIAL_COUNT: u32 = 100;
/// Upper bound for the recovery interval between the loaded and the after probe
pub const MAX_INTERVAL_SECONDS: f64 = 3600.0;
/// Upper bound for echo requests per ping invocation
pub const MAX_PING_COUNT: u32 = 100;
/// Upper bound for a single transfer in either direction
pub const MAX_TRANSFER_BYTES: u64 = 1_000_000_000;
/// Upper bound for the HTTP request timeout
pub const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host the latency probes ping
    #[serde(default = "default_ping_host")]
    pub ping_host: String,

    /// Echo requests per ping invocation
    #[serde(default = "default_ping_count")]
    pub ping_count: u32,

    /// Number of trials in the run
    #[serde(default = "default_trial_count")]
    pub trial_count: u32,

    /// Pause between the loaded probe and the after probe
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: f64,

    /// Candidate speed-test server base URLs
    #[serde(default = "default_speed_servers")]
    pub speed_servers: Vec<String>,

    /// Bytes requested by each download test
    #[serde(default = "default_download_bytes")]
    pub download_bytes: u64,

    /// Bytes sent by each upload test
    #[serde(default = "default_upload_bytes")]
    pub upload_bytes: u64,

    /// HTTP request timeout for the speed test
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,

    /// Where to write the HTML chart, if anywhere
    #[serde(default)]
    pub chart_path: Option<PathBuf>,

    /// Where to write the JSON report, if anywhere
    #[serde(default)]
    pub json_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ping_host: default_ping_host(),
            ping_count: default_ping_count(),
            trial_count: default_trial_count(),
            interval_seconds: default_interval_seconds(),
            speed_servers: default_speed_servers(),
            download_bytes: default_download_bytes(),
            upload_bytes: default_upload_bytes(),
            timeout_seconds: default_timeout_secs(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
            chart_path: None,
            json_path: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the recovery interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_seconds.max(0.0))
    }

    /// Get the HTTP timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        validate_ping_host(&self.ping_host)?;

        if self.ping_count == 0 {
            return Err(AppError::config("Ping count must be greater than 0"));
        }

        if self.ping_count > MAX_PING_COUNT {
            return Err(AppError::config(format!("Ping count cannot exceed {}", MAX_PING_COUNT)));
        }

        if self.trial_count == 0 {
            return Err(AppError::config("Trial count must be greater than 0"));
        }

        if self.trial_count > MAX_TRIAL_COUNT {
            return Err(AppError::config(format!("Trial count cannot exceed {}", MAX_TRIAL_COUNT)));
        }

        if !self.interval_seconds.is_finite() || self.interval_seconds < 0.0 {
            return Err(AppError::config(format!(
                "Interval must be a non-negative number of seconds, got: {}",
                self.interval_seconds
            )));
        }

        if self.interval_seconds > MAX_INTERVAL_SECONDS {
            return Err(AppError::config(format!(
                "Interval cannot exceed {} seconds",
                MAX_INTERVAL_SECONDS
            )));
        }

        if self.speed_servers.is_empty() {
            return Err(AppError::config("At least one speed-test server is required"));
        }

        for server in &self.speed_servers {
            validate_server_url(server)?;
        }

        for (name, bytes) in [("Download", self.download_bytes), ("Upload", self.upload_bytes)] {
            if bytes == 0 {
                return Err(AppError::config(format!("{} size must be greater than 0 bytes", name)));
            }
            if bytes > MAX_TRANSFER_BYTES {
                return Err(AppError::config(format!(
                    "{} size cannot exceed {} bytes",
                    name, MAX_TRANSFER_BYTES
                )));
            }
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(AppError::config(format!(
                "Timeout cannot exceed {} seconds",
                MAX_TIMEOUT_SECONDS
            )));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("PING_HOST") {
            self.ping_host = host.trim().to_string();
        }

        if let Ok(count) = std::env::var("PING_COUNT") {
            self.ping_count = count.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PING_COUNT value '{}': {}", count, e)))?;
        }

        if let Ok(trials) = std::env::var("TRIAL_COUNT") {
            self.trial_count = trials.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TRIAL_COUNT value '{}': {}", trials, e)))?;
        }

        if let Ok(interval) = std::env::var("INTERVAL_SECONDS") {
            self.interval_seconds = interval.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid INTERVAL_SECONDS value '{}': {}", interval, e)))?;
        }

        if let Ok(servers) = std::env::var("SPEED_SERVERS") {
            self.speed_servers = split_list(&servers);
        }

        if let Ok(bytes) = std::env::var("DOWNLOAD_BYTES") {
            self.download_bytes = bytes.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid DOWNLOAD_BYTES value '{}': {}", bytes, e)))?;
        }

        if let Ok(bytes) = std::env::var("UPLOAD_BYTES") {
            self.upload_bytes = bytes.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid UPLOAD_BYTES value '{}': {}", bytes, e)))?;
        }

        if let Ok(timeout) = std::env::var("TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        if let Ok(path) = std::env::var("CHART_PATH") {
            self.chart_path = non_empty_path(&path);
        }

        if let Ok(path) = std::env::var("JSON_PATH") {
            self.json_path = non_empty_path(&path);
        }

        Ok(())
    }
}

/// Ping host rules shared by config and env validation.
///
/// The host is passed to the ping utility as an argument, so anything that
/// could be read as a flag is rejected.
pub fn validate_ping_host(host: &str) -> Result<()> {
    if host.is_empty() {
        return Err(AppError::config("Ping host cannot be empty"));
    }

    if host.starts_with('-') {
        return Err(AppError::config(format!("Ping host cannot start with '-': {}", host)));
    }

    if host.chars().any(char::is_whitespace) {
        return Err(AppError::config(format!("Ping host cannot contain whitespace: '{}'", host)));
    }

    Ok(())
}

/// Speed-test server rules shared by config and env validation
pub fn validate_server_url(server: &str) -> Result<()> {
    if server.is_empty() {
        return Err(AppError::config("Speed-test server URL cannot be empty"));
    }

    match url::Url::parse(server) {
        Ok(parsed) => {
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(AppError::config(format!(
                    "Speed-test server must use http or https: {}",
                    server
                )));
            }
            if parsed.host_str().is_none() {
                return Err(AppError::config(format!("Speed-test server has no host: {}", server)));
            }
            Ok(())
        }
        Err(e) => Err(AppError::config(format!("Invalid speed-test server URL '{}': {}", server, e))),
    }
}

pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty_path(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

// Default value functions for serde
fn default_ping_host() -> String {
    crate::defaults::DEFAULT_PING_HOST.to_string()
}

fn default_ping_count() -> u32 {
    crate::defaults::DEFAULT_PING_COUNT
}

fn default_trial_count() -> u32 {
    crate::defaults::DEFAULT_TRIAL_COUNT
}

fn default_interval_seconds() -> f64 {
    crate::defaults::DEFAULT_INTERVAL_SECONDS
}

fn default_speed_servers() -> Vec<String> {
    crate::defaults::DEFAULT_SPEED_SERVERS
        .iter()
        .map(|&s| s.to_string())
        .collect()
}

fn default_download_bytes() -> u64 {
    crate::defaults::DEFAULT_DOWNLOAD_BYTES
}

fn default_upload_bytes() -> u64 {
    crate::defaults::DEFAULT_UPLOAD_BYTES
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ping_host, "8.8.8.8");
        assert_eq!(config.ping_count, 1);
        assert_eq!(config.trial_count, 5);
        assert_eq!(config.interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_empty_ping_host_invalid() {
        let mut config = Config::default();
        config.ping_host = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_flag_like_ping_host_invalid() {
        let mut config = Config::default();
        config.ping_host = "-f".to_string();
        assert!(config.validate().is_err());

        config.ping_host = "8.8.8.8 -f".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hostname_ping_host_valid() {
        let mut config = Config::default();
        config.ping_host = "one.one.one.one".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_trial_count_invalid() {
        let mut config = Config::default();
        config.trial_count = 0;
        assert!(config.validate().is_err());

        config.trial_count = MAX_TRIAL_COUNT + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_interval_valid() {
        let mut config = Config::default();
        config.interval_seconds = 0.0;
        assert!(config.validate().is_ok());
        assert_eq!(config.interval(), Duration::ZERO);
    }

    #[test]
    fn test_negative_or_nan_interval_invalid() {
        let mut config = Config::default();
        config.interval_seconds = -1.0;
        assert!(config.validate().is_err());

        config.interval_seconds = f64::NAN;
        assert!(config.validate().is_err());

        config.interval_seconds = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fractional_interval() {
        let mut config = Config::default();
        config.interval_seconds = 0.25;
        assert!(config.validate().is_ok());
        assert_eq!(config.interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_server_validation() {
        let mut config = Config::default();
        config.speed_servers = vec![];
        assert!(config.validate().is_err());

        config.speed_servers = vec!["not-a-url".to_string()];
        assert!(config.validate().is_err());

        config.speed_servers = vec!["ftp://speed.example.com".to_string()];
        assert!(config.validate().is_err());

        config.speed_servers = vec!["http://127.0.0.1:8080".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_transfer_size_limits() {
        let mut config = Config::default();
        config.download_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.upload_bytes = MAX_TRANSFER_BYTES + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timeout_limits() {
        let mut config = Config::default();
        config.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config.timeout_seconds = MAX_TIMEOUT_SECONDS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" https://a.example , ,https://b.example "),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: Config = serde_json::from_str("{\"trial_count\": 3}").unwrap();
        assert_eq!(config.trial_count, 3);
        assert_eq!(config.ping_host, "8.8.8.8");
        assert_eq!(config.speed_servers, vec!["https://speed.cloudflare.com".to_string()]);
    }
}
