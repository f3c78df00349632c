//! Configuration validation utilities and rules
//!
//! `Config::validate` enforces hard limits. The checks here only produce
//! advisory warnings about settings that make a run less meaningful.

use crate::{
    error::Result,
    models::Config,
};
use colored::*;
use std::net::IpAddr;

/// Downloads below this size may finish before the link queue fills
pub const MIN_SATURATING_DOWNLOAD_BYTES: u64 = 5_000_000;
/// Uploads below this size may finish before the link queue fills
pub const MIN_SATURATING_UPLOAD_BYTES: u64 = 1_000_000;
/// Runs whose waits alone exceed this many seconds get a runtime note
pub const LONG_RUN_SECONDS: f64 = 600.0;

/// Configuration validator with advisory rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration, returning advisory warnings on success
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_ping_target(config));
        warnings.extend(Self::validate_speed_servers(&config.speed_servers));
        warnings.extend(Self::validate_run_settings(config));

        Ok(warnings)
    }

    /// Check where latency probes go
    fn validate_ping_target(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.ping_count > 1 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Ping count is {}, but only the first reply of each probe is used", config.ping_count),
            ));
        }

        if let Ok(ip) = config.ping_host.parse::<IpAddr>() {
            if ip.is_loopback() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("Ping host {} is a loopback address; probes never cross the link under test", ip),
                ));
            } else if is_private(&ip) {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Ping host {} is on a private network; only the local segment is measured", ip),
                ));
            }
        }

        warnings
    }

    /// Check the speed-test server list
    fn validate_speed_servers(servers: &[String]) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for server in servers {
            if let Ok(parsed) = url::Url::parse(server) {
                if parsed.scheme() == "http" {
                    warnings.push(ValidationWarning::new(
                        ValidationLevel::Warning,
                        format!("Speed-test server '{}' uses HTTP; transparent proxies may skew throughput", server),
                    ));
                }

                if let Some(url::Host::Ipv4(ip)) = parsed.host() {
                    if ip.is_private() || ip.is_loopback() {
                        warnings.push(ValidationWarning::new(
                            ValidationLevel::Info,
                            format!("Speed-test server '{}' is on a private/local network", server),
                        ));
                    }
                }
            }
        }

        warnings
    }

    /// Check trial count, interval and transfer sizing
    fn validate_run_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.trial_count < 3 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Trial count of {} may not give a representative grade (recommended: >= 3)", config.trial_count),
            ));
        }

        if config.interval_seconds == 0.0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "Interval of 0s leaves no time for queues to drain before the after-probe".to_string(),
            ));
        }

        let minimum_runtime = config.trial_count as f64 * config.interval_seconds;
        if minimum_runtime > LONG_RUN_SECONDS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Waits alone will take at least {:.0} minutes", minimum_runtime / 60.0),
            ));
        }

        if config.download_bytes < MIN_SATURATING_DOWNLOAD_BYTES {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Download size of {} bytes may be too small to saturate the link", config.download_bytes),
            ));
        }

        if config.upload_bytes < MIN_SATURATING_UPLOAD_BYTES {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Upload size of {} bytes may be too small to saturate the link", config.upload_bytes),
            ));
        }

        if config.timeout_seconds < 10 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Timeout of {}s may abort transfers on slower links", config.timeout_seconds),
            ));
        }

        warnings
    }
}

fn is_private(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => ipv4.is_private() || ipv4.is_link_local(),
        // Unique local fc00::/7
        IpAddr::V6(ipv6) => (ipv6.segments()[0] & 0xfe00) == 0xfc00,
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()).bold(), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
