//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::models::config::{
    validate_ping_host, validate_server_url, split_list, MAX_INTERVAL_SECONDS, MAX_PING_COUNT,
    MAX_TIMEOUT_SECONDS, MAX_TRANSFER_BYTES, MAX_TRIAL_COUNT,
};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load an env file if it exists; variables already set in the environment win
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Bufferbloat Tester Configuration
#
# Values here are used as defaults and can be overridden by environment
# variables and command-line arguments.

# Host probed before, during and after each speed test
# PING_HOST=8.8.8.8

# Echo requests per ping invocation (only the first reply is used)
# PING_COUNT=1

# Number of trials per run
# TRIAL_COUNT=5

# Seconds to wait between the loaded probe and the recovery probe
# INTERVAL_SECONDS=5

# Speed-test servers (comma-separated, Cloudflare-style __down/__up endpoints)
# SPEED_SERVERS=https://speed.cloudflare.com

# Bytes transferred by each download and upload test
# DOWNLOAD_BYTES=25000000
# UPLOAD_BYTES=10000000

# HTTP timeout for the speed test in seconds
# TIMEOUT_SECONDS=60

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Optional artifacts
# CHART_PATH=bufferbloat.html
# JSON_PATH=bufferbloat.json

# Example configurations for different scenarios:
#
# Quick check of a slow link:
# TRIAL_COUNT=3
# DOWNLOAD_BYTES=5000000
# UPLOAD_BYTES=2000000
#
# Probing the first hop instead of a public resolver:
# PING_HOST=192.168.1.1
"#.to_string()
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "PING_HOST" => validate_ping_host(value)?,
            "PING_COUNT" => {
                let count: u32 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid PING_COUNT value '{}': {}", value, e)))?;
                if count == 0 || count > MAX_PING_COUNT {
                    return Err(AppError::config(format!("PING_COUNT must be between 1 and {}, got: {}", MAX_PING_COUNT, count)));
                }
            }
            "TRIAL_COUNT" => {
                let count: u32 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid TRIAL_COUNT value '{}': {}", value, e)))?;
                if count == 0 || count > MAX_TRIAL_COUNT {
                    return Err(AppError::config(format!("TRIAL_COUNT must be between 1 and {}, got: {}", MAX_TRIAL_COUNT, count)));
                }
            }
            "INTERVAL_SECONDS" => {
                let interval: f64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid INTERVAL_SECONDS value '{}': {}", value, e)))?;
                if !interval.is_finite() || !(0.0..=MAX_INTERVAL_SECONDS).contains(&interval) {
                    return Err(AppError::config(format!("INTERVAL_SECONDS must be between 0 and {}, got: {}", MAX_INTERVAL_SECONDS, value)));
                }
            }
            "SPEED_SERVERS" => {
                let servers = split_list(value);
                if servers.is_empty() {
                    return Err(AppError::config("SPEED_SERVERS must list at least one server"));
                }
                for server in servers {
                    validate_server_url(&server)?;
                }
            }
            "DOWNLOAD_BYTES" | "UPLOAD_BYTES" => {
                let bytes: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if bytes == 0 || bytes > MAX_TRANSFER_BYTES {
                    return Err(AppError::config(format!("{} must be between 1 and {}, got: {}", key, MAX_TRANSFER_BYTES, bytes)));
                }
            }
            "TIMEOUT_SECONDS" => {
                let timeout: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid TIMEOUT_SECONDS value '{}': {}", value, e)))?;
                if timeout == 0 || timeout > MAX_TIMEOUT_SECONDS {
                    return Err(AppError::config(format!("TIMEOUT_SECONDS must be between 1 and {}, got: {}", MAX_TIMEOUT_SECONDS, timeout)));
                }
            }
            "ENABLE_COLOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {
                // Paths and unknown variables are accepted as-is
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("PING_HOST", "Host probed for latency", "8.8.8.8"),
            ("PING_COUNT", "Echo requests per probe (1-100)", "1"),
            ("TRIAL_COUNT", "Number of trials per run (1-100)", "5"),
            ("INTERVAL_SECONDS", "Recovery wait before the after-probe (0-3600)", "5"),
            ("SPEED_SERVERS", "Comma-separated speed-test server URLs", "https://speed.cloudflare.com"),
            ("DOWNLOAD_BYTES", "Bytes per download test", "25000000"),
            ("UPLOAD_BYTES", "Bytes per upload test", "10000000"),
            ("TIMEOUT_SECONDS", "Speed-test HTTP timeout in seconds (1-300)", "60"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
            ("CHART_PATH", "Write an HTML chart to this path", "bufferbloat.html"),
            ("JSON_PATH", "Write a JSON report to this path", "bufferbloat.json"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<18} {}\n", var, description));
            help.push_str(&format!("  {:<18} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Problems with the supported variables currently set in the environment
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value).err().map(|e| format!("{}: {}", var_name, e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_manager_create_example_content() {
        let content = EnvManager::create_example_env_content();

        for (var, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("{}=", var)), "example lacks {}", var);
        }
    }

    #[test]
    fn test_env_manager_validate_env_var() {
        assert!(EnvManager::validate_env_var("PING_HOST", "1.1.1.1").is_ok());
        assert!(EnvManager::validate_env_var("PING_COUNT", "3").is_ok());
        assert!(EnvManager::validate_env_var("TRIAL_COUNT", "10").is_ok());
        assert!(EnvManager::validate_env_var("INTERVAL_SECONDS", "0").is_ok());
        assert!(EnvManager::validate_env_var("INTERVAL_SECONDS", "2.5").is_ok());
        assert!(EnvManager::validate_env_var("SPEED_SERVERS", "https://a.example, http://b.example:8080").is_ok());
        assert!(EnvManager::validate_env_var("DOWNLOAD_BYTES", "1000").is_ok());
        assert!(EnvManager::validate_env_var("TIMEOUT_SECONDS", "10").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "false").is_ok());
        assert!(EnvManager::validate_env_var("CHART_PATH", "out.html").is_ok());

        assert!(EnvManager::validate_env_var("PING_HOST", "-f").is_err());
        assert!(EnvManager::validate_env_var("PING_COUNT", "0").is_err());
        assert!(EnvManager::validate_env_var("TRIAL_COUNT", "101").is_err());
        assert!(EnvManager::validate_env_var("INTERVAL_SECONDS", "-1").is_err());
        assert!(EnvManager::validate_env_var("INTERVAL_SECONDS", "NaN").is_err());
        assert!(EnvManager::validate_env_var("SPEED_SERVERS", "").is_err());
        assert!(EnvManager::validate_env_var("SPEED_SERVERS", "ftp://a.example").is_err());
        assert!(EnvManager::validate_env_var("UPLOAD_BYTES", "0").is_err());
        assert!(EnvManager::validate_env_var("TIMEOUT_SECONDS", "301").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
    }

    #[test]
    fn test_validate_current_env_reports_bad_values() {
        let _guard = crate::config::ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("TRIAL_COUNT", "500");
        std::env::set_var("PING_HOST", "1.1.1.1");

        let problems = EnvManager::validate_current_env();

        std::env::remove_var("TRIAL_COUNT");
        std::env::remove_var("PING_HOST");
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("TRIAL_COUNT:"));
    }

    #[test]
    fn test_get_supported_env_vars() {
        let vars = EnvManager::get_supported_env_vars();

        assert_eq!(vars.len(), 11);
        assert!(vars.iter().any(|(name, _, _)| *name == "TRIAL_COUNT"));
        assert!(vars.iter().any(|(name, _, _)| *name == "INTERVAL_SECONDS"));
        assert!(vars.iter().any(|(name, _, _)| *name == "SPEED_SERVERS"));
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();

        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("PING_HOST"));
        assert!(help.contains("Configuration Priority"));
        assert!(help.contains("Command-line arguments"));
    }
}
