//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    models::Config,
    error::{AppError, Result},
    config::env::EnvManager,
};
use std::path::PathBuf;

/// Default location of the optional env file
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Configuration parser that layers defaults, the env file, environment
/// variables and CLI arguments, in increasing priority
pub struct ConfigParser {
    cli: Cli,
    env_file: PathBuf,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self::with_env_file(cli, DEFAULT_ENV_FILE)
    }

    /// Create a parser that reads its env file from `path`
    pub fn with_env_file<P: Into<PathBuf>>(cli: Cli, path: P) -> Self {
        Self { cli, env_file: path.into() }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        self.cli.validate().map_err(AppError::validation)?;

        let mut config = Config::default();

        EnvManager::load_env_file_from(&self.env_file, self.cli.debug)?;
        if self.cli.debug {
            for problem in EnvManager::validate_current_env() {
                eprintln!("Environment warning: {}", problem);
            }
        }
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(trials) = cli.trials {
            config.trial_count = trials;
        }
        if let Some(interval) = cli.interval {
            config.interval_seconds = interval;
        }
        if let Some(ref host) = cli.host {
            config.ping_host = host.trim().to_string();
        }
        if let Some(count) = cli.ping_count {
            config.ping_count = count;
        }
        if !cli.servers.is_empty() {
            config.speed_servers = cli.servers.clone();
        }
        if let Some(bytes) = cli.download_bytes {
            config.download_bytes = bytes;
        }
        if let Some(bytes) = cli.upload_bytes {
            config.upload_bytes = bytes;
        }
        if let Some(timeout) = cli.timeout {
            config.timeout_seconds = timeout;
        }
        if let Some(ref path) = cli.chart {
            config.chart_path = Some(path.clone());
        }
        if let Some(ref path) = cli.json {
            config.json_path = Some(path.clone());
        }

        if cli.no_color {
            config.enable_color = false;
        } else if cli.color {
            config.enable_color = true;
        }

        // CLI-only flags
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        if config.debug {
            eprint!("{}", cli.get_config_summary());
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Ping Host: {}", config.ping_host));
    summary.push(format!("Ping Count: {}", config.ping_count));
    summary.push(format!("Trials: {}", config.trial_count));
    summary.push(format!("Interval: {}s", config.interval_seconds));
    summary.push(format!("Speed Servers: {}", config.speed_servers.join(", ")));
    summary.push(format!("Download Bytes: {}", config.download_bytes));
    summary.push(format!("Upload Bytes: {}", config.upload_bytes));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));
    if let Some(ref path) = config.chart_path {
        summary.push(format!("Chart: {}", path.display()));
    }
    if let Some(ref path) = config.json_path {
        summary.push(format!("JSON Report: {}", path.display()));
    }

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_LOCK;
    use clap::Parser;
    use std::env;
    use tempfile::TempDir;

    const VARS: [&str; 11] = [
        "PING_HOST", "PING_COUNT", "TRIAL_COUNT", "INTERVAL_SECONDS", "SPEED_SERVERS",
        "DOWNLOAD_BYTES", "UPLOAD_BYTES", "TIMEOUT_SECONDS", "ENABLE_COLOR", "CHART_PATH", "JSON_PATH",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn parser(args: &[&str], dir: &TempDir) -> ConfigParser {
        let mut argv = vec!["bbt"];
        argv.extend_from_slice(args);
        ConfigParser::with_env_file(Cli::parse_from(argv), dir.path().join(".env"))
    }

    #[test]
    fn test_defaults_without_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();

        let config = parser(&[], &dir).parse().unwrap();

        assert_eq!(config.trial_count, crate::defaults::DEFAULT_TRIAL_COUNT);
        assert_eq!(config.interval_seconds, crate::defaults::DEFAULT_INTERVAL_SECONDS);
        assert_eq!(config.ping_host, crate::defaults::DEFAULT_PING_HOST);
        assert!(config.chart_path.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();

        let config = parser(&[
            "--trials", "3",
            "--interval", "0.5",
            "--host", "1.1.1.1",
            "--server", "https://speed.example",
            "--timeout", "15",
            "--chart", "run.html",
            "--no-color",
            "--verbose",
        ], &dir).parse().unwrap();

        assert_eq!(config.trial_count, 3);
        assert_eq!(config.interval_seconds, 0.5);
        assert_eq!(config.ping_host, "1.1.1.1");
        assert_eq!(config.speed_servers, vec!["https://speed.example"]);
        assert_eq!(config.timeout_seconds, 15);
        assert_eq!(config.chart_path, Some(PathBuf::from("run.html")));
        assert!(!config.enable_color);
        assert!(config.verbose);
        assert!(!config.debug);
    }

    #[test]
    fn test_cli_takes_priority_over_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();

        env::set_var("TRIAL_COUNT", "8");
        env::set_var("PING_HOST", "9.9.9.9");

        let config = parser(&["--trials", "2"], &dir).parse().unwrap();
        assert_eq!(config.trial_count, 2);
        assert_eq!(config.ping_host, "9.9.9.9");

        clear_env();
    }

    #[test]
    fn test_env_file_is_loaded_but_env_wins() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".env"), "TRIAL_COUNT=7\nINTERVAL_SECONDS=1.5\n").unwrap();

        env::set_var("INTERVAL_SECONDS", "3");

        let config = parser(&[], &dir).parse().unwrap();
        assert_eq!(config.trial_count, 7);
        assert_eq!(config.interval_seconds, 3.0);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value_is_config_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();

        env::set_var("TRIAL_COUNT", "many");
        let err = parser(&[], &dir).parse().unwrap_err();
        assert_eq!(err.category(), "CONFIG");

        clear_env();
    }

    #[test]
    fn test_out_of_range_env_value_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();

        env::set_var("TRIAL_COUNT", "0");
        assert!(parser(&[], &dir).parse().is_err());

        clear_env();
    }

    #[test]
    fn test_cli_replaces_out_of_range_env_value() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();

        env::set_var("TRIAL_COUNT", "500");
        let config = parser(&["--trials", "3", "--debug"], &dir).parse();
        clear_env();

        assert_eq!(config.unwrap().trial_count, 3);
    }

    #[test]
    fn test_conflicting_color_flags_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = TempDir::new().unwrap();

        let err = parser(&["--color", "--no-color"], &dir).parse().unwrap_err();
        assert_eq!(err.category(), "VALIDATION");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_display_config_summary() {
        let mut config = Config::default();
        config.json_path = Some(PathBuf::from("out.json"));

        let summary = display_config_summary(&config);
        assert!(summary.contains("Ping Host: 8.8.8.8"));
        assert!(summary.contains("Trials: 5"));
        assert!(summary.contains("Speed Servers: https://speed.cloudflare.com"));
        assert!(summary.contains("JSON Report: out.json"));
        assert!(!summary.contains("Chart:"));
    }
}
