//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config},
    error::Result,
    executor::{ExecutionResults, OrchestratorFactory, TrialOrchestrator},
    logging::LoggerFactory,
    models::Config,
    output::OutputCoordinator,
    probe::LatencyProber,
    stats::RunSummary,
    throughput::ThroughputMeasurer,
};

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunOutput {
    pub results: ExecutionResults,
    pub summary: RunSummary,
    /// Rendered table and summary
    pub report: String,
    /// One line per requested chart/JSON file, written or not
    pub artifacts: Vec<String>,
}

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        Ok(Self { cli })
    }

    /// Run the application
    pub async fn run(self) -> Result<()> {
        if self.cli.should_show_topic_help() {
            println!("{}", self.cli.display_help());
            return Ok(());
        }

        let config = load_config(self.cli.clone())?;
        let warnings = validate_config(&config)?;

        if config.debug {
            println!("{} v{} ({})", crate::PKG_NAME, crate::VERSION, crate::cli::LONG_VERSION);
            if let Some(commit) = crate::GIT_COMMIT {
                println!("Commit: {}", commit);
            }
            println!("\nConfiguration Summary:");
            println!("{}", display_config_summary(&config));
            println!();
        }

        if !warnings.is_empty() {
            println!("Configuration Warnings:");
            for warning in &warnings {
                println!("  {}", warning.format(config.enable_color));
            }
            println!();
        }

        let logger_factory = LoggerFactory::new(config.clone());
        let logger = logger_factory.create_logger("APP").await;
        let orchestrator = OrchestratorFactory::create(&config, &logger)?;

        println!(
            "Running {} trial(s): pinging {} around a speed test against {}",
            config.trial_count,
            config.ping_host,
            config.speed_servers.join(", ")
        );
        println!();

        let output = execute_run(&config, &orchestrator, |line| println!("{}", line)).await?;

        println!();
        println!("{}", output.report);

        for line in &output.artifacts {
            println!("{}", line);
        }

        let incomplete = output.results.incomplete_trials();
        if incomplete > 0 {
            logger.warn(&format!(
                "{} of {} trial(s) have missing measurements; check the ping host and speed servers",
                incomplete,
                output.results.series.len()
            ))
                .field("incomplete", incomplete)
                .log()
                .await;
        }

        Ok(())
    }
}

/// Run every trial, render the results and write the requested artifacts.
///
/// `on_progress` receives one rendered line per finished trial.
pub async fn execute_run<P, M, F>(
    config: &Config,
    orchestrator: &TrialOrchestrator<P, M>,
    mut on_progress: F,
) -> Result<RunOutput>
where
    P: LatencyProber,
    M: ThroughputMeasurer,
    F: FnMut(String),
{
    let coordinator = OutputCoordinator::from_config(config);

    let results = orchestrator
        .execute(|trial| {
            if let Ok(line) = coordinator.display_trial(trial) {
                on_progress(line);
            }
        })
        .await;

    let summary = RunSummary::from_series(&results.series);
    let report = coordinator.display_results(&results, &summary)?;
    let artifacts = coordinator.write_artifacts(&results, &summary)?;

    Ok(RunOutput {
        results,
        summary,
        report,
        artifacts,
    })
}
