//! Trial execution engine
//!
//! The [`TrialOrchestrator`] drives the measurement loop. For every trial it
//! probes idle latency, saturates the link with a speed test, probes again
//! under load, grades the inflation, waits for the queues to drain and probes
//! one last time. Trials run strictly one after another and a failed step never
//! aborts the run: it only leaves a missing value behind.

use crate::{
    error::Result,
    logging::{Logger, TrialLogger},
    models::{Config, Trial, TrialSeries},
    probe::{LatencyProber, PingProber},
    throughput::{HttpThroughputMeasurer, ThroughputMeasurer},
    types::{BufferbloatGrade, ProbeStage},
};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Basic execution configuration for the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Number of trials to run
    pub trial_count: u32,
    /// Pause between the during-probe and the after-probe
    pub interval: Duration,
    /// Host every probe targets
    pub ping_host: String,
    /// Echo requests per probe
    pub ping_count: u32,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ExecutionConfig {
    fn from(config: &Config) -> Self {
        Self {
            trial_count: config.trial_count,
            interval: config.interval(),
            ping_host: config.ping_host.clone(),
            ping_count: config.ping_count,
        }
    }
}

/// Finished run together with its timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResults {
    /// Collected trials
    pub series: TrialSeries,
    /// Wall-clock start of the run
    pub started_at: DateTime<Local>,
    /// Total run duration
    pub total_duration: Duration,
}

impl ExecutionResults {
    /// Number of trials where at least one step failed
    pub fn incomplete_trials(&self) -> usize {
        self.series
            .iter()
            .filter(|t| {
                t.latency_before_ms.is_none()
                    || t.latency_during_ms.is_none()
                    || t.latency_after_ms.is_none()
                    || !t.has_throughput()
            })
            .count()
    }
}

/// Runs the before/load/during/after cycle over a prober and a measurer
pub struct TrialOrchestrator<P, M> {
    prober: P,
    measurer: M,
    config: ExecutionConfig,
    logger: TrialLogger,
}

impl<P: LatencyProber, M: ThroughputMeasurer> TrialOrchestrator<P, M> {
    /// Create an orchestrator over the given collaborators
    pub fn new(prober: P, measurer: M, config: ExecutionConfig, logger: TrialLogger) -> Self {
        Self {
            prober,
            measurer,
            config,
            logger,
        }
    }

    /// Execution settings
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Run `trial_count` trials and return the finished series
    pub async fn run(&self, trial_count: u32, interval: Duration) -> TrialSeries {
        self.run_with_progress(trial_count, interval, |_| {}).await
    }

    /// Run `trial_count` trials, handing every completed trial to `on_trial`
    pub async fn run_with_progress<F>(&self, trial_count: u32, interval: Duration, mut on_trial: F) -> TrialSeries
    where
        F: FnMut(&Trial),
    {
        let mut series = TrialSeries::with_capacity(trial_count as usize);

        for index in 0..trial_count as usize {
            let trial = self.run_trial(index, trial_count, interval).await;
            on_trial(&trial);
            series.push(trial);
        }

        series
    }

    /// Run with the configured trial count and interval, timing the whole run
    pub async fn execute<F>(&self, on_trial: F) -> ExecutionResults
    where
        F: FnMut(&Trial),
    {
        let started_at = Local::now();
        let start = Instant::now();
        let series = self
            .run_with_progress(self.config.trial_count, self.config.interval, on_trial)
            .await;

        self.logger.logger().info(&format!("Run finished: {} trials", series.len()))
            .field("trials", series.len())
            .field("duration_ms", start.elapsed().as_millis() as u64)
            .log()
            .await;

        ExecutionResults {
            series,
            started_at,
            total_duration: start.elapsed(),
        }
    }

    async fn probe(&self, stage: ProbeStage, number: usize) -> Option<f64> {
        let latency = self
            .prober
            .probe(&self.config.ping_host, self.config.ping_count)
            .await
            .as_option();
        self.logger.log_probe(stage, number, latency).await;
        latency
    }

    async fn run_trial(&self, index: usize, total: u32, interval: Duration) -> Trial {
        let mut trial = Trial::new(index);
        let number = trial.number();
        let correlation_id = self.logger.begin_trial(number, total).await;

        trial.latency_before_ms = self.probe(ProbeStage::Before, number).await;

        if let Some((download_mbps, upload_mbps)) = self.measurer.measure().await.speeds() {
            trial.download_mbps = Some(download_mbps);
            trial.upload_mbps = Some(upload_mbps);
            trial.timestamp = Some(Local::now());
        }
        self.logger.log_throughput(number, trial.download_mbps, trial.upload_mbps).await;

        trial.latency_during_ms = self.probe(ProbeStage::During, number).await;

        trial.grade = BufferbloatGrade::for_latencies(trial.latency_before_ms, trial.latency_during_ms);
        self.logger.log_grade(number, trial.grade, trial.latency_delta_ms()).await;

        self.logger.log_wait(number, interval.as_secs_f64()).await;
        tokio::time::sleep(interval).await;

        trial.latency_after_ms = self.probe(ProbeStage::After, number).await;

        self.logger.end_trial(&correlation_id, &trial).await;
        trial
    }
}

/// Orchestrator over the system ping and the HTTP speed test
pub type DefaultOrchestrator = TrialOrchestrator<PingProber, HttpThroughputMeasurer>;

/// Factory for creating orchestrators from configuration
pub struct OrchestratorFactory;

impl OrchestratorFactory {
    /// Build the production orchestrator for `config`
    pub fn create(config: &Config, logger: &Logger) -> Result<DefaultOrchestrator> {
        let prober = PingProber::new(logger.named("PROBE"));
        let measurer = HttpThroughputMeasurer::from_config(config, logger.named("SPEED"))?;
        Ok(TrialOrchestrator::new(
            prober,
            measurer,
            ExecutionConfig::from(config),
            TrialLogger::from_logger(logger.named("TRIAL")),
        ))
    }
}
