//! Download/upload throughput measurement
//!
//! [`HttpThroughputMeasurer`] speaks the Cloudflare-style speed test endpoints:
//! `GET {server}/__down?bytes=N` streams `N` bytes back and `POST {server}/__up`
//! swallows an upload body. The candidate with the lowest zero-byte round trip
//! is picked before each measurement.

use crate::{
    error::{AppError, Result},
    logging::Logger,
    models::Config,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use url::Url;

/// Bits per megabit
pub const BITS_PER_MEGABIT: f64 = 1_000_000.0;

/// Outcome of one download + upload measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ThroughputResult {
    /// Both directions succeeded
    Measured {
        download_mbps: f64,
        upload_mbps: f64,
    },
    /// Server selection or either transfer failed
    Failed,
}

impl ThroughputResult {
    /// Download and upload speeds, if measured
    pub fn speeds(&self) -> Option<(f64, f64)> {
        match self {
            ThroughputResult::Measured { download_mbps, upload_mbps } => Some((*download_mbps, *upload_mbps)),
            ThroughputResult::Failed => None,
        }
    }

    /// Check whether the measurement failed
    pub fn is_failed(&self) -> bool {
        matches!(self, ThroughputResult::Failed)
    }
}

/// Throughput measurement abstraction
#[async_trait]
pub trait ThroughputMeasurer: Send + Sync {
    /// Pick a server, run a download test and an upload test
    async fn measure(&self) -> ThroughputResult;
}

/// Convert raw bits per second into megabits per second
pub fn bps_to_mbps(bits_per_second: f64) -> f64 {
    bits_per_second / BITS_PER_MEGABIT
}

/// Bits per second for `bytes` moved in `elapsed`
pub fn bits_per_second(bytes: u64, elapsed: Duration) -> Result<f64> {
    let seconds = elapsed.as_secs_f64();
    if seconds <= 0.0 {
        return Err(AppError::throughput("Transfer finished in zero time"));
    }
    Ok(bytes as f64 * 8.0 / seconds)
}

/// Server chosen for a measurement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedServer {
    /// Base URL of the server
    pub base: Url,
    /// Round trip of the zero-byte probe request
    pub latency: Duration,
}

/// Throughput measurer using HTTP transfers against speed-test servers
pub struct HttpThroughputMeasurer {
    client: Client,
    servers: Vec<Url>,
    download_bytes: u64,
    /// Upload body, allocated once and shared by every upload
    payload: Bytes,
    logger: Logger,
}

impl HttpThroughputMeasurer {
    /// Create a measurer for the given candidate servers
    pub fn new(
        servers: &[String],
        download_bytes: u64,
        upload_bytes: u64,
        timeout: Duration,
        logger: Logger,
    ) -> Result<Self> {
        if servers.is_empty() {
            return Err(AppError::config("At least one speed test server is required"));
        }

        let servers = servers
            .iter()
            .map(|s| Url::parse(s.trim()).map_err(|e| AppError::config(format!("Invalid speed test server '{}': {}", s, e))))
            .collect::<Result<Vec<_>>>()?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .build()
            .map_err(|e| AppError::throughput(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            servers,
            download_bytes,
            payload: Bytes::from(vec![0u8; upload_bytes as usize]),
            logger,
        })
    }

    /// Create a measurer from the application configuration
    pub fn from_config(config: &Config, logger: Logger) -> Result<Self> {
        Self::new(
            &config.speed_servers,
            config.download_bytes,
            config.upload_bytes,
            config.timeout(),
            logger,
        )
    }

    /// Candidate servers
    pub fn servers(&self) -> &[Url] {
        &self.servers
    }

    fn endpoint(base: &Url, path: &str) -> Url {
        let mut url = base.clone();
        let joined = format!("{}/{}", base.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url
    }

    fn download_url(base: &Url, bytes: u64) -> Url {
        let mut url = Self::endpoint(base, "__down");
        url.query_pairs_mut().clear().append_pair("bytes", &bytes.to_string());
        url
    }

    async fn ping_server(&self, base: &Url) -> Result<Duration> {
        let url = Self::download_url(base, 0);
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::throughput(format!("{} answered {}", base, response.status())));
        }
        response.bytes().await?;
        Ok(start.elapsed())
    }

    /// Pick the reachable server with the lowest zero-byte round trip
    pub async fn select_best_server(&self) -> Result<SelectedServer> {
        let mut best: Option<SelectedServer> = None;

        for base in &self.servers {
            match self.ping_server(base).await {
                Ok(latency) => {
                    self.logger.debug(&format!("Server {} answered in {:.2} ms", base, latency.as_secs_f64() * 1000.0))
                        .field("server", base.as_str())
                        .log()
                        .await;
                    if best.as_ref().map_or(true, |b| latency < b.latency) {
                        best = Some(SelectedServer { base: base.clone(), latency });
                    }
                }
                Err(e) => {
                    self.logger.debug(&format!("Server {} unreachable", base))
                        .error_info(&e)
                        .log()
                        .await;
                }
            }
        }

        best.ok_or_else(|| AppError::throughput("No reachable speed test server"))
    }

    /// Run the download test, returning bits per second
    pub async fn download(&self, server: &SelectedServer) -> Result<f64> {
        let url = Self::download_url(&server.base, self.download_bytes);
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::throughput(format!("Download answered {}", response.status())));
        }

        let mut received: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            received += chunk?.len() as u64;
        }

        if received == 0 {
            return Err(AppError::throughput("Download returned an empty body"));
        }

        bits_per_second(received, start.elapsed())
    }

    /// Run the upload test, returning bits per second
    pub async fn upload(&self, server: &SelectedServer) -> Result<f64> {
        let url = Self::endpoint(&server.base, "__up");
        let start = Instant::now();
        let response = self.client.post(url).body(self.payload.clone()).send().await?;
        if !response.status().is_success() {
            return Err(AppError::throughput(format!("Upload answered {}", response.status())));
        }
        response.bytes().await?;

        bits_per_second(self.payload.len() as u64, start.elapsed())
    }

    async fn try_measure(&self) -> Result<(f64, f64)> {
        let server = self.select_best_server().await?;
        self.logger.info(&format!("Using speed test server {}", server.base))
            .field("server", server.base.as_str())
            .field("latency_ms", server.latency.as_secs_f64() * 1000.0)
            .log()
            .await;

        let download = bps_to_mbps(self.download(&server).await?);
        let upload = bps_to_mbps(self.upload(&server).await?);
        Ok((download, upload))
    }
}

#[async_trait]
impl ThroughputMeasurer for HttpThroughputMeasurer {
    async fn measure(&self) -> ThroughputResult {
        match self.try_measure().await {
            Ok((download_mbps, upload_mbps)) => ThroughputResult::Measured { download_mbps, upload_mbps },
            Err(e) => {
                self.logger.warn("Speed test failed")
                    .error_info(&e)
                    .log()
                    .await;
                ThroughputResult::Failed
            }
        }
    }
}
