//! Keep-alive probing for hosted deployments.
//!
//! Free hosting tiers suspend processes that receive no traffic. The
//! keep-alive loop probes a fixed endpoint list on a fixed interval and
//! reports the success ratio of each cycle. Probe failures are counted,
//! never fatal; a ratio below the configured threshold logs a warning
//! and nothing more.

use std::future::Future;
use std::time::{Duration, Instant};

use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::metrics;

/// Endpoints probed when none are configured.
pub const DEFAULT_ENDPOINTS: &[&str] = &["/api/health", "/", "/admin"];

/// Outcome of a single probe.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    /// Probed path.
    pub path: String,
    /// HTTP status, when a response arrived.
    pub status: Option<u16>,
    /// Whether the probe counts as a success (2xx).
    pub ok: bool,
    /// Transport error text, when no response arrived.
    pub error: Option<String>,
    /// Round-trip time in milliseconds.
    pub elapsed_ms: u128,
}

/// Outcomes for one full cycle over the endpoint list.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Per-endpoint outcomes in probe order.
    pub probes: Vec<ProbeOutcome>,
    /// When the cycle started.
    pub started_at: OffsetDateTime,
}

impl Default for CycleReport {
    fn default() -> Self {
        Self {
            probes: Vec::new(),
            started_at: OffsetDateTime::now_utc(),
        }
    }
}

impl CycleReport {
    /// Number of successful probes.
    pub fn succeeded(&self) -> usize {
        self.probes.iter().filter(|p| p.ok).count()
    }

    /// Number of probes in the cycle.
    pub fn total(&self) -> usize {
        self.probes.len()
    }

    /// Fraction of probes that succeeded. An empty cycle counts as
    /// fully successful so it never trips the warning path.
    pub fn success_ratio(&self) -> f64 {
        if self.probes.is_empty() {
            return 1.0;
        }
        self.succeeded() as f64 / self.total() as f64
    }

    /// Whether the ratio falls below a warning threshold.
    pub fn below_threshold(&self, threshold: f64) -> bool {
        self.success_ratio() < threshold
    }
}

/// Keep-alive prober for one deployed instance.
#[derive(Debug, Clone)]
pub struct KeepAlive {
    /// HTTP client with the per-probe timeout applied.
    http: reqwest::Client,
    /// Instance base URL, without trailing slash.
    base_url: String,
    /// Paths probed each cycle.
    endpoints: Vec<String>,
    /// Pause between probes within a cycle.
    pause: Duration,
    /// Success ratio below which a cycle warns.
    threshold: f64,
}

impl KeepAlive {
    /// Create a prober for a base URL using config timeouts.
    pub fn new(base_url: &str, config: &Config) -> Self {
        Self::with_settings(
            base_url,
            config.probe_timeout(),
            config.probe_pause(),
            config.keepalive_success_threshold,
        )
    }

    /// Create a prober with explicit timing settings.
    pub fn with_settings(
        base_url: &str,
        probe_timeout: Duration,
        pause: Duration,
        threshold: f64,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(probe_timeout)
            .connect_timeout(probe_timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoints: DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            pause,
            threshold,
        }
    }

    /// Replace the probed endpoint list.
    pub fn with_endpoints(mut self, endpoints: Vec<String>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// The instance base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe one path.
    async fn probe(&self, path: &str) -> ProbeOutcome {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let start = Instant::now();

        match self.http.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                ProbeOutcome {
                    path: path.to_string(),
                    status: Some(status.as_u16()),
                    ok: status.is_success(),
                    error: None,
                    elapsed_ms: start.elapsed().as_millis(),
                }
            }
            Err(e) => ProbeOutcome {
                path: path.to_string(),
                status: None,
                ok: false,
                error: Some(e.to_string()),
                elapsed_ms: start.elapsed().as_millis(),
            },
        }
    }

    /// Probe every endpoint sequentially, pausing between probes.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        for (i, path) in self.endpoints.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.pause).await;
            }

            let outcome = self.probe(path).await;
            match (&outcome.status, &outcome.error) {
                (Some(status), _) => {
                    debug!(path = %path, status = %status, ms = outcome.elapsed_ms, "Probe complete")
                }
                (None, Some(error)) => {
                    debug!(path = %path, error = %error, "Probe failed")
                }
                _ => {}
            }

            metrics::inc_probe(outcome.ok);
            report.probes.push(outcome);
        }

        report
    }

    /// Log a cycle's result, warning when the ratio is below threshold.
    pub fn log_report(&self, report: &CycleReport) {
        let ratio = report.success_ratio();

        if report.below_threshold(self.threshold) {
            warn!(
                succeeded = report.succeeded(),
                total = report.total(),
                ratio = ratio,
                threshold = self.threshold,
                "Keep-alive cycle below success threshold"
            );
        } else {
            info!(
                succeeded = report.succeeded(),
                total = report.total(),
                ratio = ratio,
                "Keep-alive cycle complete"
            );
        }
    }

    /// Run cycles forever, sleeping `interval` between them, until the
    /// shutdown future resolves.
    pub async fn run(&self, interval: Duration, shutdown: impl Future<Output = ()>) {
        info!(
            base_url = %self.base_url,
            endpoints = self.endpoints.len(),
            interval_s = interval.as_secs(),
            "Starting keep-alive loop"
        );

        tokio::pin!(shutdown);

        loop {
            let report = self.run_cycle().await;
            self.log_report(&report);

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown => {
                    info!("Keep-alive loop shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    fn outcome(path: &str, ok: bool) -> ProbeOutcome {
        ProbeOutcome {
            path: path.to_string(),
            status: if ok { Some(200) } else { Some(503) },
            ok,
            error: None,
            elapsed_ms: 5,
        }
    }

    #[test]
    fn success_ratio_arithmetic() {
        let report = CycleReport {
            probes: vec![
                outcome("/api/health", true),
                outcome("/", true),
                outcome("/admin", false),
            ],
            ..Default::default()
        };
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.total(), 3);
        assert!((report.success_ratio() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_cycle_counts_as_fully_successful() {
        let report = CycleReport::default();
        assert_eq!(report.success_ratio(), 1.0);
        assert!(!report.below_threshold(0.5));
    }

    #[test]
    fn threshold_comparison() {
        let report = CycleReport {
            probes: vec![outcome("/api/health", false), outcome("/", true)],
            ..Default::default()
        };
        assert!(report.below_threshold(0.75));
        assert!(!report.below_threshold(0.5));
    }

    #[test]
    fn default_endpoints_include_health() {
        let keepalive = KeepAlive::new("https://app.example.com/", &test_config());
        assert_eq!(keepalive.base_url(), "https://app.example.com");
        assert!(DEFAULT_ENDPOINTS.contains(&"/api/health"));
    }

    #[tokio::test]
    async fn refused_connections_count_as_failures_without_aborting() {
        let mut config = test_config();
        config.keepalive_probe_timeout_s = 1;
        config.keepalive_pause_ms = 0;

        // Port 1 is never listening locally.
        let keepalive = KeepAlive::new("http://127.0.0.1:1", &config);
        let report = keepalive.run_cycle().await;

        assert_eq!(report.total(), DEFAULT_ENDPOINTS.len());
        assert_eq!(report.succeeded(), 0);
        assert!(report.probes.iter().all(|p| p.error.is_some()));
    }
}
