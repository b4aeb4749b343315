//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Hosted Backend ===
    /// Base URL of the hosted backend (REST/storage/RPC surfaces).
    pub backend_url: String,

    /// Service-role key used for provisioning and admin operations.
    pub backend_service_key: String,

    /// Anonymous key for public-read checks.
    #[serde(default)]
    pub backend_anon_key: Option<String>,

    // === Flight Data API ===
    /// Flight data API base URL.
    #[serde(default = "default_flight_api_url")]
    pub flight_api_url: String,

    /// Flight data API bearer token.
    #[serde(default)]
    pub flight_api_key: String,

    /// Value for the Duffel-Version header.
    #[serde(default = "default_flight_api_version")]
    pub flight_api_version: String,

    /// Maximum airports returned per search.
    #[serde(default = "default_search_limit")]
    pub search_result_limit: u32,

    // === Payment API ===
    /// Payment API base URL.
    #[serde(default = "default_payment_api_url")]
    pub payment_api_url: String,

    /// Payment API bearer token.
    #[serde(default)]
    pub payment_api_key: String,

    /// Location id attached to payment orders.
    #[serde(default)]
    pub payment_location_id: String,

    /// ISO currency code for payment amounts.
    #[serde(default = "default_currency")]
    pub currency: String,

    // === HTTP Client ===
    /// Request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    /// Connection pool size per host.
    #[serde(default = "default_http_pool_size")]
    pub http_pool_size: usize,

    // === Keep-Alive ===
    /// Seconds between keep-alive cycles.
    #[serde(default = "default_keepalive_interval_s")]
    pub keepalive_interval_s: u64,

    /// Per-probe timeout in seconds.
    #[serde(default = "default_probe_timeout_s")]
    pub keepalive_probe_timeout_s: u64,

    /// Milliseconds to pause between probes within a cycle.
    #[serde(default = "default_probe_pause_ms")]
    pub keepalive_pause_ms: u64,

    /// Success ratio below which a cycle logs a warning.
    #[serde(default = "default_success_threshold")]
    pub keepalive_success_threshold: f64,

    // === Server Configuration ===
    /// HTTP server port for the web router.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_flight_api_url() -> String {
    "https://api.duffel.com".to_string()
}

fn default_flight_api_version() -> String {
    "v2".to_string()
}

fn default_search_limit() -> u32 {
    10
}

fn default_payment_api_url() -> String {
    "https://connect.squareup.com".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_http_pool_size() -> usize {
    10
}

fn default_keepalive_interval_s() -> u64 {
    840
}

fn default_probe_timeout_s() -> u64 {
    10
}

fn default_probe_pause_ms() -> u64 {
    2_000
}

fn default_success_threshold() -> f64 {
    0.5
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.backend_url.is_empty() {
            return Err("BACKEND_URL is required".to_string());
        }

        match Url::parse(&self.backend_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => {
                return Err(format!("BACKEND_URL has unsupported scheme '{}'", url.scheme()));
            }
            Err(e) => {
                return Err(format!("BACKEND_URL is not a valid URL: {}", e));
            }
        }

        if self.backend_service_key.is_empty() {
            return Err("BACKEND_SERVICE_KEY is required".to_string());
        }

        if self.keepalive_success_threshold <= 0.0 || self.keepalive_success_threshold > 1.0 {
            return Err("KEEPALIVE_SUCCESS_THRESHOLD must be in (0, 1]".to_string());
        }

        if self.search_result_limit == 0 {
            return Err("SEARCH_RESULT_LIMIT must be at least 1".to_string());
        }

        Ok(())
    }

    /// Check if the flight API credentials are present.
    pub fn has_flight_api(&self) -> bool {
        !self.flight_api_key.is_empty()
    }

    /// Check if the payment API credentials are present.
    pub fn has_payment_api(&self) -> bool {
        !self.payment_api_key.is_empty()
    }

    /// HTTP request timeout as a Duration.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Keep-alive cycle interval as a Duration.
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_interval_s)
    }

    /// Per-probe timeout as a Duration.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.keepalive_probe_timeout_s)
    }

    /// Pause between probes as a Duration.
    pub fn probe_pause(&self) -> Duration {
        Duration::from_millis(self.keepalive_pause_ms)
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        backend_url: "https://project.backend.example.com".to_string(),
        backend_service_key: "service-key".to_string(),
        backend_anon_key: Some("anon-key".to_string()),
        flight_api_url: default_flight_api_url(),
        flight_api_key: "flight-key".to_string(),
        flight_api_version: default_flight_api_version(),
        search_result_limit: default_search_limit(),
        payment_api_url: default_payment_api_url(),
        payment_api_key: "payment-key".to_string(),
        payment_location_id: "LOC123".to_string(),
        currency: default_currency(),
        http_timeout_ms: default_http_timeout_ms(),
        http_pool_size: default_http_pool_size(),
        keepalive_interval_s: default_keepalive_interval_s(),
        keepalive_probe_timeout_s: default_probe_timeout_s(),
        keepalive_pause_ms: default_probe_pause_ms(),
        keepalive_success_threshold: default_success_threshold(),
        port: default_port(),
        rust_log: default_log_level(),
        verbose: false,
    }
}
