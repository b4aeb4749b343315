//! Unified error types for the operations toolkit.

use thiserror::Error;

/// Unified error type for the operations toolkit.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Backend gateway error.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Flight API error.
    #[error("flight api error: {0}")]
    Flight(#[from] FlightError),

    /// Payment API error.
    #[error("payment api error: {0}")]
    Payment(#[from] PaymentError),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the hosted-backend gateway (REST, storage, RPC surfaces).
///
/// Remote non-2xx responses are surfaced with their status code and raw
/// body text; the current task decides what to do with them. The gateway
/// itself never retries.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Remote returned a non-2xx status.
    #[error("backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body text.
        body: String,
    },

    /// Response body could not be decoded.
    #[error("failed to parse backend response: {0}")]
    Parse(String),

    /// Configured base URL is not a valid URL.
    #[error("invalid backend base url: {0}")]
    InvalidBaseUrl(String),

    /// HTTP transport error.
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Flight data API errors.
#[derive(Error, Debug)]
pub enum FlightError {
    /// Remote returned a non-2xx status.
    #[error("flight api returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body text.
        body: String,
    },

    /// Response body could not be decoded.
    #[error("failed to parse flight api response: {0}")]
    Parse(String),

    /// HTTP transport error.
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Payment API errors.
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Line-item amount must be a positive number of minor units.
    #[error("invalid amount: {0} (must be positive minor units)")]
    InvalidAmount(i64),

    /// Remote accepted the request but returned no checkout URL.
    #[error("payment link response missing checkout url")]
    MissingCheckoutUrl,

    /// Requested payment link does not exist.
    #[error("payment link {link_id} not found")]
    LinkNotFound {
        /// The link id that was requested.
        link_id: String,
    },

    /// Remote returned a non-2xx status.
    #[error("payment api returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body text.
        body: String,
    },

    /// Response body could not be decoded.
    #[error("failed to parse payment api response: {0}")]
    Parse(String),

    /// HTTP transport error.
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, OpsError>;
