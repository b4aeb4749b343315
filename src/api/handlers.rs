//! HTTP API handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::Config;
use crate::error::PaymentError;
use crate::flights::{Airport, FlightClient};
use crate::metrics;
use crate::payments::PaymentClient;

/// Request counters exposed on the status endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouterStats {
    /// Airport searches served.
    pub airport_searches: u64,
    /// Payment links created.
    pub payment_links_created: u64,
}

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Whether the router is ready to serve proxied requests.
    pub ready: Arc<std::sync::atomic::AtomicBool>,
    /// Flight data API client.
    pub flights: Arc<FlightClient>,
    /// Payment API client.
    pub payments: Arc<PaymentClient>,
    /// Maximum airports returned per search.
    pub search_limit: u32,
    /// Request counters.
    pub stats: Arc<tokio::sync::RwLock<RouterStats>>,
}

impl AppState {
    /// Create app state with clients built from config.
    pub fn new(config: &Config) -> Self {
        Self {
            ready: Arc::new(std::sync::atomic::AtomicBool::new(false)),
            flights: Arc::new(FlightClient::new(config)),
            payments: Arc::new(PaymentClient::new(config)),
            search_limit: config.search_result_limit,
            stats: Arc::new(tokio::sync::RwLock::new(RouterStats::default())),
        }
    }

    /// Set ready state.
    pub fn set_ready(&self, ready: bool) {
        self.ready
            .store(ready, std::sync::atomic::Ordering::SeqCst);
    }

    /// Check if ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(std::sync::atomic::Ordering::SeqCst)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Whether service is ready.
    pub ready: bool,
}

/// Status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Service status.
    pub status: &'static str,
    /// Request counters.
    pub stats: RouterStats,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error.
    pub error: String,
}

/// Query parameters for the airport search endpoint.
#[derive(Debug, Deserialize)]
pub struct AirportSearchParams {
    /// Free-text query.
    #[serde(default)]
    pub q: String,
    /// Optional result limit override.
    pub limit: Option<u32>,
}

/// Airport search response.
#[derive(Debug, Serialize)]
pub struct AirportSearchResponse {
    /// The query as received.
    pub query: String,
    /// Number of airports returned.
    pub count: usize,
    /// Deduplicated airports.
    pub airports: Vec<Airport>,
}

/// Request body for payment link creation.
#[derive(Debug, Deserialize)]
pub struct ProcessPaymentRequest {
    /// Line item description.
    pub description: String,
    /// Amount in minor currency units.
    pub amount_cents: i64,
    /// Buyer email, pre-filled at checkout.
    pub buyer_email: String,
}

/// Response for a created payment link.
#[derive(Debug, Serialize)]
pub struct ProcessPaymentResponse {
    /// Hosted checkout URL.
    pub checkout_url: String,
    /// Payment link id.
    pub link_id: String,
}

/// Query parameters for the payment status endpoint.
#[derive(Debug, Deserialize)]
pub struct PaymentStatusParams {
    /// Payment link id to look up.
    pub link_id: Option<String>,
}

/// Payment link status response.
#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    /// Payment link id.
    pub link_id: String,
    /// Hosted checkout URL.
    pub checkout_url: String,
    /// Backing order id.
    pub order_id: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<String>,
}

/// Payment endpoint summary when no link id is given.
#[derive(Debug, Serialize)]
pub struct PaymentSummaryResponse {
    /// Endpoint status.
    pub status: &'static str,
    /// Links created since startup.
    pub links_created: u64,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Readiness check handler - returns 200 if ready, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let is_ready = state.is_ready();
    let response = ReadyResponse { ready: is_ready };

    if is_ready {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}

/// Status handler - returns router status and request counters.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.stats.read().await.clone();
    let status = if state.is_ready() { "running" } else { "starting" };

    Json(StatusResponse { status, stats })
}

/// Airport search handler.
///
/// Always returns 200: short queries and total remote failure both
/// degrade to an empty list rather than an error.
pub async fn search_airports(
    State(state): State<AppState>,
    Query(params): Query<AirportSearchParams>,
) -> impl IntoResponse {
    let start = Instant::now();
    let limit = params.limit.unwrap_or(state.search_limit).min(50);

    let airports = state.flights.search_airports(&params.q, limit).await;

    state.stats.write().await.airport_searches += 1;
    metrics::record_airport_search(start);

    Json(AirportSearchResponse {
        query: params.q,
        count: airports.len(),
        airports,
    })
}

/// Payment link creation handler.
pub async fn process_payment(
    State(state): State<AppState>,
    Json(request): Json<ProcessPaymentRequest>,
) -> Response {
    if request.amount_cents <= 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("invalid amount: {}", request.amount_cents),
            }),
        )
            .into_response();
    }

    if !request.buyer_email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "invalid buyer email".to_string(),
            }),
        )
            .into_response();
    }

    match state
        .payments
        .create_payment_link(&request.description, request.amount_cents, &request.buyer_email)
        .await
    {
        Ok(link) => {
            state.stats.write().await.payment_links_created += 1;
            metrics::inc_payment_link_created();
            info!(link_id = %link.id, "Payment link created via router");

            Json(ProcessPaymentResponse {
                checkout_url: link.url,
                link_id: link.id,
            })
            .into_response()
        }
        Err(PaymentError::InvalidAmount(amount)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("invalid amount: {}", amount),
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Payment link creation failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Payment status handler.
///
/// With `link_id`, proxies the link's current state; without it, reports
/// the endpoint's own summary.
pub async fn payment_status(
    State(state): State<AppState>,
    Query(params): Query<PaymentStatusParams>,
) -> Response {
    let Some(link_id) = params.link_id else {
        let stats = state.stats.read().await;
        return Json(PaymentSummaryResponse {
            status: "available",
            links_created: stats.payment_links_created,
        })
        .into_response();
    };

    match state.payments.get_payment_link(&link_id).await {
        Ok(link) => Json(PaymentStatusResponse {
            link_id: link.id,
            checkout_url: link.url,
            order_id: link.order_id,
            created_at: link.created_at,
        })
        .into_response(),
        Err(PaymentError::LinkNotFound { link_id }) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("payment link {} not found", link_id),
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Payment status lookup failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn app_state_ready_toggle() {
        let state = AppState::new(&test_config());
        assert!(!state.is_ready());

        state.set_ready(true);
        assert!(state.is_ready());

        state.set_ready(false);
        assert!(!state.is_ready());
    }
}
