//! HTTP API route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{
    health, payment_status, process_payment, ready, search_airports, status, AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/api/health", get(health))
        .route("/ready", get(ready))
        // Status endpoint
        .route("/api/v1/status", get(status))
        // Flight search proxy
        .route("/admin/api/flights/airports", get(search_airports))
        // Payment endpoints
        .route("/api/payments/process", post(process_payment))
        .route("/api/payments/status", get(payment_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create a minimal health-only router (for startup).
pub fn health_router() -> Router {
    Router::new().route("/api/health", get(health))
}

/// Router exposing the Prometheus scrape endpoint.
pub fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || std::future::ready(handle.render())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let state = AppState::new(&test_config());
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_router_serves_health_only() {
        let app = health_router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ready_endpoint_returns_503_when_not_ready() {
        let state = AppState::new(&test_config());
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn ready_endpoint_returns_200_when_ready() {
        let state = AppState::new(&test_config());
        state.set_ready(true);
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn short_airport_query_returns_empty_list() {
        let state = AppState::new(&test_config());
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/api/flights/airports?q=x")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["count"], 0);
        assert_eq!(body["airports"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn payment_process_rejects_non_positive_amount() {
        let state = AppState::new(&test_config());
        let app = create_router(state);

        let request = Request::builder()
            .method("POST")
            .uri("/api/payments/process")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"description": "Deposit", "amount_cents": 0, "buyer_email": "a@b.com"}"#,
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn payment_process_rejects_malformed_email() {
        let state = AppState::new(&test_config());
        let app = create_router(state);

        let request = Request::builder()
            .method("POST")
            .uri("/api/payments/process")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"description": "Deposit", "amount_cents": 100, "buyer_email": "nope"}"#,
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn payment_status_without_link_id_reports_summary() {
        let state = AppState::new(&test_config());
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/payments/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "available");
        assert_eq!(body["links_created"], 0);
    }
}
