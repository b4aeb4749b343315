//! HTTP API module for the thin web router.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::{create_router, health_router, metrics_router};
