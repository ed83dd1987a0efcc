//! Health check and metrics endpoints.

use axum::{extract::State, http::StatusCode, Json};
use telemetry::{metrics, MetricsSnapshot};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health - Service status and registered firehose count.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        firehoses: state.registry.len(),
        uptime_secs: state.uptime_secs(),
    })
}

/// GET /health/live - Liveness probe (service is running).
pub async fn live_handler() -> StatusCode {
    StatusCode::OK
}

/// GET /metrics - Process-wide counters as JSON.
pub async fn metrics_handler() -> Json<MetricsSnapshot> {
    Json(metrics().snapshot())
}
