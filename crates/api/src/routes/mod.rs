//! API routes.

pub mod firehoses;
pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/minifirehoses",
            get(firehoses::list_handler).post(firehoses::create_handler),
        )
        .route("/minifirehoses/:name", delete(firehoses::delete_handler))
        .route("/minifirehoses/:name/message", post(firehoses::message_handler))
        .route("/minifirehoses/:name/stats", get(firehoses::stats_handler))
        .route("/health", get(health::health_handler))
        .route("/health/live", get(health::live_handler))
        .route("/metrics", get(health::metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
