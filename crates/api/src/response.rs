//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use firehose_engine::{FirehoseState, FirehoseStats};
use firehose_core::limits::BYTES_PER_MB;
use serde::{Deserialize, Serialize};

/// Acknowledgement for create, delete and append.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Buffer statistics for one firehose.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StatsResponse {
    pub buffer_count: u64,
    pub buffer_size_bytes: u64,
    pub buffer_size_in_mb: f64,
    pub state: FirehoseState,
    pub records_appended: u64,
    pub batches_flushed: u64,
}

impl From<FirehoseStats> for StatsResponse {
    fn from(stats: FirehoseStats) -> Self {
        Self {
            buffer_count: stats.buffered_count,
            buffer_size_bytes: stats.buffered_approx_size_bytes,
            buffer_size_in_mb: stats.buffered_approx_size_bytes as f64 / BYTES_PER_MB as f64,
            state: stats.state,
            records_appended: stats.records_appended,
            batches_flushed: stats.batches_flushed,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub firehoses: usize,
    pub uptime_secs: u64,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// API error carrying a status code and a JSON body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<firehose_core::Error> for ApiError {
    fn from(err: firehose_core::Error) -> Self {
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = err.error_code().unwrap_or("INTERNAL");
        ApiError::with_code(status, code, err.to_string())
    }
}
