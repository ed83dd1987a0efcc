//! Unified error types for the firehose engine.
//!
//! Error codes:
//! - CONFIG_001-002: Construction errors
//! - FIREHOSE_001-003: Runtime lifecycle and registry errors
//! - SINK_001: Delivery errors
//! - REQUEST_001: Malformed requests from the front end

use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Construction error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    /// CONFIG_001: A trigger threshold is out of bounds
    InvalidConfig,
    /// CONFIG_002: No sinks were provided
    NoSinks,
}

impl ConfigErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig => "CONFIG_001",
            Self::NoSinks => "CONFIG_002",
        }
    }
}

/// Error returned by a sink for a single delivery attempt.
#[derive(Debug, Clone, Error)]
#[error("sink '{sink}' failed to deliver: {message}")]
pub struct DeliveryError {
    pub sink: String,
    pub message: String,
}

impl DeliveryError {
    pub fn new(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            message: message.into(),
        }
    }
}

/// Unified error type for the firehose engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A trigger threshold violated its bound.
    #[error("[CONFIG_001] invalid config for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("[CONFIG_002] no sinks provided")]
    NoSinksProvided,

    #[error("[FIREHOSE_001] firehose '{0}' is stopped")]
    EngineStopped(String),

    #[error("[FIREHOSE_002] firehose '{0}' already exists")]
    AlreadyExists(String),

    #[error("[FIREHOSE_003] firehose '{0}' not found")]
    NotFound(String),

    #[error("[SINK_001] {0}")]
    Delivery(#[from] DeliveryError),

    /// The time-trigger task outlived its grace period during stop.
    #[error("firehose '{name}' trigger task did not stop within {grace:?}")]
    ShutdownTimeout { name: String, grace: Duration },

    #[error("[REQUEST_001] {0}")]
    BadRequest(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidConfig { .. } => 400,
            Self::NoSinksProvided => 400,
            Self::BadRequest(_) => 400,
            Self::AlreadyExists(_) => 409,
            Self::NotFound(_) => 404,
            Self::EngineStopped(_) => 409,
            Self::Delivery(_) => 502,
            Self::ShutdownTimeout { .. } => 500,
            Self::Io(_) => 500,
            Self::Serialization(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidConfig { .. } => Some(ConfigErrorCode::InvalidConfig.code()),
            Self::NoSinksProvided => Some(ConfigErrorCode::NoSinks.code()),
            Self::EngineStopped(_) => Some("FIREHOSE_001"),
            Self::AlreadyExists(_) => Some("FIREHOSE_002"),
            Self::NotFound(_) => Some("FIREHOSE_003"),
            Self::Delivery(_) => Some("SINK_001"),
            Self::BadRequest(_) => Some("REQUEST_001"),
            _ => None,
        }
    }
}
