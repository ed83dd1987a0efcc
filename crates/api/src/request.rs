//! Request bodies.

use firehose_core::{Error, FirehoseConfig, Result};
use firehose_sinks::SinkDefinition;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

/// Firehose names appear in URLs and log fields.
static FIREHOSE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("invalid firehose name pattern"));

fn validate_firehose_name(name: &str) -> std::result::Result<(), ValidationError> {
    if FIREHOSE_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_name");
        err.message = Some("name may only contain letters, digits, '_', '-' and '.'".into());
        Err(err)
    }
}

fn default_buffer_time() -> i64 {
    60
}

fn default_buffer_size() -> f64 {
    1.0
}

fn default_buffer_count() -> i64 {
    10
}

/// POST /minifirehoses body.
///
/// `-1` disables a trigger. `buffer-size` is in MB.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "kebab-case")]
pub struct CreateFirehoseRequest {
    #[validate(length(min = 1, max = 128), custom(function = "validate_firehose_name"))]
    pub name: String,
    #[serde(default = "default_buffer_time")]
    pub buffer_time: i64,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: f64,
    #[serde(default = "default_buffer_count")]
    pub buffer_count: i64,
    pub sink: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink_config: Option<Value>,
}

impl CreateFirehoseRequest {
    /// Parses and validates a raw request body.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let request: Self = serde_json::from_slice(body)
            .map_err(|e| Error::bad_request(format!("invalid request body: {}", e)))?;
        request
            .validate()
            .map_err(|e| Error::bad_request(format!("{}", e)))?;
        Ok(request)
    }

    pub fn firehose_config(&self) -> Result<FirehoseConfig> {
        FirehoseConfig::from_sentinels(self.buffer_count, self.buffer_time, self.buffer_size)
    }

    pub fn sink_definition(&self) -> Result<SinkDefinition> {
        SinkDefinition::parse(&self.sink, self.sink_config.as_ref())
    }
}

/// POST /minifirehoses/:name/message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    pub message: Value,
}

impl MessageRequest {
    pub fn parse(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| Error::bad_request(format!("invalid message body: {}", e)))
    }
}
