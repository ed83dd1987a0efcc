//! Opaque records pushed into a firehose.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single record. The engine never inspects the payload beyond
/// estimating its size; sinks decide how to encode it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Approximate serialized size in bytes.
    ///
    /// Strings count their raw length; everything else counts its compact
    /// JSON form.
    pub fn approx_size(&self) -> u64 {
        match &self.0 {
            Value::String(s) => s.len() as u64,
            other => other.to_string().len() as u64,
        }
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<String> for Record {
    fn from(value: String) -> Self {
        Self(Value::String(value))
    }
}

impl From<&str> for Record {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}
