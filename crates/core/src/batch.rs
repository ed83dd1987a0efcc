//! Flushed batches handed to sinks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::Record;

/// Why a flush happened. Used for logs and metrics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlushReason {
    Count,
    Size,
    Time,
    Shutdown,
}

impl FlushReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Size => "size",
            Self::Time => "time",
            Self::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for FlushReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of the records extracted by one flush.
#[derive(Debug, Clone)]
pub struct FlushBatch {
    /// Name of the firehose that produced the batch
    pub firehose: String,
    /// Per-firehose sequence number, starting at 1
    pub seq: u64,
    pub reason: FlushReason,
    pub records: Vec<Record>,
    /// Sum of the records' approximate sizes
    pub approx_size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

impl FlushBatch {
    pub fn new(
        firehose: impl Into<String>,
        seq: u64,
        reason: FlushReason,
        records: Vec<Record>,
        approx_size_bytes: u64,
    ) -> Self {
        Self {
            firehose: firehose.into(),
            seq,
            reason,
            records,
            approx_size_bytes,
            created_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}
