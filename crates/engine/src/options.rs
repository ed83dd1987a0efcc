//! Engine tunables that are not part of the trigger thresholds.

use firehose_core::limits::{
    DEFAULT_DELIVERY_WORKERS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SHUTDOWN_GRACE_SECS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime options shared by every firehose in a process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Time-trigger polling cadence in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Grace period for the time-trigger task during stop, in seconds
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
    /// Upper bound on concurrent sink deliveries per firehose
    #[serde(default = "default_max_delivery_workers")]
    pub max_delivery_workers: usize,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_shutdown_grace_secs() -> u64 {
    DEFAULT_SHUTDOWN_GRACE_SECS
}

fn default_max_delivery_workers() -> usize {
    DEFAULT_DELIVERY_WORKERS
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
            max_delivery_workers: default_max_delivery_workers(),
        }
    }
}

impl EngineOptions {
    pub fn poll_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic.
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Worker pool size for a firehose with `sinks` sinks.
    pub fn pool_size(&self, sinks: usize) -> usize {
        sinks.min(self.max_delivery_workers).max(1)
    }
}
