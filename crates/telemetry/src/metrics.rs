//! Internal metrics collection.
//!
//! Counters are shared by every firehose in the process. Per-firehose
//! figures are available from `Firehose::stats`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Saturates at zero.
    pub fn dec(&self) {
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(v.saturating_sub(1)));
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns `(upper bound in ms, count)` per bucket.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the firehose engine.
#[derive(Debug, Default)]
pub struct Metrics {
    // Buffering
    pub records_appended: Counter,
    pub records_rejected: Counter,

    // Flushes
    pub batches_flushed: Counter,
    pub records_flushed: Counter,
    pub flushes_count: Counter,
    pub flushes_size: Counter,
    pub flushes_time: Counter,
    pub flushes_shutdown: Counter,

    // Delivery
    pub deliveries_succeeded: Counter,
    pub delivery_errors: Counter,
    pub delivery_latency_ms: Histogram,

    // Lifecycle
    pub trigger_shutdown_timeouts: Counter,

    // Gauges
    pub active_firehoses: Gauge,
    pub inflight_deliveries: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a flush under its trigger reason ("count", "size", "time", "shutdown").
    pub fn record_flush(&self, reason: &str, records: usize) {
        self.batches_flushed.inc();
        self.records_flushed.inc_by(records as u64);
        match reason {
            "count" => self.flushes_count.inc(),
            "size" => self.flushes_size.inc(),
            "time" => self.flushes_time.inc(),
            "shutdown" => self.flushes_shutdown.inc(),
            other => tracing::warn!(reason = other, "Flush with unknown reason not attributed"),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub records_appended: u64,
    pub records_rejected: u64,
    pub batches_flushed: u64,
    pub records_flushed: u64,
    pub flushes_count: u64,
    pub flushes_size: u64,
    pub flushes_time: u64,
    pub flushes_shutdown: u64,
    pub deliveries_succeeded: u64,
    pub delivery_errors: u64,
    pub delivery_latency_mean_ms: f64,
    /// `(upper bound in ms, count)` per latency bucket
    pub delivery_latency_buckets: Vec<(u64, u64)>,
    pub trigger_shutdown_timeouts: u64,
    pub active_firehoses: u64,
    pub inflight_deliveries: u64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            records_appended: self.records_appended.get(),
            records_rejected: self.records_rejected.get(),
            batches_flushed: self.batches_flushed.get(),
            records_flushed: self.records_flushed.get(),
            flushes_count: self.flushes_count.get(),
            flushes_size: self.flushes_size.get(),
            flushes_time: self.flushes_time.get(),
            flushes_shutdown: self.flushes_shutdown.get(),
            deliveries_succeeded: self.deliveries_succeeded.get(),
            delivery_errors: self.delivery_errors.get(),
            delivery_latency_mean_ms: self.delivery_latency_ms.mean(),
            delivery_latency_buckets: self.delivery_latency_ms.buckets(),
            trigger_shutdown_timeouts: self.trigger_shutdown_timeouts.get(),
            active_firehoses: self.active_firehoses.get(),
            inflight_deliveries: self.inflight_deliveries.get(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
