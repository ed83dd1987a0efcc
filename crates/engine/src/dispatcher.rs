//! Dispatcher - fan-out of flushed batches to sinks
//!
//! Every sink receives every batch exactly once. Deliveries run concurrently
//! on a worker pool bounded by a semaphore, and a failing or panicking sink
//! never affects its siblings or the engine.

use firehose_core::{Error, FlushBatch, FlushReason, Sink};
use std::sync::Arc;
use std::time::Instant;
use telemetry::metrics;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio_util::task::task_tracker::TaskTrackerToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Outcome of delivering one batch to every sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub batch_seq: u64,
    pub reason: FlushReason,
    pub records: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn all_delivered(&self) -> bool {
        self.failed == 0
    }
}

/// Fans batches out to a fixed set of sinks.
#[derive(Clone)]
pub struct Dispatcher {
    firehose: Arc<str>,
    sinks: Arc<[Arc<dyn Sink>]>,
    workers: Arc<Semaphore>,
    pool_size: usize,
    tracker: TaskTracker,
    runtime: Handle,
}

impl Dispatcher {
    pub fn new(
        firehose: &str,
        sinks: Vec<Arc<dyn Sink>>,
        pool_size: usize,
        runtime: Handle,
    ) -> Self {
        Self {
            firehose: Arc::from(firehose),
            sinks: Arc::from(sinks),
            workers: Arc::new(Semaphore::new(pool_size)),
            pool_size,
            tracker: TaskTracker::new(),
            runtime,
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Reserves a slot in the in-flight set.
    ///
    /// Taken while the batch is extracted so that `shutdown` cannot finish
    /// between extraction and `spawn`.
    pub fn track(&self) -> TaskTrackerToken {
        self.tracker.token()
    }

    /// Delivers in the background. The token is released when every sink
    /// has finished with the batch.
    pub fn spawn(&self, batch: FlushBatch, token: TaskTrackerToken) {
        let dispatcher = self.clone();
        self.runtime.spawn(async move {
            let _token = token;
            dispatcher.dispatch(batch).await;
        });
    }

    /// Delivers `batch` to every sink and waits for all of them.
    pub async fn dispatch(&self, batch: FlushBatch) -> DispatchReport {
        let batch = Arc::new(batch);
        let records = batch.len();

        let deliveries: Vec<_> = self
            .sinks
            .iter()
            .map(|sink| {
                let sink = Arc::clone(sink);
                let batch = Arc::clone(&batch);
                let workers = Arc::clone(&self.workers);
                let name = sink.name().to_string();
                let handle = self.runtime.spawn(async move {
                    // The semaphore is never closed, so acquisition only waits.
                    let _permit = workers.acquire_owned().await.ok();
                    deliver_one(sink.as_ref(), &batch).await
                });
                (name, handle)
            })
            .collect();

        let mut delivered = 0;
        let mut failed = 0;

        for (sink, handle) in deliveries {
            match handle.await {
                Ok(true) => delivered += 1,
                Ok(false) => failed += 1,
                Err(e) => {
                    failed += 1;
                    metrics().delivery_errors.inc();
                    error!(
                        firehose = %self.firehose,
                        sink = %sink,
                        batch_seq = batch.seq,
                        error = %e,
                        "Sink delivery task panicked"
                    );
                }
            }
        }

        let report = DispatchReport {
            batch_seq: batch.seq,
            reason: batch.reason,
            records,
            delivered,
            failed,
        };

        if report.all_delivered() {
            debug!(
                firehose = %self.firehose,
                batch_seq = report.batch_seq,
                reason = %report.reason,
                records = report.records,
                sinks = report.delivered,
                "Batch delivered"
            );
        } else {
            warn!(
                firehose = %self.firehose,
                batch_seq = report.batch_seq,
                reason = %report.reason,
                records = report.records,
                delivered = report.delivered,
                failed = report.failed,
                "Batch delivery incomplete"
            );
        }

        report
    }

    /// Waits for every in-flight background delivery to finish.
    pub async fn shutdown(&self) {
        self.tracker.close();
        let inflight = self.tracker.len();
        if inflight > 0 {
            info!(
                firehose = %self.firehose,
                inflight = inflight,
                "Waiting for in-flight deliveries"
            );
        }
        self.tracker.wait().await;
        debug!(firehose = %self.firehose, "Dispatcher shutdown complete");
    }
}

async fn deliver_one(sink: &dyn Sink, batch: &FlushBatch) -> bool {
    let start = Instant::now();
    metrics().inflight_deliveries.inc();
    let result = sink.deliver(batch).await;
    metrics().inflight_deliveries.dec();

    let elapsed = start.elapsed();
    metrics()
        .delivery_latency_ms
        .observe(elapsed.as_millis() as u64);

    match result {
        Ok(ack) => {
            metrics().deliveries_succeeded.inc();
            debug!(
                firehose = %batch.firehose,
                sink = sink.name(),
                batch_seq = batch.seq,
                records = ack.records,
                locations = ?ack.locations,
                latency_ms = %elapsed.as_millis(),
                "Delivered batch to sink"
            );
            true
        }
        Err(e) => {
            metrics().delivery_errors.inc();
            let err = Error::from(e);
            error!(
                firehose = %batch.firehose,
                sink = sink.name(),
                batch_seq = batch.seq,
                records = batch.len(),
                code = ?err.error_code(),
                error = %err,
                "Failed to deliver batch"
            );
            false
        }
    }
}
