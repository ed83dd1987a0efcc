//! The firehose: buffer, triggers, background time trigger and lifecycle.

use firehose_core::{
    should_flush, time_elapsed, Error, FirehoseConfig, FlushBatch, FlushReason, Record, Result,
    Sink,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use telemetry::metrics;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::buffer::Buffer;
use crate::dispatcher::{DispatchReport, Dispatcher};
use crate::options::EngineOptions;

/// Lifecycle state of a firehose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirehoseState {
    Created,
    Running,
    Stopped,
}

/// Point-in-time view of a firehose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirehoseStats {
    pub state: FirehoseState,
    pub buffered_count: u64,
    pub buffered_approx_size_bytes: u64,
    pub records_appended: u64,
    pub batches_flushed: u64,
}

/// Background task that flushes on the time threshold.
struct TimeTrigger {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl TimeTrigger {
    /// Cancels the task and waits up to `grace` for it to exit.
    async fn shutdown(self, name: &str, grace: Duration) {
        self.cancel.cancel();
        let abort = self.handle.abort_handle();

        match tokio::time::timeout(grace, self.handle).await {
            Ok(Ok(())) => debug!(firehose = %name, "Time trigger stopped"),
            Ok(Err(e)) => error!(firehose = %name, error = %e, "Time trigger task failed"),
            Err(_) => {
                let err = Error::ShutdownTimeout {
                    name: name.to_string(),
                    grace,
                };
                metrics().trigger_shutdown_timeouts.inc();
                warn!(firehose = %name, error = %err, "Time trigger did not terminate as expected");
                abort.abort();
            }
        }
    }
}

enum Lifecycle {
    Created,
    Running { trigger: Option<TimeTrigger> },
    /// Flips to `true` once the final flush has been delivered.
    Stopped { finished: watch::Receiver<bool> },
}

impl Lifecycle {
    fn state(&self) -> FirehoseState {
        match self {
            Self::Created => FirehoseState::Created,
            Self::Running { .. } => FirehoseState::Running,
            Self::Stopped { .. } => FirehoseState::Stopped,
        }
    }
}

/// A named stream that buffers records and delivers them to sinks in batches.
///
/// Appends, trigger evaluation and extraction share one buffer lock, so a
/// record is never part of two batches and never falls between them.
/// Delivery always happens after the lock is released.
pub struct Firehose {
    name: String,
    config: FirehoseConfig,
    options: EngineOptions,
    buffer: Mutex<Buffer>,
    /// Start of the current time window
    last_flush: Mutex<Instant>,
    lifecycle: Mutex<Lifecycle>,
    dispatcher: Dispatcher,
    runtime: Handle,
    records_appended: AtomicU64,
    batches_flushed: AtomicU64,
}

impl Firehose {
    /// Creates a firehose with default engine options.
    ///
    /// Must be called from within a tokio runtime; deliveries and the time
    /// trigger run on that runtime.
    pub fn new(
        name: impl Into<String>,
        sinks: Vec<Arc<dyn Sink>>,
        config: FirehoseConfig,
    ) -> Result<Arc<Self>> {
        Self::with_options(name, sinks, config, EngineOptions::default())
    }

    pub fn with_options(
        name: impl Into<String>,
        sinks: Vec<Arc<dyn Sink>>,
        config: FirehoseConfig,
        options: EngineOptions,
    ) -> Result<Arc<Self>> {
        if sinks.is_empty() {
            return Err(Error::NoSinksProvided);
        }

        let runtime = Handle::try_current()
            .map_err(|e| Error::internal(format!("firehose requires a tokio runtime: {}", e)))?;

        let name = name.into();
        let pool_size = options.pool_size(sinks.len());
        let dispatcher = Dispatcher::new(&name, sinks, pool_size, runtime.clone());

        info!(
            firehose = %name,
            max_records = ?config.max_records(),
            max_time_secs = ?config.max_time_secs(),
            max_size_bytes = ?config.max_size_bytes(),
            sinks = dispatcher.sink_count(),
            workers = pool_size,
            "Created firehose"
        );
        metrics().active_firehoses.inc();

        Ok(Arc::new(Self {
            name,
            config,
            options,
            buffer: Mutex::new(Buffer::new()),
            last_flush: Mutex::new(Instant::now()),
            lifecycle: Mutex::new(Lifecycle::Created),
            dispatcher,
            runtime,
            records_appended: AtomicU64::new(0),
            batches_flushed: AtomicU64::new(0),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &FirehoseConfig {
        &self.config
    }

    pub fn state(&self) -> FirehoseState {
        self.lifecycle.lock().state()
    }

    pub fn worker_pool_size(&self) -> usize {
        self.dispatcher.pool_size()
    }

    /// Moves the firehose to `Running` and spawns the time trigger if the
    /// time threshold is enabled. Starting a running firehose is a no-op.
    pub fn start(self: &Arc<Self>) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        match *lifecycle {
            Lifecycle::Running { .. } => {
                debug!(firehose = %self.name, "Firehose already running");
                return Ok(());
            }
            Lifecycle::Stopped { .. } => return Err(Error::EngineStopped(self.name.clone())),
            Lifecycle::Created => {}
        }

        *self.last_flush.lock() = Instant::now();

        let trigger = if self.config.time_trigger_enabled() {
            let cancel = CancellationToken::new();
            let handle = self
                .runtime
                .spawn(run_time_trigger(Arc::downgrade(self), cancel.clone()));
            Some(TimeTrigger { cancel, handle })
        } else {
            None
        };

        info!(
            firehose = %self.name,
            time_trigger = trigger.is_some(),
            "Firehose started"
        );
        *lifecycle = Lifecycle::Running { trigger };
        Ok(())
    }

    /// Buffers a record, flushing if it crosses the count or size threshold.
    ///
    /// Never waits on delivery. Fails only once the firehose has stopped.
    pub fn append(&self, record: impl Into<Record>) -> Result<()> {
        let record = record.into();
        let size = record.approx_size();

        let pending = {
            let mut buffer = self.buffer.lock();
            if buffer.is_closed() {
                metrics().records_rejected.inc();
                return Err(Error::EngineStopped(self.name.clone()));
            }

            buffer.push(record, size);
            self.records_appended.fetch_add(1, Ordering::Relaxed);
            metrics().records_appended.inc();

            should_flush(buffer.count(), buffer.approx_size_bytes(), &self.config)
                .and_then(|reason| self.extract(&mut buffer, reason))
                .map(|batch| (batch, self.dispatcher.track()))
        };

        if let Some((batch, token)) = pending {
            self.dispatcher.spawn(batch, token);
        }
        Ok(())
    }

    /// Stops the time trigger, flushes whatever is buffered and waits until
    /// every delivery has finished.
    ///
    /// Appends are rejected from the moment this is called. The shutdown runs
    /// as its own task, so dropping the returned future does not abandon the
    /// final flush. Later calls wait for that flush and return `None`.
    pub async fn stop(self: &Arc<Self>) -> Option<DispatchReport> {
        let begun = {
            let mut lifecycle = self.lifecycle.lock();
            match &*lifecycle {
                Lifecycle::Stopped { finished } => Err(finished.clone()),
                _ => {
                    let (finished_tx, finished) = watch::channel(false);
                    let trigger =
                        match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped { finished }) {
                            Lifecycle::Running { trigger } => trigger,
                            _ => None,
                        };
                    self.buffer.lock().close();
                    Ok((trigger, finished_tx))
                }
            }
        };

        let (trigger, finished_tx) = match begun {
            Ok(begun) => begun,
            Err(mut finished) => {
                debug!(firehose = %self.name, "Firehose already stopped");
                let _ = finished.wait_for(|done| *done).await;
                return None;
            }
        };

        let firehose = Arc::clone(self);
        let shutdown = self.runtime.spawn(async move {
            let report = firehose.shutdown(trigger).await;
            let _ = finished_tx.send(true);
            report
        });

        match shutdown.await {
            Ok(report) => report,
            Err(e) => {
                error!(firehose = %self.name, error = %e, "Firehose shutdown task failed");
                None
            }
        }
    }

    /// Joins the time trigger, then delivers the final batch and drains
    /// in-flight deliveries. The buffer is already closed.
    async fn shutdown(&self, trigger: Option<TimeTrigger>) -> Option<DispatchReport> {
        if let Some(trigger) = trigger {
            trigger
                .shutdown(&self.name, self.options.shutdown_grace())
                .await;
        }

        let final_batch = {
            let mut buffer = self.buffer.lock();
            self.extract(&mut buffer, FlushReason::Shutdown)
        };

        let report = match final_batch {
            Some(batch) => Some(self.dispatcher.dispatch(batch).await),
            None => None,
        };

        self.dispatcher.shutdown().await;
        info!(firehose = %self.name, "Firehose stopped");
        report
    }

    pub fn stats(&self) -> FirehoseStats {
        let (buffered_count, buffered_approx_size_bytes) = {
            let buffer = self.buffer.lock();
            (buffer.count(), buffer.approx_size_bytes())
        };

        FirehoseStats {
            state: self.state(),
            buffered_count,
            buffered_approx_size_bytes,
            records_appended: self.records_appended.load(Ordering::Relaxed),
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
        }
    }

    /// Flushes if the time threshold has passed since the last flush.
    ///
    /// The window restarts even when there was nothing to flush.
    fn flush_if_time_elapsed(&self) {
        let since = self.last_flush.lock().elapsed();
        if !time_elapsed(since, &self.config) {
            return;
        }

        let pending = {
            let mut buffer = self.buffer.lock();
            *self.last_flush.lock() = Instant::now();
            self.extract(&mut buffer, FlushReason::Time)
                .map(|batch| (batch, self.dispatcher.track()))
        };

        if let Some((batch, token)) = pending {
            self.dispatcher.spawn(batch, token);
        }
    }

    /// Takes everything out of the locked buffer and seals it into a batch.
    fn extract(&self, buffer: &mut Buffer, reason: FlushReason) -> Option<FlushBatch> {
        let taken = buffer.take()?;
        *self.last_flush.lock() = Instant::now();

        let batch = FlushBatch::new(
            self.name.as_str(),
            taken.seq,
            reason,
            taken.records,
            taken.approx_size_bytes,
        );

        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
        metrics().record_flush(reason.as_str(), batch.len());
        info!(
            firehose = %self.name,
            reason = %reason,
            batch_seq = batch.seq,
            records = batch.len(),
            approx_size_bytes = batch.approx_size_bytes,
            "Flushing records"
        );

        Some(batch)
    }
}

impl Drop for Firehose {
    fn drop(&mut self) {
        metrics().active_firehoses.dec();
        let buffer = self.buffer.get_mut();
        if !buffer.is_closed() && !buffer.is_empty() {
            warn!(
                firehose = %self.name,
                records = buffer.count(),
                "Firehose dropped without stop; buffered records discarded"
            );
        }
    }
}

async fn run_time_trigger(firehose: Weak<Firehose>, cancel: CancellationToken) {
    let poll = match firehose.upgrade() {
        Some(firehose) => firehose.options.poll_interval(),
        None => return,
    };

    let mut ticker = interval(poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match firehose.upgrade() {
                    Some(firehose) => firehose.flush_if_time_elapsed(),
                    None => break,
                }
            }
        }
    }
}
