//! LogSink - logs batch summaries via tracing

use async_trait::async_trait;
use firehose_core::{Ack, DeliveryError, FlushBatch, Sink};
use tracing::info;

/// Sink that logs a summary of every batch it receives.
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new("log")
    }
}

#[async_trait]
impl Sink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, batch: &FlushBatch) -> Result<Ack, DeliveryError> {
        info!(
            sink = %self.name,
            firehose = %batch.firehose,
            batch_seq = batch.seq,
            reason = %batch.reason,
            records = batch.len(),
            approx_size_bytes = batch.approx_size_bytes,
            created_at = %batch.created_at,
            "Batch received"
        );
        Ok(Ack::new(batch.len()))
    }
}
