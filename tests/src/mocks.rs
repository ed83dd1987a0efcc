//! Mock implementations for testing.

use async_trait::async_trait;
use firehose_core::{Ack, DeliveryError, FlushBatch, Sink};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Mock sink that captures batches in memory.
///
/// Implements the same `Sink` trait as the built-in sinks, so tests see
/// exactly what the engine would hand to a real destination.
#[derive(Clone)]
pub struct MockSink {
    name: String,
    /// All batches delivered to this sink.
    batches: Arc<Mutex<Vec<FlushBatch>>>,
    /// Simulate failures if set.
    should_fail: Arc<Mutex<bool>>,
    /// Delay before each delivery completes.
    delay: Option<Duration>,
}

impl MockSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all captured batches.
    pub fn captured_batches(&self) -> Vec<FlushBatch> {
        self.batches.lock().clone()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().len()
    }

    /// Total records across all captured batches.
    pub fn record_count(&self) -> usize {
        self.batches.lock().iter().map(|b| b.len()).sum()
    }

    /// Captured records rendered as strings, in delivery order.
    pub fn record_strings(&self) -> Vec<String> {
        self.batches
            .lock()
            .iter()
            .flat_map(|b| b.records.iter())
            .map(|r| match r.value().as_str() {
                Some(s) => s.to_string(),
                None => r.value().to_string(),
            })
            .collect()
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    pub fn as_sink(&self) -> Arc<dyn Sink> {
        Arc::new(self.clone())
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new("mock")
    }
}

#[async_trait]
impl Sink for MockSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, batch: &FlushBatch) -> Result<Ack, DeliveryError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if *self.should_fail.lock() {
            return Err(DeliveryError::new(&self.name, "mock sink failure"));
        }

        self.batches.lock().push(batch.clone());
        Ok(Ack::new(batch.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firehose_core::{FlushReason, Record};

    fn batch(n: usize) -> FlushBatch {
        let records = (0..n).map(|i| Record::from(format!("m{i}"))).collect();
        FlushBatch::new("test", 1, FlushReason::Count, records, n as u64 * 2)
    }

    #[tokio::test]
    async fn test_mock_sink_captures_batches() {
        let mock = MockSink::default();

        let ack = mock.deliver(&batch(2)).await.unwrap();
        assert_eq!(ack.records, 2);
        assert_eq!(mock.batch_count(), 1);
        assert_eq!(mock.record_strings(), vec!["m0", "m1"]);
    }

    #[tokio::test]
    async fn test_mock_sink_failure_mode() {
        let mock = MockSink::default();
        mock.set_should_fail(true);

        assert!(mock.deliver(&batch(1)).await.is_err());
        assert_eq!(mock.batch_count(), 0);
    }
}
