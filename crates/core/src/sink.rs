//! Sink contract consumed by the engine.

use async_trait::async_trait;

use crate::batch::FlushBatch;
use crate::error::DeliveryError;

/// Acknowledgement of a successful delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    /// Records persisted or transmitted
    pub records: usize,
    /// Destinations written (files, partitions, ...)
    pub locations: Vec<String>,
}

impl Ack {
    pub fn new(records: usize) -> Self {
        Self {
            records,
            locations: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.locations.push(location.into());
        self
    }
}

/// A delivery destination for flushed batches.
///
/// Implementations must tolerate concurrent calls from different firehoses.
/// The engine calls `deliver` at most once per sink per flush and never
/// retries; retry policy belongs to the sink.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one batch.
    async fn deliver(&self, batch: &FlushBatch) -> Result<Ack, DeliveryError>;
}
