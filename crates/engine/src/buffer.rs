//! Record accumulation state.
//!
//! The buffer itself is not synchronized; the engine wraps it in a single
//! mutex and performs append, trigger check and extraction under one guard.

use firehose_core::Record;

/// Records removed from the buffer by one extraction.
#[derive(Debug)]
pub struct Taken {
    pub seq: u64,
    pub records: Vec<Record>,
    pub approx_size_bytes: u64,
}

/// Accumulates records between flushes.
#[derive(Debug, Default)]
pub struct Buffer {
    records: Vec<Record>,
    approx_size_bytes: u64,
    /// Sequence number of the last non-empty extraction
    last_seq: u64,
    closed: bool,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record whose size has already been estimated.
    pub fn push(&mut self, record: Record, approx_size: u64) {
        self.records.push(record);
        self.approx_size_bytes = self.approx_size_bytes.saturating_add(approx_size);
    }

    pub fn count(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn approx_size_bytes(&self) -> u64 {
        self.approx_size_bytes
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Moves every record out and resets the running totals.
    ///
    /// Returns `None` for an empty buffer without consuming a sequence number.
    pub fn take(&mut self) -> Option<Taken> {
        if self.records.is_empty() {
            return None;
        }

        self.last_seq += 1;
        let approx_size_bytes = std::mem::take(&mut self.approx_size_bytes);
        Some(Taken {
            seq: self.last_seq,
            records: std::mem::take(&mut self.records),
            approx_size_bytes,
        })
    }

    /// Rejects further appends. Records already buffered stay until taken.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
