//! Logging and in-process metrics for the firehose engine.
//!
//! Metrics live in a process-wide registry of atomics and are exposed as a
//! JSON snapshot by the HTTP front end; there is no external exporter.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::*;
pub use tracing_setup::*;
