//! Mini firehose engine
//!
//! Buffers records in memory and delivers them to sinks in batches when a
//! count, size or time threshold is reached, or when the firehose stops.

pub mod buffer;
pub mod dispatcher;
pub mod engine;
pub mod options;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use engine::{Firehose, FirehoseState, FirehoseStats};
pub use options::EngineOptions;
