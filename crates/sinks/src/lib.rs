//! Built-in sinks
//!
//! - [`LocalSink`]: JSON-lines or CSV files on the local filesystem, optionally
//!   partitioned into `col=value` directories
//! - [`LogSink`]: batch summaries through `tracing`

pub mod config;
pub mod filename;
pub mod format;
pub mod local;
pub mod log;

pub use config::{FilenameStrategy, LocalSinkConfig, OutputFormat, SinkDefinition};
pub use local::LocalSink;
pub use log::LogSink;

use firehose_core::{Result, Sink};
use std::sync::Arc;

/// Builds the sink described by `definition`.
pub fn build(definition: &SinkDefinition) -> Result<Arc<dyn Sink>> {
    let sink: Arc<dyn Sink> = match definition {
        SinkDefinition::Local(config) => Arc::new(LocalSink::new(config.clone())?),
        SinkDefinition::Log => Arc::new(LogSink::default()),
    };
    Ok(sink)
}
