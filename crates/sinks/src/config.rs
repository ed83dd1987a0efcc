//! Sink configuration as accepted by the HTTP front end.

use firehose_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// File format written by the local sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// How output file names are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilenameStrategy {
    /// `%Y%m%d%H%M%S`
    #[default]
    Datetime,
    /// Unix seconds
    Epoch,
}

/// Configuration for [`crate::LocalSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LocalSinkConfig {
    pub directory: PathBuf,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub partition_cols: Vec<String>,
    #[serde(default, alias = "filename-based-on")]
    pub filename_strategy: FilenameStrategy,
}

impl LocalSinkConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            output_format: OutputFormat::default(),
            partition_cols: Vec::new(),
            filename_strategy: FilenameStrategy::default(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_partitions<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partition_cols = cols.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_filename_strategy(mut self, strategy: FilenameStrategy) -> Self {
        self.filename_strategy = strategy;
        self
    }
}

/// A sink selected by kind plus its kind-specific options.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkDefinition {
    Local(LocalSinkConfig),
    Log,
}

impl SinkDefinition {
    /// Resolves a sink kind and its raw JSON options.
    pub fn parse(kind: &str, config: Option<&Value>) -> Result<Self> {
        match kind {
            "local" => {
                let config = config.ok_or_else(|| {
                    Error::bad_request("sink-config is required for the local sink")
                })?;
                let config: LocalSinkConfig = serde_json::from_value(config.clone())
                    .map_err(|e| Error::bad_request(format!("invalid local sink config: {}", e)))?;
                Ok(Self::Local(config))
            }
            "log" => Ok(Self::Log),
            other => Err(Error::bad_request(format!("unsupported sink: {}", other))),
        }
    }
}
