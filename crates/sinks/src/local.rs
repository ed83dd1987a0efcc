//! LocalSink - writes batches to files on the local filesystem

use async_trait::async_trait;
use chrono::Utc;
use firehose_core::{Ack, DeliveryError, Error, FlushBatch, Result, Sink};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::LocalSinkConfig;
use crate::filename::{create_unique, stem};
use crate::format::{encode, partition_label, split_partition};

/// Rows destined for one partition directory.
struct Partition {
    dir: PathBuf,
    rows: Vec<Value>,
}

/// Writes each delivered batch as one file, or one file per partition.
pub struct LocalSink {
    name: String,
    config: LocalSinkConfig,
}

impl LocalSink {
    /// Creates the sink and its output directory.
    pub fn new(config: LocalSinkConfig) -> Result<Self> {
        if config.directory.as_os_str().is_empty() {
            return Err(Error::bad_request("local sink directory must not be empty"));
        }
        std::fs::create_dir_all(&config.directory)?;

        info!(
            directory = %config.directory.display(),
            format = config.output_format.extension(),
            partitions = ?config.partition_cols,
            "Local sink ready"
        );

        Ok(Self {
            name: "local".to_string(),
            config,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    /// Groups rows by partition values, keeping first-seen group order.
    fn partition(&self, batch: &FlushBatch) -> Vec<Partition> {
        let rows = batch.records.iter().map(|r| r.value().clone());

        if self.config.partition_cols.is_empty() {
            return vec![Partition {
                dir: self.config.directory.clone(),
                rows: rows.collect(),
            }];
        }

        let mut groups: Vec<Partition> = Vec::new();
        let mut index: HashMap<Vec<String>, usize> = HashMap::new();

        for mut row in rows {
            let values = split_partition(&mut row, &self.config.partition_cols);
            let labels: Vec<String> = values.iter().map(|v| partition_label(v.as_ref())).collect();

            let slot = *index.entry(labels.clone()).or_insert_with(|| {
                let dir = self
                    .config
                    .partition_cols
                    .iter()
                    .zip(&labels)
                    .fold(self.config.directory.clone(), |dir, (col, label)| {
                        dir.join(format!("{}={}", col, label))
                    });
                groups.push(Partition {
                    dir,
                    rows: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].rows.push(row);
        }

        groups
    }

    async fn write_partition(&self, partition: &Partition, file_stem: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&partition.dir).await?;

        let body = encode(self.config.output_format, &partition.rows)?;
        let (path, mut file) =
            create_unique(&partition.dir, file_stem, self.config.output_format).await?;
        file.write_all(&body).await?;
        file.flush().await?;

        debug!(
            sink = %self.name,
            path = %path.display(),
            rows = partition.rows.len(),
            bytes = body.len(),
            "Wrote output file"
        );
        Ok(path)
    }
}

#[async_trait]
impl Sink for LocalSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, batch: &FlushBatch) -> std::result::Result<Ack, DeliveryError> {
        let file_stem = stem(self.config.filename_strategy, Utc::now());
        let mut ack = Ack::new(batch.len());

        for partition in self.partition(batch) {
            let path = self
                .write_partition(&partition, &file_stem)
                .await
                .map_err(|e| DeliveryError::new(&self.name, e.to_string()))?;
            ack = ack.with_location(path.display().to_string());
        }

        Ok(ack)
    }
}
