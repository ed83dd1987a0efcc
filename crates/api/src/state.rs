//! Application state shared across handlers.

use firehose_core::{Error, Result};
use firehose_engine::{EngineOptions, Firehose};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use telemetry::metrics;
use tracing::{info, warn};

/// Running firehoses by name.
///
/// Insert and remove are exclusive under one lock, so a name maps to at
/// most one firehose and a removed firehose is stopped by exactly one caller.
#[derive(Default)]
pub struct FirehoseRegistry {
    firehoses: RwLock<HashMap<String, Arc<Firehose>>>,
}

impl FirehoseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.firehoses.read().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<Arc<Firehose>> {
        self.firehoses
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Sorted list of registered names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.firehoses.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.firehoses.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers `firehose` under its name, failing if the name is taken.
    pub fn insert(&self, firehose: Arc<Firehose>) -> Result<()> {
        let mut firehoses = self.firehoses.write();
        if firehoses.contains_key(firehose.name()) {
            return Err(Error::AlreadyExists(firehose.name().to_string()));
        }
        firehoses.insert(firehose.name().to_string(), firehose);
        Ok(())
    }

    /// Unregisters a firehose. The caller owns stopping it.
    pub fn remove(&self, name: &str) -> Result<Arc<Firehose>> {
        self.firehoses
            .write()
            .remove(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Stops every registered firehose, flushing what they still buffer.
    pub async fn shutdown_all(&self) {
        let drained: Vec<Arc<Firehose>> = self.firehoses.write().drain().map(|(_, f)| f).collect();
        if drained.is_empty() {
            return;
        }

        info!(firehoses = drained.len(), "Stopping all firehoses");
        for firehose in drained {
            if let Some(report) = firehose.stop().await {
                if !report.all_delivered() {
                    warn!(
                        firehose = %firehose.name(),
                        failed = report.failed,
                        "Final flush was not delivered to every sink"
                    );
                }
            }
        }
        info!(
            active = metrics().active_firehoses.get(),
            "All firehoses stopped"
        );
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<FirehoseRegistry>,
    /// Applied to every firehose created through the API
    pub options: EngineOptions,
    started_at: Instant,
}

impl AppState {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            registry: Arc::new(FirehoseRegistry::new()),
            options,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}
