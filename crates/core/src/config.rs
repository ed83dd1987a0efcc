//! Trigger thresholds for a single firehose.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::limits::{
    BYTES_PER_MB, DEFAULT_MAX_RECORDS, DEFAULT_MAX_SIZE_MB, DEFAULT_MAX_TIME_SECS, DISABLED,
    MIN_MAX_RECORDS, MIN_MAX_SIZE_BYTES, MIN_MAX_SIZE_MB, MIN_MAX_TIME_SECS,
};

/// Validated, immutable flush thresholds.
///
/// `None` disables a trigger. At least one trigger is always enabled,
/// otherwise the buffer could never flush. Deserialization goes through
/// the same checks as [`FirehoseConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFirehoseConfig")]
pub struct FirehoseConfig {
    max_records: Option<u64>,
    max_time_secs: Option<u64>,
    max_size_bytes: Option<u64>,
}

/// Unvalidated wire form of [`FirehoseConfig`].
#[derive(Deserialize)]
struct RawFirehoseConfig {
    #[serde(default)]
    max_records: Option<u64>,
    #[serde(default)]
    max_time_secs: Option<u64>,
    #[serde(default)]
    max_size_bytes: Option<u64>,
}

impl TryFrom<RawFirehoseConfig> for FirehoseConfig {
    type Error = Error;

    fn try_from(raw: RawFirehoseConfig) -> Result<Self> {
        Self::new(raw.max_records, raw.max_time_secs, raw.max_size_bytes)
    }
}

impl FirehoseConfig {
    /// Creates a config, rejecting out-of-bounds or all-disabled thresholds.
    pub fn new(
        max_records: Option<u64>,
        max_time_secs: Option<u64>,
        max_size_bytes: Option<u64>,
    ) -> Result<Self> {
        if max_records.is_none() && max_time_secs.is_none() && max_size_bytes.is_none() {
            return Err(Error::invalid_config(
                "all",
                "at least one of max_records, max_time_secs, max_size_bytes must be enabled",
            ));
        }

        if let Some(records) = max_records {
            if records < MIN_MAX_RECORDS {
                return Err(Error::invalid_config(
                    "max_records",
                    format!("{} is below the minimum of {}", records, MIN_MAX_RECORDS),
                ));
            }
        }

        if let Some(secs) = max_time_secs {
            if secs < MIN_MAX_TIME_SECS {
                return Err(Error::invalid_config(
                    "max_time_secs",
                    format!("{}s is below the minimum of {}s", secs, MIN_MAX_TIME_SECS),
                ));
            }
        }

        if let Some(bytes) = max_size_bytes {
            if bytes < MIN_MAX_SIZE_BYTES {
                return Err(Error::invalid_config(
                    "max_size_bytes",
                    format!("{} bytes is below the minimum of 1 MB", bytes),
                ));
            }
        }

        Ok(Self {
            max_records,
            max_time_secs,
            max_size_bytes,
        })
    }

    /// Creates a config from the front end's representation, where `-1`
    /// disables a trigger and the size threshold is given in MB.
    pub fn from_sentinels(max_records: i64, max_time_secs: i64, max_size_mb: f64) -> Result<Self> {
        let max_records = sentinel_to_option("max_records", max_records)?;
        let max_time_secs = sentinel_to_option("max_time_secs", max_time_secs)?;

        let max_size_bytes = if max_size_mb == DISABLED as f64 {
            None
        } else if !max_size_mb.is_finite() || max_size_mb < 0.0 {
            return Err(Error::invalid_config(
                "max_size_bytes",
                format!("{} MB is not a valid size", max_size_mb),
            ));
        } else if max_size_mb < MIN_MAX_SIZE_MB {
            // Checked before conversion; rounding would lift it to the minimum.
            return Err(Error::invalid_config(
                "max_size_bytes",
                format!("{} MB is below the minimum of 1 MB", max_size_mb),
            ));
        } else {
            Some((max_size_mb * BYTES_PER_MB as f64).round() as u64)
        };

        Self::new(max_records, max_time_secs, max_size_bytes)
    }

    pub fn max_records(&self) -> Option<u64> {
        self.max_records
    }

    pub fn max_time_secs(&self) -> Option<u64> {
        self.max_time_secs
    }

    pub fn max_time(&self) -> Option<Duration> {
        self.max_time_secs.map(Duration::from_secs)
    }

    pub fn max_size_bytes(&self) -> Option<u64> {
        self.max_size_bytes
    }

    /// Whether the background time trigger is needed.
    pub fn time_trigger_enabled(&self) -> bool {
        self.max_time_secs.is_some()
    }
}

impl Default for FirehoseConfig {
    fn default() -> Self {
        Self {
            max_records: Some(DEFAULT_MAX_RECORDS),
            max_time_secs: Some(DEFAULT_MAX_TIME_SECS),
            max_size_bytes: Some((DEFAULT_MAX_SIZE_MB * BYTES_PER_MB as f64) as u64),
        }
    }
}

fn sentinel_to_option(field: &'static str, value: i64) -> Result<Option<u64>> {
    match value {
        DISABLED => Ok(None),
        v if v < 0 => Err(Error::invalid_config(
            field,
            format!("{} is negative; use -1 to disable", v),
        )),
        v => Ok(Some(v as u64)),
    }
}
