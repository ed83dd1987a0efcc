//! Trigger bounds and engine defaults.
//!
//! The lower bounds keep a misconfigured firehose from degenerating into
//! per-record delivery. The defaults match the HTTP front end's defaults.

// === Trigger Lower Bounds ===

/// Smallest accepted record-count threshold.
pub const MIN_MAX_RECORDS: u64 = 10;

/// Smallest accepted time threshold in seconds.
pub const MIN_MAX_TIME_SECS: u64 = 60;

/// One mebibyte, the unit of the size threshold exposed to callers.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Smallest accepted size threshold in MB, as given by callers.
pub const MIN_MAX_SIZE_MB: f64 = 1.0;

/// Smallest accepted size threshold in bytes (1MB).
pub const MIN_MAX_SIZE_BYTES: u64 = BYTES_PER_MB;

/// Value that disables a trigger in sentinel form.
pub const DISABLED: i64 = -1;

// === Engine Defaults ===

/// Default record-count threshold.
pub const DEFAULT_MAX_RECORDS: u64 = 10;

/// Default time threshold in seconds.
pub const DEFAULT_MAX_TIME_SECS: u64 = 60;

/// Default size threshold in MB.
pub const DEFAULT_MAX_SIZE_MB: f64 = 1.0;

/// Upper bound on concurrent sink deliveries per firehose.
pub const DEFAULT_DELIVERY_WORKERS: usize = 10;

/// How often the time-trigger task wakes up (milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// How long `stop` waits for the time-trigger task (seconds).
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;
