//! Flush trigger evaluation.
//!
//! Count and size are checked on every append while the buffer lock is held.
//! Time is checked by the background task against the last flush instant.

use std::time::Duration;

use crate::batch::FlushReason;
use crate::config::FirehoseConfig;

/// Returns the reason to flush, if the count or size threshold is reached.
pub fn should_flush(count: u64, size_bytes: u64, config: &FirehoseConfig) -> Option<FlushReason> {
    if config.max_records().is_some_and(|max| count >= max) {
        return Some(FlushReason::Count);
    }
    if config.max_size_bytes().is_some_and(|max| size_bytes >= max) {
        return Some(FlushReason::Size);
    }
    None
}

/// Whether the time threshold has passed. Always false when disabled.
pub fn time_elapsed(since_last_flush: Duration, config: &FirehoseConfig) -> bool {
    config
        .max_time()
        .is_some_and(|max| since_last_flush >= max)
}
