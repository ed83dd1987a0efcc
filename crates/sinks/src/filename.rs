//! Output file naming.

use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};

use crate::config::{FilenameStrategy, OutputFormat};

/// File stem for a delivery made at `now`.
pub fn stem(strategy: FilenameStrategy, now: DateTime<Utc>) -> String {
    match strategy {
        FilenameStrategy::Datetime => now.format("%Y%m%d%H%M%S").to_string(),
        FilenameStrategy::Epoch => now.timestamp().to_string(),
    }
}

/// Creates the first file in `dir` named `<stem>.<ext>` or `<stem>-N.<ext>`
/// that does not exist yet. Existing files are never overwritten, even when
/// two deliveries race for the same name.
pub async fn create_unique(
    dir: &Path,
    stem: &str,
    format: OutputFormat,
) -> std::io::Result<(PathBuf, File)> {
    let ext = format.extension();
    let mut n = 0u32;

    loop {
        let path = if n == 0 {
            dir.join(format!("{}.{}", stem, ext))
        } else {
            dir.join(format!("{}-{}.{}", stem, n, ext))
        };

        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e),
        }
    }
}
