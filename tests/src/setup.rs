//! Common test setup functions.

use api::{router, AppState};
use axum::Router;
use axum_test::TestServer;
use firehose_engine::EngineOptions;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test context with the real router and a scratch output directory.
///
/// Exercises the same code paths as the server binary: the Axum router
/// with all layers, the shared registry and the built-in sinks.
pub struct TestContext {
    pub state: AppState,
    pub router: Router,
    pub output: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        let state = AppState::new(options);
        let router = router(state.clone());
        let output = tempfile::tempdir().expect("Failed to create output directory");

        Self {
            state,
            router,
            output,
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }

    /// Directory for one firehose's output under the scratch directory.
    pub fn output_dir(&self, name: &str) -> PathBuf {
        self.output.path().join(name)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// All regular files under `dir`, sorted by path.
pub fn output_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    files
}

/// Every JSON line across every file under `dir`.
pub fn read_json_lines(dir: &Path) -> Vec<Value> {
    output_files(dir)
        .iter()
        .flat_map(|path| {
            std::fs::read_to_string(path)
                .expect("Failed to read output file")
                .lines()
                .map(|line| serde_json::from_str(line).expect("Invalid JSON line"))
                .collect::<Vec<Value>>()
        })
        .collect()
}
