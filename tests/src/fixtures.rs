//! Test fixtures and request builders.

use serde_json::{json, Value};
use std::path::Path;

/// Create request for a firehose writing JSON lines into `dir`.
pub fn local_firehose(name: &str, dir: &Path) -> Value {
    json!({
        "name": name,
        "buffer-count": 10,
        "buffer-time": 60,
        "buffer-size": 1,
        "sink": "local",
        "sink-config": {
            "directory": dir,
            "output-format": "json"
        }
    })
}

/// Create request for a firehose writing partitioned CSV into `dir`.
pub fn partitioned_csv_firehose(name: &str, dir: &Path, partition: &str) -> Value {
    json!({
        "name": name,
        "buffer-count": 10,
        "buffer-time": -1,
        "buffer-size": -1,
        "sink": "local",
        "sink-config": {
            "directory": dir,
            "output-format": "csv",
            "partition-cols": [partition]
        }
    })
}

/// Create request for a firehose that only logs its batches.
pub fn log_firehose(name: &str) -> Value {
    json!({ "name": name, "sink": "log" })
}

/// Message body for POST /minifirehoses/:name/message.
pub fn message(value: impl Into<Value>) -> Value {
    json!({ "message": value.into() })
}

/// `n` string messages `message-0` .. `message-{n-1}`.
pub fn messages(n: usize) -> Vec<Value> {
    (0..n).map(|i| message(format!("message-{i}"))).collect()
}

/// Sales rows used for partitioning tests.
pub fn sales_rows() -> Vec<Value> {
    vec![
        json!({"SalesAmount": 310, "Salesperson": "Alice", "Region": "East"}),
        json!({"SalesAmount": 320, "Salesperson": "Charlie", "Region": "East"}),
        json!({"SalesAmount": 230, "Salesperson": "Alice", "Region": "North"}),
        json!({"SalesAmount": 180, "Salesperson": "Bob", "Region": "North"}),
        json!({"SalesAmount": 150, "Salesperson": "Bob", "Region": "South"}),
        json!({"SalesAmount": 290, "Salesperson": "Charlie", "Region": "South"}),
        json!({"SalesAmount": 210, "Salesperson": "Alice", "Region": "West"}),
        json!({"SalesAmount": 200, "Salesperson": "Bob", "Region": "West"}),
        json!({"SalesAmount": 100, "Salesperson": "Dana", "Region": "West"}),
        json!({"SalesAmount": 120, "Salesperson": "Eve", "Region": "East"}),
    ]
}
