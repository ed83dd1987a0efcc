//! Error handling tests for the HTTP front end.
//!
//! Every error is a JSON body `{ error, code }` with a matching status.

use axum::http::StatusCode;
use integration_tests::{fixtures, setup::TestContext};
use serde_json::{json, Value};

fn assert_error(body: &Value, code: &str) {
    assert_eq!(body["code"], code, "unexpected error body: {body}");
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

/// Creating a name twice is a conflict and leaves the first firehose intact.
#[tokio::test]
async fn test_duplicate_name_conflict() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/minifirehoses")
        .json(&fixtures::log_firehose("dup"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/minifirehoses")
        .json(&fixtures::log_firehose("dup"))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_error(&response.json(), "FIREHOSE_002");

    let names: Vec<String> = server.get("/minifirehoses").await.json();
    assert_eq!(names, vec!["dup"]);

    ctx.state.registry.shutdown_all().await;
}

/// Thresholds below their minimum are rejected and nothing is registered.
#[tokio::test]
async fn test_invalid_thresholds_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let cases = [
        json!({ "name": "a", "sink": "log", "buffer-count": 9 }),
        json!({ "name": "b", "sink": "log", "buffer-time": 59 }),
        json!({ "name": "c", "sink": "log", "buffer-size": 0.5 }),
        json!({ "name": "d", "sink": "log", "buffer-count": -1, "buffer-time": -1, "buffer-size": -1 }),
    ];

    for body in cases {
        let response = server.post("/minifirehoses").json(&body).await;
        response.assert_status_bad_request();
        assert_error(&response.json(), "CONFIG_001");
    }

    let names: Vec<String> = server.get("/minifirehoses").await.json();
    assert!(names.is_empty());
}

/// Unknown sinks and malformed sink configs are bad requests.
#[tokio::test]
async fn test_invalid_sink_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let cases = [
        json!({ "name": "s3", "sink": "s3", "sink-config": { "bucket": "b" } }),
        json!({ "name": "nodir", "sink": "local" }),
        json!({ "name": "parquet", "sink": "local", "sink-config": {
            "directory": ctx.output_dir("parquet"),
            "output-format": "parquet"
        }}),
    ];

    for body in cases {
        let response = server.post("/minifirehoses").json(&body).await;
        response.assert_status_bad_request();
        assert_error(&response.json(), "REQUEST_001");
    }
}

/// Malformed bodies and names are bad requests.
#[tokio::test]
async fn test_malformed_requests_rejected() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/minifirehoses")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;
    response.assert_status_bad_request();
    assert_error(&response.json(), "REQUEST_001");

    let response = server
        .post("/minifirehoses")
        .json(&fixtures::log_firehose("bad name"))
        .await;
    response.assert_status_bad_request();

    server
        .post("/minifirehoses")
        .json(&fixtures::log_firehose("ok"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/minifirehoses/ok/message")
        .json(&json!({ "msg": "wrong field" }))
        .await;
    response.assert_status_bad_request();
    assert_error(&response.json(), "REQUEST_001");

    ctx.state.registry.shutdown_all().await;
}

/// Unknown names are 404 on every per-firehose route.
#[tokio::test]
async fn test_unknown_firehose_not_found() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.delete("/minifirehoses/missing").await;
    response.assert_status_not_found();
    assert_error(&response.json(), "FIREHOSE_003");

    let response = server
        .post("/minifirehoses/missing/message")
        .json(&fixtures::message("hello"))
        .await;
    response.assert_status_not_found();

    let response = server.get("/minifirehoses/missing/stats").await;
    response.assert_status_not_found();
}

/// A deleted firehose is gone; deleting again is 404 and the name can be reused.
#[tokio::test]
async fn test_delete_then_reuse_name() {
    let ctx = TestContext::new();
    let server = ctx.server();

    server
        .post("/minifirehoses")
        .json(&fixtures::log_firehose("reuse"))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .delete("/minifirehoses/reuse")
        .await
        .assert_status_ok();
    server
        .delete("/minifirehoses/reuse")
        .await
        .assert_status_not_found();

    server
        .post("/minifirehoses")
        .json(&fixtures::log_firehose("reuse"))
        .await
        .assert_status(StatusCode::CREATED);

    ctx.state.registry.shutdown_all().await;
}
