//! Engine lifecycle tests against mock sinks.
//!
//! Cover the delivery guarantees: every appended record reaches every sink
//! exactly once, in order within a batch, across count, size, time and
//! shutdown flushes.

use firehose_core::{limits::BYTES_PER_MB, Error, FirehoseConfig, FlushReason, Sink};
use firehose_engine::{EngineOptions, Firehose, FirehoseState};
use integration_tests::mocks::MockSink;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn config(records: Option<u64>, secs: Option<u64>, bytes: Option<u64>) -> FirehoseConfig {
    FirehoseConfig::new(records, secs, bytes).unwrap()
}

/// Every sink receives every batch.
#[tokio::test]
async fn test_fan_out_to_all_sinks() {
    let sinks: Vec<MockSink> = (0..3).map(|i| MockSink::new(format!("sink-{i}"))).collect();
    let firehose = Firehose::new(
        "fanout",
        sinks.iter().map(MockSink::as_sink).collect(),
        config(Some(10), None, None),
    )
    .unwrap();
    firehose.start().unwrap();

    for i in 0..23 {
        firehose.append(format!("m{i}")).unwrap();
    }
    firehose.stop().await;

    for sink in &sinks {
        assert_eq!(sink.batch_count(), 3);
        assert_eq!(sink.record_count(), 23);
        let reasons: Vec<FlushReason> = sink
            .captured_batches()
            .iter()
            .map(|b| b.reason)
            .collect();
        assert_eq!(
            reasons.iter().filter(|r| **r == FlushReason::Shutdown).count(),
            1
        );
    }
}

/// A failing sink neither blocks nor loses data for healthy sinks.
#[tokio::test]
async fn test_failing_sink_is_isolated() {
    let failing = MockSink::new("failing");
    failing.set_should_fail(true);
    let healthy = MockSink::new("healthy");

    let firehose = Firehose::new(
        "isolated",
        vec![failing.as_sink(), healthy.as_sink()],
        config(Some(10), None, None),
    )
    .unwrap();
    firehose.start().unwrap();

    for i in 0..30 {
        firehose.append(format!("m{i}")).unwrap();
    }
    firehose.stop().await;

    assert_eq!(failing.record_count(), 0);
    assert_eq!(healthy.record_count(), 30);
    assert_eq!(firehose.stats().batches_flushed, 3);
}

/// Stop returns only after slow sinks have finished every batch.
#[tokio::test(start_paused = true)]
async fn test_stop_waits_for_slow_deliveries() {
    let slow = MockSink::new("slow").with_delay(Duration::from_secs(30));
    let firehose = Firehose::new("slow", vec![slow.as_sink()], config(Some(10), None, None)).unwrap();
    firehose.start().unwrap();

    for i in 0..15 {
        firehose.append(format!("m{i}")).unwrap();
    }
    assert_eq!(slow.batch_count(), 0);

    let report = firehose.stop().await.unwrap();
    assert_eq!(report.records, 5);
    assert_eq!(slow.batch_count(), 2);
    assert_eq!(slow.record_count(), 15);
}

/// Time trigger delivers a partial buffer once the window passes.
#[tokio::test(start_paused = true)]
async fn test_time_flush_with_virtual_clock() {
    let sink = MockSink::default();
    let firehose = Firehose::new(
        "timed",
        vec![sink.as_sink()],
        config(Some(100), Some(60), None),
    )
    .unwrap();
    firehose.start().unwrap();

    for i in 0..3 {
        firehose.append(format!("m{i}")).unwrap();
    }
    tokio::time::sleep(Duration::from_secs(61)).await;

    let batches = sink.captured_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].reason, FlushReason::Time);
    assert_eq!(sink.record_strings(), vec!["m0", "m1", "m2"]);
    assert_eq!(firehose.stats().buffered_count, 0);

    firehose.stop().await;
    assert_eq!(sink.batch_count(), 1);
}

/// A custom poll interval still flushes within one poll of the deadline.
#[tokio::test(start_paused = true)]
async fn test_custom_poll_interval() {
    let sink = MockSink::default();
    let options = EngineOptions {
        poll_interval_ms: 5_000,
        ..EngineOptions::default()
    };
    let firehose = Firehose::with_options(
        "polled",
        vec![sink.as_sink()],
        config(None, Some(60), None),
        options,
    )
    .unwrap();
    firehose.start().unwrap();

    firehose.append("tick").unwrap();
    tokio::time::sleep(Duration::from_secs(59)).await;
    assert_eq!(sink.batch_count(), 0);

    tokio::time::sleep(Duration::from_secs(7)).await;
    assert_eq!(sink.batch_count(), 1);

    firehose.stop().await;
}

/// Size trigger counts approximate bytes, not records.
#[tokio::test]
async fn test_size_flush() {
    let sink = MockSink::default();
    let firehose = Firehose::new(
        "sized",
        vec![sink.as_sink()],
        config(None, None, Some(BYTES_PER_MB)),
    )
    .unwrap();
    firehose.start().unwrap();

    let chunk = "x".repeat(256 * 1024);
    for _ in 0..4 {
        firehose.append(chunk.clone()).unwrap();
    }
    assert_eq!(firehose.stats().buffered_count, 0);
    firehose.stop().await;

    let batches = sink.captured_batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].reason, FlushReason::Size);
    assert_eq!(batches[0].approx_size_bytes, BYTES_PER_MB);
}

/// Concurrent producers: no loss, no duplication, batches never exceed the count.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_conservation_under_concurrency() {
    let sink = MockSink::default();
    let firehose = Firehose::new(
        "busy",
        vec![sink.as_sink()],
        config(Some(10), Some(60), Some(BYTES_PER_MB)),
    )
    .unwrap();
    firehose.start().unwrap();

    let producers: Vec<_> = (0..10)
        .map(|p| {
            let firehose = Arc::clone(&firehose);
            tokio::spawn(async move {
                for i in 0..101 {
                    firehose.append(format!("p{p}-m{i}")).unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }
    firehose.stop().await;

    // Background deliveries may arrive out of order; extraction order is `seq`.
    let mut batches = sink.captured_batches();
    batches.sort_by_key(|b| b.seq);
    assert!(batches.iter().all(|b| b.len() <= 10));

    let records: Vec<String> = batches
        .iter()
        .flat_map(|b| b.records.iter())
        .map(|r| r.value().as_str().unwrap().to_string())
        .collect();
    let unique: HashSet<&String> = records.iter().collect();
    assert_eq!(records.len(), 1010);
    assert_eq!(unique.len(), 1010);

    // Per-producer order is preserved in extraction order.
    for p in 0..10 {
        let prefix = format!("p{p}-");
        let ordered: Vec<usize> = records
            .iter()
            .filter(|r| r.starts_with(&prefix))
            .map(|r| r[prefix.len() + 1..].parse().unwrap())
            .collect();
        let mut sorted = ordered.clone();
        sorted.sort_unstable();
        assert_eq!(ordered, sorted);
    }
}

/// Stopped is terminal: no appends, no restart, stop is idempotent.
#[tokio::test]
async fn test_lifecycle_transitions() {
    let sink = MockSink::default();
    let firehose = Firehose::new("cycle", vec![sink.as_sink()], FirehoseConfig::default()).unwrap();
    assert_eq!(firehose.state(), FirehoseState::Created);

    firehose.start().unwrap();
    assert_eq!(firehose.state(), FirehoseState::Running);

    firehose.append("last").unwrap();
    assert!(firehose.stop().await.is_some());
    assert_eq!(firehose.state(), FirehoseState::Stopped);

    assert!(firehose.stop().await.is_none());
    assert!(matches!(firehose.append("late"), Err(Error::EngineStopped(_))));
    assert!(matches!(firehose.start(), Err(Error::EngineStopped(_))));
    assert_eq!(sink.record_strings(), vec!["last"]);
}

/// Construction rejects an empty sink list.
#[tokio::test]
async fn test_requires_at_least_one_sink() {
    let sinks: Vec<Arc<dyn Sink>> = Vec::new();
    let result = Firehose::new("none", sinks, FirehoseConfig::default());
    assert!(matches!(result, Err(Error::NoSinksProvided)));
}
