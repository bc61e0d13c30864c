// Integration tests for the dispatch queue: FIFO order, the
// one-in-flight invariant, size filtering at dequeue, and error-driven
// backlog shedding.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use common::{eventually, make_result, make_segment, ScriptedClassifier, ScriptedOutcome};
use voicemood::pipeline::DispatchEvent;
use voicemood::{Classifier, DispatchQueue, DispatchTuning, Emotion, SegmentFilter};

fn fast_tuning(shed_threshold: usize) -> DispatchTuning {
    DispatchTuning {
        shed_threshold,
        dispatch_delay: Duration::from_millis(10),
        skip_delay: Duration::from_millis(1),
    }
}

async fn next_event(rx: &mut mpsc::Receiver<DispatchEvent>) -> DispatchEvent {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for dispatch event")
        .expect("event channel closed")
}

async fn next_failure(rx: &mut mpsc::Receiver<DispatchEvent>) -> String {
    loop {
        if let DispatchEvent::Failed(message) = next_event(rx).await {
            return message;
        }
    }
}

#[tokio::test]
async fn segments_dispatch_in_fifo_order_one_at_a_time() {
    let classifier = ScriptedClassifier::with_call_delay(Duration::from_millis(30));
    let (events_tx, mut events_rx) = mpsc::channel(64);
    let queue = DispatchQueue::new(
        classifier.clone() as Arc<dyn Classifier>,
        SegmentFilter::new(100),
        fast_tuning(10),
        events_tx,
    );

    let segments: Vec<_> = (0..5u8)
        .map(|i| make_segment("session-a", 200, i))
        .collect();
    for segment in segments.clone() {
        queue.enqueue(segment).await;
    }

    // Default scripted outcome is "skipped"; one Skipped event per segment.
    let mut skips = 0;
    while skips < 5 {
        if matches!(next_event(&mut events_rx).await, DispatchEvent::Skipped) {
            skips += 1;
        }
    }

    let log = classifier.analyze_log.lock().await;
    assert_eq!(log.len(), 5);
    for (request, segment) in log.iter().zip(&segments) {
        assert_eq!(request.audio, segment.to_data_uri(), "FIFO order violated");
        assert_eq!(request.session_id, "session-a");
    }
    drop(log);

    assert_eq!(
        classifier.max_in_flight(),
        1,
        "two segments were in flight concurrently"
    );
}

#[tokio::test]
async fn undersized_segments_never_reach_the_classifier() {
    let classifier = ScriptedClassifier::new();
    let (events_tx, mut events_rx) = mpsc::channel(64);
    let queue = DispatchQueue::new(
        classifier.clone() as Arc<dyn Classifier>,
        SegmentFilter::new(5000),
        fast_tuning(3),
        events_tx,
    );

    // Worker-side defensive check: these arrive in the queue but must be
    // discarded at dequeue.
    queue.enqueue(make_segment("session-a", 10, 1)).await;
    queue.enqueue(make_segment("session-a", 4999, 2)).await;
    queue.enqueue(make_segment("session-a", 5000, 3)).await;

    // Only the third segment produces an event.
    assert!(matches!(
        next_event(&mut events_rx).await,
        DispatchEvent::Analyzing
    ));
    assert!(matches!(
        next_event(&mut events_rx).await,
        DispatchEvent::Skipped
    ));

    let log = classifier.analyze_log.lock().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].audio, make_segment("session-a", 5000, 3).to_data_uri());
}

#[tokio::test]
async fn error_with_backlog_over_threshold_clears_everything() {
    let classifier = ScriptedClassifier::with_call_delay(Duration::from_millis(50));
    classifier
        .script_many((0..6).map(|i| ScriptedOutcome::Fail(format!("boom {}", i))))
        .await;

    let (events_tx, mut events_rx) = mpsc::channel(64);
    let queue = DispatchQueue::new(
        classifier.clone() as Arc<dyn Classifier>,
        SegmentFilter::new(100),
        fast_tuning(3),
        events_tx,
    );

    // Six valid segments; the first goes in flight, five pile up behind it.
    for i in 0..6u8 {
        queue.enqueue(make_segment("session-a", 200, i)).await;
    }

    next_failure(&mut events_rx).await;

    // 5 pending > threshold 3: the whole backlog is dropped at once.
    eventually("queue to shed its backlog", || async {
        queue.pending_len().await == 0
    })
    .await;

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(
        classifier.analyze_count().await,
        1,
        "shed segments must never be dispatched"
    );
}

#[tokio::test]
async fn repeated_failures_shed_the_pending_suffix() {
    // The shedding scenario: four valid segments, three failing
    // transmissions, and the fourth never reaches the classifier. The
    // threshold is tightened to zero so the first failure with anything
    // pending sheds it.
    let classifier = ScriptedClassifier::with_call_delay(Duration::from_millis(50));
    classifier
        .script_many((0..3).map(|i| ScriptedOutcome::Fail(format!("down {}", i))))
        .await;

    let (events_tx, mut events_rx) = mpsc::channel(64);
    let queue = DispatchQueue::new(
        classifier.clone() as Arc<dyn Classifier>,
        SegmentFilter::new(100),
        fast_tuning(0),
        events_tx,
    );

    // Two failures with an empty backlog: nothing to shed, queue keeps going.
    queue.enqueue(make_segment("session-a", 200, 1)).await;
    next_failure(&mut events_rx).await;
    queue.enqueue(make_segment("session-a", 200, 2)).await;
    next_failure(&mut events_rx).await;

    // Third failure happens with the fourth segment pending; it is shed.
    queue.enqueue(make_segment("session-a", 200, 3)).await;
    queue.enqueue(make_segment("session-a", 200, 4)).await;
    next_failure(&mut events_rx).await;

    eventually("queue to be empty after the third failure", || async {
        queue.pending_len().await == 0
    })
    .await;

    tokio::time::sleep(Duration::from_millis(150)).await;

    let log = classifier.analyze_log.lock().await;
    assert_eq!(log.len(), 3, "fourth segment must never be dispatched");
    let fourth = make_segment("session-a", 200, 4).to_data_uri();
    assert!(log.iter().all(|request| request.audio != fourth));
}

#[tokio::test]
async fn queue_continues_after_a_single_failure() {
    let classifier = ScriptedClassifier::new();
    classifier
        .script_many([
            ScriptedOutcome::Fail("transient".to_string()),
            ScriptedOutcome::Classify(make_result(Emotion::Calm, 0.8)),
        ])
        .await;

    let (events_tx, mut events_rx) = mpsc::channel(64);
    let queue = DispatchQueue::new(
        classifier.clone() as Arc<dyn Classifier>,
        SegmentFilter::new(100),
        fast_tuning(3),
        events_tx,
    );

    queue.enqueue(make_segment("session-a", 200, 1)).await;
    next_failure(&mut events_rx).await;

    // A per-segment error never aborts the pipeline.
    queue.enqueue(make_segment("session-a", 200, 2)).await;
    loop {
        if let DispatchEvent::Completed(result) = next_event(&mut events_rx).await {
            assert_eq!(result.emotion, Emotion::Calm);
            break;
        }
    }

    assert_eq!(classifier.analyze_count().await, 2);
}

#[tokio::test]
async fn skip_and_completion_events_carry_through() {
    let classifier = ScriptedClassifier::new();
    classifier
        .script_many([
            ScriptedOutcome::Skip,
            ScriptedOutcome::Classify(make_result(Emotion::Happy, 0.92)),
        ])
        .await;

    let (events_tx, mut events_rx) = mpsc::channel(64);
    let queue = DispatchQueue::new(
        classifier.clone() as Arc<dyn Classifier>,
        SegmentFilter::new(100),
        fast_tuning(3),
        events_tx,
    );

    queue.enqueue(make_segment("session-a", 200, 1)).await;
    queue.enqueue(make_segment("session-a", 200, 2)).await;

    assert!(matches!(
        next_event(&mut events_rx).await,
        DispatchEvent::Analyzing
    ));
    assert!(matches!(
        next_event(&mut events_rx).await,
        DispatchEvent::Skipped
    ));
    assert!(matches!(
        next_event(&mut events_rx).await,
        DispatchEvent::Analyzing
    ));
    match next_event(&mut events_rx).await {
        DispatchEvent::Completed(result) => {
            assert_eq!(result.emotion, Emotion::Happy);
            assert!((result.confidence - 0.92).abs() < f32::EPSILON);
        }
        other => panic!("expected completion, got {:?}", other),
    }
}
