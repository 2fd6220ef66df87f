//! Integration tests for the headless pipeline.

use headless::prelude::*;
use headless::{worker, worker_with_config};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Transform that fails on the payload "bad".
fn rejecting() -> impl Transform<Output = String> {
    FnTransform::new(|name: &str, payload: &str| {
        if payload == "bad" {
            Err(format!("cannot build icon '{name}'"))
        } else {
            Ok(payload.to_string())
        }
    })
}

/// Callback subscriber recording every event it sees.
fn recording(port: &Port<String>) -> Arc<Mutex<Vec<PortEvent<String>>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    port.subscribe(move |event| sink.lock().unwrap().push(event.clone()))
        .unwrap();
    seen
}

#[tokio::test]
async fn test_callback_receives_results_then_done() {
    let handle = worker([("a", "1"), ("b", "2")], Identity).unwrap();
    let seen = recording(handle.ports().output());

    let summary = handle.wait().await.unwrap();
    assert_eq!(summary.succeeded, 2);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen[2].is_done());

    let mut values: Vec<_> = seen
        .iter()
        .filter_map(PortEvent::as_result)
        .map(|r| (r.name.as_str(), r.value.as_str()))
        .collect();
    values.sort();
    assert_eq!(values, [("a", "1"), ("b", "2")]);
}

#[tokio::test]
async fn test_every_subscriber_gets_every_event() {
    let items: Vec<_> = (0..25).map(|i| (format!("icon{i}"), "<svg/>".to_string())).collect();
    let handle = worker(items, Identity).unwrap();

    let first = recording(handle.ports().output());
    let second = recording(handle.ports().output());
    let mut third = handle.ports().output().receiver().unwrap();
    assert_eq!(handle.ports().output().subscriber_count(), 3);

    handle.wait().await.unwrap();

    let mut pulled = Vec::new();
    while let Some(event) = third.recv().await {
        pulled.push(event);
    }

    for events in [first.lock().unwrap().clone(), second.lock().unwrap().clone(), pulled] {
        assert_eq!(events.len(), 26);
        assert_eq!(events.iter().filter(|e| e.is_done()).count(), 1);
        assert!(events.last().unwrap().is_done());
        let names: HashSet<_> = events.iter().filter_map(|e| e.name()).collect();
        assert_eq!(names.len(), 25);
    }
}

#[tokio::test]
async fn test_failure_does_not_block_other_items() {
    let handle = worker([("a", "ok"), ("b", "bad"), ("c", "ok")], rejecting()).unwrap();
    let events = handle.ports().output().receiver().unwrap().collect().await;

    let errors: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            PortEvent::Error(err) => Some(err.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].name, "b");
    assert_eq!(errors[0].cause.to_string(), "cannot build icon 'b'");

    let succeeded: HashSet<_> = events
        .iter()
        .filter_map(PortEvent::as_result)
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(succeeded, HashSet::from(["a", "c"]));

    let summary = handle.wait().await.unwrap();
    assert_eq!(summary.failed, 1);
    assert!(!summary.is_success());
}

#[tokio::test]
async fn test_subscribe_after_completion_fails() {
    let handle = worker([("a", "1")], Identity).unwrap();
    let output = handle.ports().output().clone();
    handle.wait().await.unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let err = output
        .subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap_err();
    assert_eq!(err.port, "output");
    assert!(matches!(output.receiver(), Err(SubscriptionError { .. })));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_batch_emits_only_done() {
    let handle = worker(Vec::<WorkItem>::new(), Identity).unwrap();
    let seen = recording(handle.ports().output());

    let summary = handle.wait().await.unwrap();
    assert_eq!(summary.submitted, 0);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].is_done());
}

#[tokio::test]
async fn test_batch_from_icon_map() {
    let mut icons = BTreeMap::new();
    icons.insert("activity", "<polyline points=\"22 12 18 12\"/>");
    icons.insert("airplay", "<path d=\"M5 17H4\"/>");
    icons.insert("alert-circle", "<circle cx=\"12\" cy=\"12\" r=\"10\"/>");

    let component = FnTransform::new(|name: &str, payload: &str| {
        Ok::<_, std::convert::Infallible>(format!("<svg data-icon=\"{name}\">{payload}</svg>"))
    });

    let factory = Headless::with_config(component, WorkerConfig::sequential().with_name("icons"));
    let handle = factory.submit(Batch::from_map(icons).unwrap()).unwrap();
    let events = handle.ports().output().receiver().unwrap().collect().await;

    let first = events[0].as_result().unwrap();
    assert_eq!(first.name, "activity");
    assert!(first.value.starts_with("<svg data-icon=\"activity\">"));
    assert_eq!(events.len(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_deliveries_are_serialized() {
    let items: Vec<_> = (0..64).map(|i| (format!("n{i}"), i.to_string())).collect();
    let slow = FnTransform::new(|_: &str, payload: &str| {
        std::thread::sleep(Duration::from_millis(1));
        Ok::<_, String>(payload.to_string())
    });
    let handle = worker_with_config(items, slow, WorkerConfig::concurrent(8)).unwrap();

    let in_callback = Arc::new(AtomicUsize::new(0));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let (busy, clashes) = (in_callback.clone(), overlaps.clone());
    handle
        .ports()
        .output()
        .subscribe(move |_| {
            if busy.fetch_add(1, Ordering::SeqCst) != 0 {
                clashes.fetch_add(1, Ordering::SeqCst);
            }
            std::thread::sleep(Duration::from_micros(50));
            busy.fetch_sub(1, Ordering::SeqCst);
        })
        .unwrap();

    let summary = handle.wait().await.unwrap();
    assert_eq!(summary.succeeded, 64);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stream_subscription() {
    use futures::StreamExt;

    let handle = worker([("x", "1"), ("y", "2")], Identity).unwrap();
    let stream = handle.ports().output().receiver().unwrap().into_stream();
    let names: Vec<_> = stream
        .filter_map(|e| async move { e.name().map(str::to_string) })
        .collect()
        .await;

    let names: HashSet<_> = names.into_iter().collect();
    assert_eq!(names, HashSet::from(["x".to_string(), "y".to_string()]));
}

#[tokio::test]
async fn test_custom_subscriber() {
    struct Tally {
        results: Arc<AtomicUsize>,
        done: Arc<AtomicUsize>,
    }

    impl Subscriber<String> for Tally {
        fn on_event(&mut self, event: &PortEvent<String>) {
            match event {
                PortEvent::Done => self.done.fetch_add(1, Ordering::SeqCst),
                _ => self.results.fetch_add(1, Ordering::SeqCst),
            };
        }
    }

    let results = Arc::new(AtomicUsize::new(0));
    let done = Arc::new(AtomicUsize::new(0));

    let handle = worker([("a", "1"), ("b", "bad")], rejecting()).unwrap();
    handle
        .ports()
        .output()
        .subscribe_with(Tally {
            results: results.clone(),
            done: done.clone(),
        })
        .unwrap();
    handle.wait().await.unwrap();

    assert_eq!(results.load(Ordering::SeqCst), 2);
    assert_eq!(done.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_panicking_item_does_not_stop_batch() {
    let explosive = FnTransform::new(|_: &str, payload: &str| {
        if payload == "boom" {
            panic!("boom");
        }
        Ok::<_, String>(payload.to_string())
    });

    let handle = worker([("a", "1"), ("b", "boom"), ("c", "3")], explosive).unwrap();
    let events = handle.ports().output().receiver().unwrap().collect().await;

    assert_eq!(events.len(), 4);
    assert!(events.last().unwrap().is_done());

    let mut values: Vec<_> = events
        .iter()
        .filter_map(PortEvent::as_result)
        .map(|r| (r.name.as_str(), r.value.as_str()))
        .collect();
    values.sort();
    assert_eq!(values, [("a", "1"), ("c", "3")]);

    let errors: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            PortEvent::Error(err) => Some(err.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(
        errors,
        ["transformation of 'b' failed: worker panicked: boom"]
    );

    let summary = handle.wait().await.unwrap();
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
}
