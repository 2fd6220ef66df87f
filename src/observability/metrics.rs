//! Metrics collection using metrics-rs.

use metrics::{Counter, Histogram, Unit, counter, histogram};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Whether metrics have been initialized.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

const ITEMS_SUBMITTED: &str = "headless_items_submitted";
const ITEMS_SUCCEEDED: &str = "headless_items_succeeded";
const ITEMS_FAILED: &str = "headless_items_failed";
const EVENTS_DELIVERED: &str = "headless_events_delivered";
const SUBSCRIBERS_DETACHED: &str = "headless_subscribers_detached";
const TRANSFORM_TIME_NS: &str = "headless_transform_time_ns";

/// Initialize metrics descriptions.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    metrics::describe_counter!(
        ITEMS_SUBMITTED,
        Unit::Count,
        "Total number of work items submitted"
    );
    metrics::describe_counter!(
        ITEMS_SUCCEEDED,
        Unit::Count,
        "Total number of work items transformed successfully"
    );
    metrics::describe_counter!(
        ITEMS_FAILED,
        Unit::Count,
        "Total number of work items whose transform failed"
    );
    metrics::describe_counter!(
        EVENTS_DELIVERED,
        Unit::Count,
        "Total number of port events handed to subscribers"
    );
    metrics::describe_counter!(
        SUBSCRIBERS_DETACHED,
        Unit::Count,
        "Subscribers detached after panicking"
    );
    metrics::describe_histogram!(
        TRANSFORM_TIME_NS,
        Unit::Nanoseconds,
        "Time to transform a single work item"
    );
}

/// Metrics handles for one pipeline.
///
/// Cheap to clone; every worker gets its own copy.
#[derive(Clone)]
pub struct PipelineMetrics {
    submitted: Counter,
    succeeded: Counter,
    failed: Counter,
    delivered: Counter,
    detached: Counter,
    transform_time: Histogram,
}

impl PipelineMetrics {
    /// Create metrics labelled with the pipeline name.
    pub fn new(pipeline: &str) -> Self {
        Self {
            submitted: counter!(ITEMS_SUBMITTED, "pipeline" => pipeline.to_string()),
            succeeded: counter!(ITEMS_SUCCEEDED, "pipeline" => pipeline.to_string()),
            failed: counter!(ITEMS_FAILED, "pipeline" => pipeline.to_string()),
            delivered: counter!(EVENTS_DELIVERED, "pipeline" => pipeline.to_string()),
            detached: counter!(SUBSCRIBERS_DETACHED, "pipeline" => pipeline.to_string()),
            transform_time: histogram!(TRANSFORM_TIME_NS, "pipeline" => pipeline.to_string()),
        }
    }

    /// Record a submitted batch.
    #[inline]
    pub fn record_submitted(&self, items: usize) {
        self.submitted.increment(items as u64);
    }

    /// Record a successful item.
    #[inline]
    pub fn record_succeeded(&self) {
        self.succeeded.increment(1);
    }

    /// Record a failed item.
    #[inline]
    pub fn record_failed(&self) {
        self.failed.increment(1);
    }

    /// Record events handed to subscribers.
    #[inline]
    pub fn record_delivered(&self, subscribers: usize) {
        self.delivered.increment(subscribers as u64);
    }

    /// Record a subscriber detached after panicking.
    #[inline]
    pub fn record_detached(&self) {
        self.detached.increment(1);
    }

    /// Record how long one transform took.
    #[inline]
    pub fn record_transform_time(&self, duration: Duration) {
        self.transform_time.record(duration.as_nanos() as f64);
    }
}

impl std::fmt::Debug for PipelineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineMetrics").finish_non_exhaustive()
    }
}
