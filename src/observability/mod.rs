//! Observability features: metrics and tracing.
//!
//! - **Metrics**: counters and histograms via `metrics-rs`
//! - **Tracing**: structured logging and spans via `tracing`
//!
//! ## Metrics
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `headless_items_submitted` | Counter | Work items submitted |
//! | `headless_items_succeeded` | Counter | Items transformed successfully |
//! | `headless_items_failed` | Counter | Items whose transform failed |
//! | `headless_events_delivered` | Counter | Events handed to subscribers |
//! | `headless_subscribers_detached` | Counter | Subscribers dropped after a panic |
//! | `headless_transform_time_ns` | Histogram | Transform time per item |
//!
//! Install any `metrics` recorder (prometheus, statsd, ...) to collect them.

mod metrics;
mod tracing_support;

pub use self::metrics::{PipelineMetrics, init_metrics};
pub use self::tracing_support::{
    span_pipeline, span_worker, trace_completed, trace_item_failed, trace_item_succeeded,
};
