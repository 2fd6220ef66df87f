//! Tracing integration for structured logging and spans.

use tracing::{Level, Span, span};

/// Create a span for a pipeline run.
///
/// # Example
///
/// ```rust,ignore
/// use headless::observability::span_pipeline;
///
/// let span = span_pipeline("icons", 42);
/// let _guard = span.enter();
/// ```
#[inline]
pub fn span_pipeline(name: &str, items: usize) -> Span {
    span!(Level::INFO, "pipeline", name = %name, items = items)
}

/// Create a span for one worker transforming one item.
#[inline]
pub fn span_worker(pipeline: &str, item: &str) -> Span {
    span!(Level::DEBUG, "worker", pipeline = %pipeline, item = %item)
}

/// Log a successfully transformed item.
#[inline]
pub fn trace_item_succeeded(pipeline: &str, item: &str) {
    tracing::debug!(pipeline = %pipeline, item = %item, "item transformed");
}

/// Log a failed item.
#[inline]
pub fn trace_item_failed(pipeline: &str, item: &str, error: &dyn std::error::Error) {
    tracing::warn!(
        pipeline = %pipeline,
        item = %item,
        error = %error,
        "item transformation failed"
    );
}

/// Log pipeline completion.
#[inline]
pub fn trace_completed(pipeline: &str, succeeded: usize, failed: usize) {
    tracing::info!(
        pipeline = %pipeline,
        succeeded = succeeded,
        failed = failed,
        "pipeline completed"
    );
}
