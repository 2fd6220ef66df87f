//! Serialized delivery of worker outcomes to port subscribers.

use crate::observability::{PipelineMetrics, trace_completed};
use crate::pipeline::PipelineSummary;
use crate::port::{BoxedSubscriber, Port, PortEvent};
use kanal::AsyncReceiver;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Drains the result-aggregation channel into a port.
///
/// A single dispatcher owns the subscriber list, so no subscriber is ever
/// called concurrently.
pub(crate) struct Dispatcher<T> {
    pub(crate) pipeline: Arc<str>,
    pub(crate) port: Port<T>,
    pub(crate) outcomes: AsyncReceiver<PortEvent<T>>,
    pub(crate) expected: usize,
    pub(crate) metrics: PipelineMetrics,
}

impl<T: Clone + Send + 'static> Dispatcher<T> {
    /// Deliver every outcome, then the completion signal.
    pub(crate) async fn run(self) -> PipelineSummary {
        self.port.opened().await;

        let mut summary = PipelineSummary {
            pipeline: self.pipeline.to_string(),
            submitted: self.expected,
            succeeded: 0,
            failed: 0,
        };
        let mut subscribers: Vec<BoxedSubscriber<T>> = Vec::new();

        for _ in 0..self.expected {
            let event = match self.outcomes.recv().await {
                Ok(event) => event,
                Err(_) => {
                    tracing::error!(
                        pipeline = %self.pipeline,
                        received = summary.succeeded + summary.failed,
                        expected = self.expected,
                        "worker channel closed early"
                    );
                    break;
                }
            };

            match &event {
                PortEvent::Result(_) => summary.succeeded += 1,
                PortEvent::Error(_) => summary.failed += 1,
                PortEvent::Done => continue,
            }

            self.port.adopt_pending(&mut subscribers);
            self.deliver(&mut subscribers, &event);
        }

        self.port.complete(&mut subscribers);
        self.deliver(&mut subscribers, &PortEvent::Done);
        drop(subscribers);

        trace_completed(&self.pipeline, summary.succeeded, summary.failed);
        summary
    }

    fn deliver(&self, subscribers: &mut Vec<BoxedSubscriber<T>>, event: &PortEvent<T>) {
        subscribers.retain_mut(|(id, subscriber)| {
            let delivered = catch_unwind(AssertUnwindSafe(|| subscriber.on_event(event)));
            if delivered.is_err() {
                tracing::warn!(
                    pipeline = %self.pipeline,
                    port = %self.port.name(),
                    subscription = %id,
                    "subscriber panicked, detaching"
                );
                self.metrics.record_detached();
                self.port.detach();
            }
            delivered.is_ok()
        });
        self.metrics.record_delivered(subscribers.len());
    }
}
