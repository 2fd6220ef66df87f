//! Worker executor using Tokio tasks and Kanal channels.
//!
//! Every item is transformed on Tokio's blocking pool, inside its own task,
//! and the outcome is sent over a Kanal channel to the pipeline's
//! dispatcher. Workers share nothing but the read-only transform.

use crate::error::TransformationError;
use crate::item::WorkItem;
use crate::observability::{
    PipelineMetrics, span_worker, trace_item_failed, trace_item_succeeded,
};
use crate::pipeline::ExecutionMode;
use crate::port::{PortEvent, WorkResult};
use crate::transform::Transform;
use kanal::AsyncSender;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

/// State shared by every worker of one pipeline.
pub(crate) struct WorkerContext<X: Transform> {
    pub(crate) pipeline: Arc<str>,
    pub(crate) transform: Arc<X>,
    pub(crate) metrics: PipelineMetrics,
    pub(crate) outcomes: AsyncSender<PortEvent<X::Output>>,
}

impl<X: Transform> Clone for WorkerContext<X> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            transform: Arc::clone(&self.transform),
            metrics: self.metrics.clone(),
            outcomes: self.outcomes.clone(),
        }
    }
}

/// Schedule one worker per item according to `mode`.
///
/// Returns immediately. Exactly one outcome per item is sent to the
/// dispatcher, whatever happens inside the transform.
pub(crate) fn spawn_workers<X: Transform>(
    runtime: &Handle,
    mode: &ExecutionMode,
    items: Vec<WorkItem>,
    ctx: WorkerContext<X>,
) {
    match mode {
        ExecutionMode::Sequential => {
            runtime.spawn(async move {
                for item in items {
                    let event = run_item(&ctx, item).await;
                    send_outcome(&ctx, event).await;
                }
            });
        }
        ExecutionMode::Concurrent { .. } => {
            let permits = Arc::new(Semaphore::new(mode.max_workers()));
            for item in items {
                let ctx = ctx.clone();
                let permits = Arc::clone(&permits);
                runtime.spawn(async move {
                    // The semaphore is never closed.
                    let _permit = permits.acquire_owned().await.ok();
                    let event = run_item(&ctx, item).await;
                    send_outcome(&ctx, event).await;
                });
            }
        }
    }
}

async fn send_outcome<X: Transform>(ctx: &WorkerContext<X>, event: PortEvent<X::Output>) {
    if ctx.outcomes.send(event).await.is_err() {
        tracing::debug!(pipeline = %ctx.pipeline, "dispatcher gone, dropping outcome");
    }
}

/// Transform a single item in an isolated blocking task.
async fn run_item<X: Transform>(ctx: &WorkerContext<X>, item: WorkItem) -> PortEvent<X::Output> {
    let name = item.name().to_string();
    let span = span_worker(&ctx.pipeline, &name);
    let transform = Arc::clone(&ctx.transform);

    let started = Instant::now();
    let joined = tokio::task::spawn_blocking(move || {
        let _entered = span.entered();
        transform.transform(item.name(), item.payload())
    })
    .await;
    ctx.metrics.record_transform_time(started.elapsed());

    let error = match joined {
        Ok(Ok(value)) => {
            trace_item_succeeded(&ctx.pipeline, &name);
            ctx.metrics.record_succeeded();
            return PortEvent::Result(WorkResult { name, value });
        }
        Ok(Err(cause)) => TransformationError::new(name, cause),
        Err(join_error) if join_error.is_panic() => {
            TransformationError::panicked(name, panic_message(join_error.into_panic()))
        }
        Err(_) => TransformationError::new(name, "worker was cancelled".into()),
    };

    trace_item_failed(&ctx.pipeline, &error.name, &error);
    ctx.metrics.record_failed();
    PortEvent::Error(error)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
