//! Headless pipeline construction and execution.
//!
//! - [`Headless`]: a reusable pipeline factory holding a transform
//! - [`worker`] / [`worker_with_config`]: one-shot submission
//! - [`PipelineHandle`]: access to the ports and completion
//! - [`WorkerConfig`] / [`ExecutionMode`]: scheduling
//!
//! # Example
//!
//! ```rust,ignore
//! use headless::pipeline::worker;
//! use headless::transform::Identity;
//!
//! let handle = worker([("a", "1"), ("b", "2")], Identity)?;
//! handle.ports().output().subscribe(|event| println!("{event}"))?;
//! let summary = handle.wait().await?;
//! assert_eq!(summary.succeeded, 2);
//! ```

mod config;
mod dispatch;
mod executor;
mod handle;

pub use config::{ExecutionMode, WorkerConfig};
pub use handle::{PipelineHandle, PipelineSummary, Ports};

use crate::error::{Error, Result};
use crate::item::{Batch, WorkItem};
use crate::observability::{PipelineMetrics, span_pipeline};
use crate::port::{OUTPUT, Port};
use crate::transform::Transform;
use dispatch::Dispatcher;
use executor::{WorkerContext, spawn_workers};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::Instrument;

/// Pipeline factory bound to one transform.
///
/// Each call to [`Headless::worker`] submits an independent batch; the
/// transform is shared read-only between all of them.
pub struct Headless<X: Transform> {
    transform: Arc<X>,
    config: WorkerConfig,
}

impl<X: Transform> Headless<X> {
    /// Create a factory with the default configuration.
    pub fn new(transform: X) -> Self {
        Self::with_config(transform, WorkerConfig::default())
    }

    /// Create a factory with a custom configuration.
    pub fn with_config(transform: X, config: WorkerConfig) -> Self {
        Self {
            transform: Arc::new(transform),
            config,
        }
    }

    /// The factory's configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Submit a batch of `(name, payload)` pairs.
    ///
    /// Validates the whole batch first: a duplicate or empty name fails
    /// with [`SubmissionError`](crate::error::SubmissionError) and nothing
    /// is scheduled. Otherwise one worker per item is scheduled and the
    /// handle is returned immediately.
    pub fn worker<I, W>(&self, items: I) -> Result<PipelineHandle<X::Output>>
    where
        I: IntoIterator<Item = W>,
        W: Into<WorkItem>,
    {
        let batch = Batch::new(items)?;
        self.submit(batch)
    }

    /// Submit an already validated batch.
    pub fn submit(&self, batch: Batch) -> Result<PipelineHandle<X::Output>> {
        let runtime = match &self.config.runtime {
            Some(runtime) => runtime.clone(),
            None => Handle::try_current().map_err(|_| Error::NoRuntime)?,
        };

        let pipeline: Arc<str> = Arc::from(self.config.name.as_str());
        let expected = batch.len();
        let metrics = PipelineMetrics::new(&pipeline);
        metrics.record_submitted(expected);

        let span = span_pipeline(&pipeline, expected);
        tracing::debug!(
            parent: &span,
            mode = ?self.config.mode,
            "submitting batch"
        );

        let port = Port::new(OUTPUT);
        let (tx, rx) = kanal::unbounded_async();

        let dispatcher = Dispatcher {
            pipeline: Arc::clone(&pipeline),
            port: port.clone(),
            outcomes: rx,
            expected,
            metrics: metrics.clone(),
        };
        let dispatcher = runtime.spawn(dispatcher.run().instrument(span.clone()));

        let ctx = WorkerContext {
            pipeline,
            transform: Arc::clone(&self.transform),
            metrics,
            outcomes: tx,
        };
        {
            let _entered = span.enter();
            spawn_workers(&runtime, &self.config.mode, batch.into_items(), ctx);
        }

        Ok(PipelineHandle::new(
            self.config.name.clone(),
            Ports::new(port),
            dispatcher,
        ))
    }
}

impl<X: Transform + std::fmt::Debug> std::fmt::Debug for Headless<X> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Headless")
            .field("transform", &self.transform)
            .field("config", &self.config)
            .finish()
    }
}

/// Submit `items` to a new pipeline running `transform`.
///
/// Shorthand for `Headless::new(transform).worker(items)`.
pub fn worker<I, W, X>(items: I, transform: X) -> Result<PipelineHandle<X::Output>>
where
    I: IntoIterator<Item = W>,
    W: Into<WorkItem>,
    X: Transform,
{
    Headless::new(transform).worker(items)
}

/// Submit `items` to a new pipeline with an explicit configuration.
pub fn worker_with_config<I, W, X>(
    items: I,
    transform: X,
    config: WorkerConfig,
) -> Result<PipelineHandle<X::Output>>
where
    I: IntoIterator<Item = W>,
    W: Into<WorkItem>,
    X: Transform,
{
    Headless::with_config(transform, config).worker(items)
}
