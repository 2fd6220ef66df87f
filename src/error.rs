//! Error types for Headless.

use std::sync::Arc;
use thiserror::Error;

/// Result type alias using Headless's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by a failing [`Transform`](crate::transform::Transform).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for Headless operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The submitted batch was rejected before any work was scheduled.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// A subscription could not be registered.
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    /// No Tokio runtime was available to run the workers.
    #[error("no tokio runtime available: call from within a runtime or set WorkerConfig::runtime")]
    NoRuntime,

    /// The dispatcher task of a pipeline terminated abnormally.
    #[error("dispatcher for pipeline '{pipeline}' terminated abnormally: {reason}")]
    Dispatcher {
        /// Name of the pipeline.
        pipeline: String,
        /// What happened to the task.
        reason: String,
    },
}

/// A batch that cannot be submitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// Two work items share the same name.
    #[error("duplicate work item name '{name}'")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// A work item has an empty name.
    #[error("work item at position {index} has an empty name")]
    EmptyName {
        /// Position of the item in the submitted sequence.
        index: usize,
    },
}

/// Subscribing to a port that has already signaled completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("port '{port}' has already completed; no further events will be emitted")]
pub struct SubscriptionError {
    /// Name of the completed port.
    pub port: String,
}

/// A single work item failed to transform.
///
/// Delivered to subscribers as a tagged event; it never aborts the batch.
#[derive(Error, Debug, Clone)]
#[error("transformation of '{name}' failed: {cause}")]
pub struct TransformationError {
    /// Name of the failed work item.
    pub name: String,
    /// Underlying failure reported by the transform.
    #[source]
    pub cause: Arc<dyn std::error::Error + Send + Sync + 'static>,
}

impl TransformationError {
    /// Wrap a transform failure for the named item.
    pub fn new(name: impl Into<String>, cause: BoxError) -> Self {
        Self {
            name: name.into(),
            cause: Arc::from(cause),
        }
    }

    /// Build an error for a worker that panicked while transforming.
    pub(crate) fn panicked(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, Box::new(WorkerPanic(message.into())))
    }
}

/// Panic payload of a worker, surfaced as a transformation cause.
#[derive(Error, Debug)]
#[error("worker panicked: {0}")]
pub(crate) struct WorkerPanic(String);
