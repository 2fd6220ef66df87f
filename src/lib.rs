//! # Headless
//!
//! A headless worker pipeline: submit a batch of named payloads, transform
//! each one in an isolated worker, and receive the results through a
//! subscribable `output` port.
//!
//! ## Features
//!
//! - **Eager validation**: duplicate or empty names are rejected before any
//!   work is scheduled
//! - **Isolated workers**: one blocking task per item, sharing only the
//!   read-only transform
//! - **Per-item failures**: a failed or panicking transform becomes a
//!   tagged error event and never aborts the batch
//! - **Finite ports**: every subscriber sees one event per item and then a
//!   single `Done`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use headless::prelude::*;
//!
//! let handle = headless::worker([("a", "1"), ("b", "2")], Identity)?;
//! handle
//!     .ports()
//!     .output()
//!     .subscribe(|event| println!("{event}"))?;
//! handle.wait().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod item;
pub mod observability;
pub mod pipeline;
pub mod port;
pub mod transform;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result, SubmissionError, SubscriptionError, TransformationError};
    pub use crate::item::{Batch, WorkItem};
    pub use crate::pipeline::{
        ExecutionMode, Headless, PipelineHandle, PipelineSummary, WorkerConfig,
    };
    pub use crate::port::{Port, PortEvent, PortReceiver, Subscriber, WorkResult};
    pub use crate::transform::{FnTransform, Identity, Transform};
}

pub use error::{Error, Result};
pub use pipeline::{Headless, worker, worker_with_config};
