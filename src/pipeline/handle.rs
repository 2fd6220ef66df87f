//! Handle to a running pipeline.

use crate::error::{Error, Result};
use crate::port::{OUTPUT, Port};
use tokio::task::JoinHandle;

/// Outcome counts of a finished pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Pipeline name.
    pub pipeline: String,
    /// Number of submitted items.
    pub submitted: usize,
    /// Items transformed successfully.
    pub succeeded: usize,
    /// Items whose transform failed.
    pub failed: usize,
}

impl PipelineSummary {
    /// Whether every submitted item succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.succeeded == self.submitted
    }
}

/// The ports a pipeline exposes.
#[derive(Debug, Clone)]
pub struct Ports<T> {
    output: Port<T>,
}

impl<T: Clone + Send + 'static> Ports<T> {
    pub(crate) fn new(output: Port<T>) -> Self {
        Self { output }
    }

    /// The `output` port carrying one event per item.
    pub fn output(&self) -> &Port<T> {
        &self.output
    }

    /// Look up a port by name.
    pub fn get(&self, name: &str) -> Option<&Port<T>> {
        (name == OUTPUT).then_some(&self.output)
    }
}

/// Handle to a submitted pipeline.
///
/// Usable as soon as it is returned. Dropping the handle does not cancel
/// the workers: it opens the output port, so the batch drains to whoever
/// subscribed through a clone of the port, or to nobody, and the
/// dispatcher finishes.
pub struct PipelineHandle<T> {
    name: String,
    ports: Ports<T>,
    /// `None` only while `wait` is consuming the handle.
    dispatcher: Option<JoinHandle<PipelineSummary>>,
}

impl<T: Clone + Send + 'static> PipelineHandle<T> {
    pub(crate) fn new(
        name: String,
        ports: Ports<T>,
        dispatcher: JoinHandle<PipelineSummary>,
    ) -> Self {
        Self {
            name,
            ports,
            dispatcher: Some(dispatcher),
        }
    }

    /// Pipeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pipeline's ports.
    pub fn ports(&self) -> &Ports<T> {
        &self.ports
    }

    /// Whether the completion signal has been emitted.
    pub fn is_finished(&self) -> bool {
        self.dispatcher
            .as_ref()
            .is_none_or(JoinHandle::is_finished)
    }

    /// Wait for every item to be processed and delivered.
    ///
    /// Opens the output port if nobody subscribed, so the pipeline drains
    /// either way.
    pub async fn wait(mut self) -> Result<PipelineSummary> {
        self.ports.output.open();
        let dispatcher = self.dispatcher.take().ok_or_else(|| Error::Dispatcher {
            pipeline: self.name.clone(),
            reason: "dispatcher already awaited".to_string(),
        })?;
        dispatcher.await.map_err(|e| Error::Dispatcher {
            pipeline: self.name.clone(),
            reason: e.to_string(),
        })
    }
}

impl<T> Drop for PipelineHandle<T> {
    fn drop(&mut self) {
        self.ports.output.open();
    }
}

impl<T> std::fmt::Debug for PipelineHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineHandle")
            .field("name", &self.name)
            .field(
                "finished",
                &self.dispatcher.as_ref().is_none_or(JoinHandle::is_finished),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ports_lookup() {
        let ports: Ports<String> = Ports::new(Port::new(OUTPUT));
        assert_eq!(ports.output().name(), "output");
        assert!(ports.get("output").is_some());
        assert!(ports.get("input").is_none());
    }

    #[test]
    fn test_summary_success() {
        let summary = PipelineSummary {
            pipeline: "p".to_string(),
            submitted: 2,
            succeeded: 2,
            failed: 0,
        };
        assert!(summary.is_success());

        let summary = PipelineSummary {
            failed: 1,
            succeeded: 1,
            ..summary
        };
        assert!(!summary.is_success());
    }

    #[tokio::test]
    async fn test_dropped_handle_drains() {
        let handle = crate::worker([("a", "1"), ("b", "2")], crate::transform::Identity).unwrap();
        let output = handle.ports().output().clone();
        drop(handle);

        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while !output.is_completed() {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("pipeline did not drain after its handle was dropped");

        assert!(output.subscribe(|_| {}).is_err());
    }
}
