//! Worker configuration.

use tokio::runtime::Handle;
use tokio::sync::Semaphore;

/// How workers are scheduled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Each item runs in its own worker, at most `max_workers` at a time.
    ///
    /// Results are emitted in completion order.
    Concurrent {
        /// Upper bound on workers running at once.
        max_workers: usize,
    },

    /// A single worker processes items one after another.
    ///
    /// Results are emitted in submission order.
    Sequential,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        Self::Concurrent {
            max_workers: default_parallelism(),
        }
    }
}

impl ExecutionMode {
    /// Whether results are emitted in submission order.
    pub fn preserves_order(&self) -> bool {
        matches!(self, Self::Sequential)
    }

    /// Number of workers that may run at once.
    ///
    /// Always within `1..=Semaphore::MAX_PERMITS`.
    pub fn max_workers(&self) -> usize {
        match self {
            Self::Concurrent { max_workers } => {
                (*max_workers).clamp(1, Semaphore::MAX_PERMITS)
            }
            Self::Sequential => 1,
        }
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Configuration for a headless pipeline.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Pipeline name, used in spans and metric labels.
    pub name: String,

    /// Worker scheduling.
    pub mode: ExecutionMode,

    /// Runtime that runs the workers.
    ///
    /// `None` uses the runtime the pipeline is created from.
    pub runtime: Option<Handle>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: "headless".to_string(),
            mode: ExecutionMode::default(),
            runtime: None,
        }
    }
}

impl WorkerConfig {
    /// Run items one at a time, in submission order.
    pub fn sequential() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            ..Default::default()
        }
    }

    /// Run up to `max_workers` items at once.
    pub fn concurrent(max_workers: usize) -> Self {
        Self {
            mode: ExecutionMode::Concurrent { max_workers },
            ..Default::default()
        }
    }

    /// Set the pipeline name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Run workers on the given runtime.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkerConfig::default();
        assert_eq!(config.name, "headless");
        assert!(!config.mode.preserves_order());
        assert!(config.mode.max_workers() >= 1);
        assert!(config.runtime.is_none());
    }

    #[test]
    fn test_presets() {
        let config = WorkerConfig::sequential().with_name("icons");
        assert_eq!(config.name, "icons");
        assert_eq!(config.mode, ExecutionMode::Sequential);
        assert!(config.mode.preserves_order());
        assert_eq!(config.mode.max_workers(), 1);

        let config = WorkerConfig::concurrent(0);
        assert_eq!(config.mode.max_workers(), 1);
        assert_eq!(WorkerConfig::concurrent(8).mode.max_workers(), 8);
    }

    #[test]
    fn test_unbounded_workers_clamped() {
        let config = WorkerConfig::concurrent(usize::MAX);
        assert_eq!(config.mode.max_workers(), Semaphore::MAX_PERMITS);
    }

    #[tokio::test]
    async fn test_unbounded_workers_run() {
        use crate::transform::Identity;

        let handle = crate::worker_with_config(
            [("a", "1"), ("b", "2")],
            Identity,
            WorkerConfig::concurrent(usize::MAX),
        )
        .unwrap();

        let summary = handle.wait().await.unwrap();
        assert_eq!(summary.succeeded, 2);
    }
}
