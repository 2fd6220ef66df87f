//! Events delivered through a port.

use crate::error::TransformationError;
use std::fmt;

/// The successful output of processing one work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkResult<T> {
    /// Name of the work item.
    pub name: String,
    /// Value produced by the transform.
    pub value: T,
}

/// Events emitted on a port.
///
/// Every submitted item yields exactly one `Result` or `Error`, and the
/// port then emits a single terminal `Done`.
#[derive(Debug, Clone)]
pub enum PortEvent<T> {
    /// An item was transformed successfully.
    Result(WorkResult<T>),

    /// An item failed to transform.
    Error(TransformationError),

    /// No further events will be emitted.
    Done,
}

impl<T> PortEvent<T> {
    /// Name of the item this event refers to, `None` for `Done`.
    pub fn name(&self) -> Option<&str> {
        match self {
            PortEvent::Result(result) => Some(&result.name),
            PortEvent::Error(err) => Some(&err.name),
            PortEvent::Done => None,
        }
    }

    /// Whether this is the terminal completion signal.
    pub fn is_done(&self) -> bool {
        matches!(self, PortEvent::Done)
    }

    /// Whether this event reports a failed item.
    pub fn is_error(&self) -> bool {
        matches!(self, PortEvent::Error(_))
    }

    /// The successful result, if any.
    pub fn as_result(&self) -> Option<&WorkResult<T>> {
        match self {
            PortEvent::Result(result) => Some(result),
            _ => None,
        }
    }
}

impl<T: fmt::Debug> fmt::Display for PortEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortEvent::Result(result) => write!(f, "{}: {:?}", result.name, result.value),
            PortEvent::Error(err) => write!(f, "{}", err),
            PortEvent::Done => write!(f, "Done"),
        }
    }
}
