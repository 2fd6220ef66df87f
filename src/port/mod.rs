//! Named, subscribable output ports.
//!
//! A [`Port`] is an append-only event source with a finite lifetime: it
//! emits one event per work item and then a single [`PortEvent::Done`].
//! Subscribers registered before completion receive every event emitted
//! after they subscribe; subscribing after completion fails with
//! [`SubscriptionError`].
//!
//! Events are held back until the port is opened. Opening happens on the
//! first subscription, or when the pipeline handle is awaited, so a caller
//! that subscribes right after submission sees every event.
//!
//! # Example
//!
//! ```rust,ignore
//! let handle = headless::worker([("a", "1")], Identity)?;
//! handle.ports().output().subscribe(|event| println!("{event}"))?;
//! handle.wait().await?;
//! ```

mod event;
mod subscriber;

pub use event::{PortEvent, WorkResult};
pub use subscriber::{PortReceiver, Subscriber, SubscriptionId};

use crate::error::SubscriptionError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use subscriber::Callback;
use tokio::sync::Notify;

/// Name of the port every pipeline exposes.
pub const OUTPUT: &str = "output";

pub(crate) type BoxedSubscriber<T> = (SubscriptionId, Box<dyn Subscriber<T>>);

/// A named, subscribable channel.
///
/// Cloning a port yields another handle to the same channel.
pub struct Port<T> {
    shared: Arc<PortShared<T>>,
}

struct PortShared<T> {
    name: String,
    state: Mutex<PortState<T>>,
    gate: Notify,
}

struct PortState<T> {
    /// Subscribers not yet picked up by the dispatcher.
    pending: Vec<BoxedSubscriber<T>>,
    /// Subscribers currently attached (pending or dispatching).
    attached: usize,
    next_id: u64,
    opened: bool,
    completed: bool,
}

impl<T> Clone for Port<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> std::fmt::Debug for Port<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Port")
            .field("name", &self.shared.name)
            .field("subscribers", &state.attached)
            .field("opened", &state.opened)
            .field("completed", &state.completed)
            .finish()
    }
}

impl<T: Clone + Send + 'static> Port<T> {
    /// Create a new, unopened port.
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(PortShared {
                name: name.into(),
                state: Mutex::new(PortState {
                    pending: Vec::new(),
                    attached: 0,
                    next_id: 0,
                    opened: false,
                    completed: false,
                }),
                gate: Notify::new(),
            }),
        }
    }

    /// Port name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Whether the port has emitted its completion signal.
    pub fn is_completed(&self) -> bool {
        self.state().completed
    }

    /// Number of subscribers currently attached.
    pub fn subscriber_count(&self) -> usize {
        self.state().attached
    }

    /// Register a callback invoked once per event, ending with `Done`.
    pub fn subscribe<F>(&self, callback: F) -> Result<SubscriptionId, SubscriptionError>
    where
        F: FnMut(&PortEvent<T>) + Send + 'static,
    {
        self.subscribe_with(Callback(callback))
    }

    /// Register a [`Subscriber`] implementation.
    pub fn subscribe_with<S>(&self, subscriber: S) -> Result<SubscriptionId, SubscriptionError>
    where
        S: Subscriber<T>,
    {
        let id = {
            let mut state = self.state();
            if state.completed {
                return Err(SubscriptionError {
                    port: self.shared.name.clone(),
                });
            }
            let id = SubscriptionId(state.next_id);
            state.next_id += 1;
            state.attached += 1;
            state.pending.push((id, Box::new(subscriber)));
            id
        };

        tracing::debug!(port = %self.shared.name, subscription = %id, "subscriber attached");
        self.open();
        Ok(id)
    }

    /// Subscribe through a pull-based receiver.
    pub fn receiver(&self) -> Result<PortReceiver<T>, SubscriptionError> {
        let (forward, receiver) = PortReceiver::channel();
        self.subscribe_with(forward)?;
        Ok(receiver)
    }
}

impl<T> Port<T> {
    fn state(&self) -> MutexGuard<'_, PortState<T>> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Release held events to subscribers.
    pub(crate) fn open(&self) {
        let newly_opened = {
            let mut state = self.state();
            !std::mem::replace(&mut state.opened, true)
        };
        if newly_opened {
            self.shared.gate.notify_one();
        }
    }

    /// Wait until the port has been opened.
    pub(crate) async fn opened(&self) {
        loop {
            if self.state().opened {
                return;
            }
            self.shared.gate.notified().await;
        }
    }

    /// Move newly registered subscribers into the dispatcher's list.
    pub(crate) fn adopt_pending(&self, into: &mut Vec<BoxedSubscriber<T>>) {
        let mut state = self.state();
        into.append(&mut state.pending);
    }

    /// Record that a subscriber was detached by the dispatcher.
    pub(crate) fn detach(&self) {
        let mut state = self.state();
        state.attached = state.attached.saturating_sub(1);
    }

    /// Mark the port completed and hand over any last subscribers.
    ///
    /// After this returns, every later `subscribe` fails.
    pub(crate) fn complete(&self, into: &mut Vec<BoxedSubscriber<T>>) {
        let mut state = self.state();
        into.append(&mut state.pending);
        state.completed = true;
        state.attached = 0;
    }
}
