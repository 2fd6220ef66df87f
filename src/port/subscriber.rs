//! Subscribers attached to a port.

use super::PortEvent;
use futures::Stream;
use tokio::sync::mpsc;

/// Identifier of a subscription, unique within its port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}

/// Receives every event emitted on a port after it subscribes.
///
/// The dispatcher never calls a subscriber concurrently with itself. The
/// subscriber is dropped right after it receives [`PortEvent::Done`].
pub trait Subscriber<T>: Send + 'static {
    /// Handle one event.
    fn on_event(&mut self, event: &PortEvent<T>);
}

/// Callback subscriber.
pub(crate) struct Callback<F>(pub(crate) F);

impl<T, F> Subscriber<T> for Callback<F>
where
    F: FnMut(&PortEvent<T>) + Send + 'static,
{
    fn on_event(&mut self, event: &PortEvent<T>) {
        (self.0)(event)
    }
}

/// Forwards events into the channel behind a [`PortReceiver`].
pub(crate) struct Forward<T> {
    tx: mpsc::UnboundedSender<PortEvent<T>>,
}

impl<T: Clone + Send + 'static> Subscriber<T> for Forward<T> {
    fn on_event(&mut self, event: &PortEvent<T>) {
        // A dropped receiver just stops listening.
        let _ = self.tx.send(event.clone());
    }
}

/// Pull-based subscription to a port.
///
/// # Example
///
/// ```rust,ignore
/// let mut rx = handle.ports().output().receiver()?;
/// while let Some(event) = rx.recv().await {
///     println!("{event}");
/// }
/// ```
pub struct PortReceiver<T> {
    rx: mpsc::UnboundedReceiver<PortEvent<T>>,
}

impl<T: Clone + Send + 'static> PortReceiver<T> {
    pub(crate) fn channel() -> (Forward<T>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Forward { tx }, Self { rx })
    }
}

impl<T> PortReceiver<T> {
    /// Receive the next event.
    ///
    /// Returns `None` once [`PortEvent::Done`] has been received.
    pub async fn recv(&mut self) -> Option<PortEvent<T>> {
        self.rx.recv().await
    }

    /// Try to receive an event without waiting.
    pub fn try_recv(&mut self) -> Option<PortEvent<T>> {
        self.rx.try_recv().ok()
    }

    /// Receive every remaining event, up to and including `Done`.
    pub async fn collect(mut self) -> Vec<PortEvent<T>> {
        let mut events = Vec::new();
        while let Some(event) = self.recv().await {
            events.push(event);
        }
        events
    }

    /// Convert into a [`Stream`] of events.
    pub fn into_stream(self) -> impl Stream<Item = PortEvent<T>> {
        futures::stream::unfold(self, |mut receiver| async move {
            receiver.recv().await.map(|event| (event, receiver))
        })
    }
}
