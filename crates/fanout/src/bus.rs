//! Notification bus trait and subscription handle.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio_stream::Stream;

/// Opaque handle identifying an active subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a broadcast pass over the active set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Subscribers the payload was written to.
    pub delivered: usize,
    /// Subscribers removed because their write failed.
    pub dropped: usize,
}

/// Push fan-out to live viewers.
///
/// Delivery is best-effort: persistence success and broadcast delivery are
/// independent, and no history is replayed to new subscribers (a fresh viewer
/// performs an initial load through the sync path instead).
pub trait NotificationBus: Send + Sync {
    /// Adds a push channel to the active set and returns its receiving end.
    /// Dropping the [`Subscription`] removes the channel again.
    fn subscribe(self: Arc<Self>) -> Subscription;

    /// Explicit removal, used on channel teardown.
    fn unsubscribe(&self, id: SubscriberId);

    /// Writes the payload to every member of the active set. Any channel
    /// whose write fails is removed as a side effect.
    fn broadcast(&self, payload: &str) -> BroadcastOutcome;

    /// Size of the active set.
    fn subscriber_count(&self) -> usize;
}

/// Receiving end of a subscriber channel.
///
/// Yields broadcast payloads in delivery order. Unsubscribes on drop, so a
/// disconnected viewer's channel leaves the active set without waiting for a
/// failed write to evict it.
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<String>,
    bus: Arc<dyn NotificationBus>,
}

impl Subscription {
    pub fn new(id: SubscriberId, rx: mpsc::Receiver<String>, bus: Arc<dyn NotificationBus>) -> Self {
        Self { id, rx, bus }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Receives the next payload; `None` once the sending side is gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

impl Stream for Subscription {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}
