//! In-process notification bus.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::bus::{BroadcastOutcome, NotificationBus, SubscriberId, Subscription};

/// Per-subscriber channel depth. A viewer that falls this far behind is
/// treated as a failed write and evicted.
const SUBSCRIBER_CHANNEL_CAPACITY: usize = 64;

/// Process-local [`NotificationBus`].
///
/// Membership lives in a single locked map, so add/remove is serialized with
/// broadcast iteration. Broadcasts reach only subscribers connected to this
/// process instance; cross-process fan-out needs a broker-backed bus.
#[derive(Debug, Default)]
pub struct InMemoryBus {
    subscribers: Mutex<HashMap<SubscriberId, mpsc::Sender<String>>>,
    next_id: AtomicU64,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationBus for InMemoryBus {
    fn subscribe(self: Arc<Self>) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CHANNEL_CAPACITY);

        self.subscribers.lock().insert(id, tx);
        debug!(subscriber = %id, "Subscriber joined");

        Subscription::new(id, rx, self)
    }

    fn unsubscribe(&self, id: SubscriberId) {
        if self.subscribers.lock().remove(&id).is_some() {
            debug!(subscriber = %id, "Subscriber removed");
        }
    }

    fn broadcast(&self, payload: &str) -> BroadcastOutcome {
        let mut subscribers = self.subscribers.lock();
        let mut outcome = BroadcastOutcome::default();
        let mut failed = Vec::new();

        for (id, tx) in subscribers.iter() {
            match tx.try_send(payload.to_string()) {
                Ok(()) => outcome.delivered += 1,
                Err(_) => failed.push(*id),
            }
        }

        // Self-healing membership: a closed or backed-up channel is dropped
        // from the set instead of being health-checked.
        for id in failed {
            subscribers.remove(&id);
            outcome.dropped += 1;
            warn!(subscriber = %id, "Dropped subscriber after failed write");
        }

        outcome
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
