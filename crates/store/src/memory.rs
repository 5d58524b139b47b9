//! In-memory event store.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

use surface_core::{sort_newest_first, Error, EventEnvelope, PersistedEvent, Result};

use crate::store::{EventFilter, EventStore};

/// Process-local [`EventStore`] implementation.
///
/// Backs single-node deployments and tests. Insertion sequence is a process
/// counter, so ties on creation timestamp still order deterministically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: Mutex<Vec<PersistedEvent>>,
    next_seq: AtomicU64,
    /// Simulate persistence failures if set (error-path tests).
    should_fail: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Set failure mode for testing the server-error path.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create(&self, envelope: EventEnvelope) -> Result<PersistedEvent> {
        if self.should_fail.load(Ordering::Relaxed) {
            return Err(Error::storage("event store unavailable"));
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let event = PersistedEvent::from_envelope(envelope, seq);

        debug!(event_id = %event.id, tag_id = %event.tag_id, seq, "Stored event");

        self.events.lock().push(event.clone());
        Ok(event)
    }

    async fn find(&self, filter: &EventFilter) -> Result<Vec<PersistedEvent>> {
        if self.should_fail.load(Ordering::Relaxed) {
            return Err(Error::storage("event store unavailable"));
        }

        let mut matches: Vec<PersistedEvent> = self
            .events
            .lock()
            .iter()
            .filter(|e| {
                filter
                    .tag_id
                    .as_ref()
                    .map(|tag| &e.tag_id == tag)
                    .unwrap_or(true)
            })
            .filter(|e| filter.since.map(|since| e.created_at > since).unwrap_or(true))
            .cloned()
            .collect();

        sort_newest_first(&mut matches);

        if let Some(limit) = filter.limit {
            matches.truncate(limit);
        }

        Ok(matches)
    }
}
