//! Mock implementations for testing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use agent::Transport;
use event_store::{EventFilter, EventStore};
use surface_core::limits::DEFAULT_QUERY_LIMIT;
use surface_core::{EventEnvelope, PersistedEvent, Result};
use sync_client::EventsApi;

/// Transport that captures envelopes in memory.
///
/// Implements the same `Transport` trait as the real HTTP transport, letting
/// tests inspect the exact envelopes the agent would send, and relay them to
/// a test server to exercise the full pipeline.
#[derive(Default)]
pub struct RecordingTransport {
    envelopes: Mutex<Vec<EventEnvelope>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured envelopes.
    pub fn captured(&self) -> Vec<EventEnvelope> {
        self.envelopes.lock().clone()
    }

    /// Clear captured envelopes (use between test phases).
    pub fn clear(&self) {
        self.envelopes.lock().clear();
    }
}

impl Transport for RecordingTransport {
    fn deliver(&self, envelope: EventEnvelope) {
        self.envelopes.lock().push(envelope);
    }
}

/// `EventsApi` over a store, mirroring the query handler's semantics:
/// uncursored fetches return the capped most-recent page, cursored fetches
/// return every strictly-newer record.
pub struct StoreEventsApi {
    store: Arc<dyn EventStore>,
}

impl StoreEventsApi {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventsApi for StoreEventsApi {
    async fn fetch(
        &self,
        tag_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PersistedEvent>> {
        let filter = EventFilter {
            tag_id: Some(tag_id.to_string()),
            since,
            limit: if since.is_some() {
                None
            } else {
                Some(DEFAULT_QUERY_LIMIT)
            },
        };
        self.store.find(&filter).await
    }
}
