//! Application state shared across handlers.

use std::sync::Arc;

use event_store::EventStore;
use fanout::NotificationBus;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Durable event store (in-memory in tests and single-node deployments).
    pub store: Arc<dyn EventStore>,
    /// Push fan-out to connected viewers.
    pub bus: Arc<dyn NotificationBus>,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>, bus: Arc<dyn NotificationBus>) -> Self {
        Self { store, bus }
    }
}
