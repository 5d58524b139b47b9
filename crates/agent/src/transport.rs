//! Envelope delivery.

use tracing::{debug, warn};

use surface_core::EventEnvelope;

/// Delivers envelopes to the ingestion endpoint.
///
/// Delivery is fire-and-forget: implementations must not block the caller
/// and must log rather than propagate failures.
pub trait Transport: Send + Sync {
    fn deliver(&self, envelope: EventEnvelope);
}

/// HTTP transport POSTing JSON envelopes from a detached task.
///
/// The spawned task is independent of the caller's lifetime: it is neither
/// awaited nor cancelled when the agent is dropped, so a send issued during
/// page teardown still runs to completion. The task is observed only for
/// logging.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Requires a running Tokio runtime; `deliver` spawns onto it.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Transport for HttpTransport {
    fn deliver(&self, envelope: EventEnvelope) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        tokio::spawn(async move {
            match client.post(&endpoint).json(&envelope).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(status = %response.status(), "Event dispatched");
                }
                Ok(response) => {
                    warn!(status = %response.status(), "Event dispatch rejected");
                }
                Err(e) => {
                    warn!(error = %e, "Event dispatch failed");
                }
            }
        });
    }
}
