//! Retrieval interface to the ingestion API.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use surface_core::{Error, PersistedEvent, Result};

/// Fetches events from the ingestion endpoint.
///
/// `since = None` is the initial load (server-capped page of most recent
/// events); `since = Some(t)` is a delta load returning every event strictly
/// newer than `t`.
#[async_trait]
pub trait EventsApi: Send + Sync {
    async fn fetch(
        &self,
        tag_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PersistedEvent>>;
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    events: Vec<PersistedEvent>,
}

/// HTTP implementation over `GET /api/events`.
pub struct HttpEventsApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEventsApi {
    /// `base_url` is the server root, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl EventsApi for HttpEventsApi {
    async fn fetch(
        &self,
        tag_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<PersistedEvent>> {
        let url = format!("{}/api/events", self.base_url);

        let mut query: Vec<(&str, String)> = vec![("tagId", tag_id.to_string())];
        if let Some(since) = since {
            query.push(("since", since.to_rfc3339_opts(SecondsFormat::Nanos, true)));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::sync(format!("events request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::sync(format!(
                "events request returned {}",
                response.status()
            )));
        }

        let body: EventsResponse = response
            .json()
            .await
            .map_err(|e| Error::sync(format!("invalid events response: {}", e)))?;

        Ok(body.events)
    }
}
