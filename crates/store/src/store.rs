//! Event store trait and query filter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use surface_core::{EventEnvelope, PersistedEvent, Result};

/// Filter and bound for event queries.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Restrict to a single tag.
    pub tag_id: Option<String>,
    /// Strictly-newer-than bound on creation time.
    pub since: Option<DateTime<Utc>>,
    /// Result cap applied after ordering; `None` returns every match.
    pub limit: Option<usize>,
}

impl EventFilter {
    /// Most recent events for a tag, capped at `limit`.
    pub fn recent(tag_id: impl Into<String>, limit: usize) -> Self {
        Self {
            tag_id: Some(tag_id.into()),
            since: None,
            limit: Some(limit),
        }
    }

    /// All events for a tag strictly newer than `since` (incremental sync).
    ///
    /// Uncapped: callers on the sync path rely on receiving every qualifying
    /// record.
    pub fn delta(tag_id: impl Into<String>, since: DateTime<Utc>) -> Self {
        Self {
            tag_id: Some(tag_id.into()),
            since: Some(since),
            limit: None,
        }
    }
}

/// Create/query interface over the durable store.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persists a validated envelope, assigning id, insertion sequence, and
    /// creation timestamp. The returned record is immutable.
    async fn create(&self, envelope: EventEnvelope) -> Result<PersistedEvent>;

    /// Returns matching events ordered newest-first.
    async fn find(&self, filter: &EventFilter) -> Result<Vec<PersistedEvent>>;
}
