//! Persisted event records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::envelope::{EventEnvelope, Metadata};

/// Server-side event record.
///
/// An [`EventEnvelope`] plus server-assigned identity, insertion sequence,
/// and creation timestamp. The creation timestamp is the authoritative
/// ordering key for all downstream consumers; `seq` breaks ties between
/// records created in the same instant. Records are immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEvent {
    pub id: Uuid,
    /// Monotonic insertion sequence assigned by the store.
    pub seq: u64,
    pub tag_id: String,
    pub visitor_id: String,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl PersistedEvent {
    /// Materializes a validated envelope into a record with server-assigned
    /// id, sequence, and creation timestamp.
    pub fn from_envelope(envelope: EventEnvelope, seq: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            seq,
            tag_id: envelope.tag_id,
            visitor_id: envelope.visitor_id,
            event_type: envelope.event_type,
            event_name: envelope.event_name,
            metadata: envelope.metadata,
            created_at: Utc::now(),
        }
    }
}

/// Sorts newest-first by creation time, insertion sequence breaking ties.
pub fn sort_newest_first(events: &mut [PersistedEvent]) {
    events.sort_by(|a, b| (b.created_at, b.seq).cmp(&(a.created_at, a.seq)));
}
