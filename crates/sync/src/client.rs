//! Sync client: incremental retrieval and merge.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use surface_core::{sort_newest_first, PersistedEvent, Result};

use crate::api::EventsApi;

/// Viewer-facing lifecycle: one full load, then repeated delta loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    LoadingInitial,
    LoadingDelta,
    Ready,
    /// Initial load failed; retryable, nothing accumulated is lost.
    Error,
}

#[derive(Debug)]
struct SyncState {
    phase: SyncPhase,
    /// Newest-first, unique by id across all loads.
    events: Vec<PersistedEvent>,
    seen: HashSet<Uuid>,
    /// Creation timestamp of the newest observed event. Only ever advances.
    cursor: Option<DateTime<Utc>>,
    /// Most recent load failure, kept for the viewing UI; delta failures are
    /// transient and cleared by the next successful load.
    last_error: Option<String>,
}

/// Point-in-time copy of the sync state for rendering.
#[derive(Debug, Clone)]
pub struct SyncSnapshot {
    pub phase: SyncPhase,
    pub events: Vec<PersistedEvent>,
    pub cursor: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Dashboard-side incremental retrieval.
///
/// Cheap to clone; clones share state, so one clone can poll in a background
/// task while another renders snapshots.
#[derive(Clone)]
pub struct SyncClient {
    api: Arc<dyn EventsApi>,
    tag_id: String,
    state: Arc<Mutex<SyncState>>,
}

impl SyncClient {
    pub fn new(api: Arc<dyn EventsApi>, tag_id: impl Into<String>) -> Self {
        Self {
            api,
            tag_id: tag_id.into(),
            state: Arc::new(Mutex::new(SyncState {
                phase: SyncPhase::Idle,
                events: Vec::new(),
                seen: HashSet::new(),
                cursor: None,
                last_error: None,
            })),
        }
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        let state = self.state.lock();
        SyncSnapshot {
            phase: state.phase,
            events: state.events.clone(),
            cursor: state.cursor,
            last_error: state.last_error.clone(),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.state.lock().phase
    }

    pub fn events(&self) -> Vec<PersistedEvent> {
        self.state.lock().events.clone()
    }

    pub fn cursor(&self) -> Option<DateTime<Utc>> {
        self.state.lock().cursor
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    /// Full load: replaces the accumulated view with the server's most
    /// recent page and seeds the cursor.
    pub async fn load_initial(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            state.phase = SyncPhase::LoadingInitial;
            state.last_error = None;
        }

        match self.api.fetch(&self.tag_id, None).await {
            Ok(mut batch) => {
                sort_newest_first(&mut batch);
                let mut state = self.state.lock();
                state.seen = batch.iter().map(|e| e.id).collect();
                state.cursor = batch.first().map(|e| e.created_at);
                state.events = batch;
                state.phase = SyncPhase::Ready;
                debug!(tag_id = %self.tag_id, count = state.events.len(), "Initial load complete");
                Ok(())
            }
            Err(e) => {
                let mut state = self.state.lock();
                state.phase = SyncPhase::Error;
                state.last_error = Some(e.to_string());
                warn!(tag_id = %self.tag_id, error = %e, "Initial load failed");
                Err(e)
            }
        }
    }

    /// Delta load: fetches events strictly newer than the cursor and merges
    /// them in. Returns the number of new events added to the view.
    ///
    /// A no-op unless the client is `Ready`, which also means an in-flight
    /// delta causes later callers to skip rather than race the cursor.
    /// Failures leave the accumulated view untouched and are retried by the
    /// next poll tick.
    pub async fn load_delta(&self) -> Result<usize> {
        let cursor = {
            let mut state = self.state.lock();
            if state.phase != SyncPhase::Ready {
                return Ok(0);
            }
            state.phase = SyncPhase::LoadingDelta;
            state.cursor
        };

        match self.api.fetch(&self.tag_id, cursor).await {
            Ok(batch) => {
                let mut state = self.state.lock();
                let merged = merge_batch(&mut state, batch);
                state.phase = SyncPhase::Ready;
                state.last_error = None;
                if merged > 0 {
                    debug!(tag_id = %self.tag_id, merged, "Delta merged");
                }
                Ok(merged)
            }
            Err(e) => {
                let mut state = self.state.lock();
                state.phase = SyncPhase::Ready;
                state.last_error = Some(e.to_string());
                warn!(tag_id = %self.tag_id, error = %e, "Delta load failed, will retry");
                Err(e)
            }
        }
    }

    /// Polling loop: initial load, then a delta per tick.
    ///
    /// Ticks are serialized: the loop awaits the in-flight load before the
    /// interval yields again, and missed ticks are delayed rather than
    /// stacked, so delta loads never overlap. A failed initial load is
    /// retried on the next tick.
    pub async fn run(&self, poll_interval: Duration) {
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let result = match self.phase() {
                SyncPhase::Ready => self.load_delta().await.map(|_| ()),
                _ => self.load_initial().await,
            };
            // Already recorded in state; polling continues regardless.
            result.ok();
        }
    }

    /// Spawns [`Self::run`] on the current runtime.
    pub fn spawn_polling(&self, poll_interval: Duration) -> tokio::task::JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move { client.run(poll_interval).await })
    }
}

/// Merges a delta batch into the accumulated view.
///
/// The batch is sorted newest-first, already-seen ids are dropped, and the
/// remainder is prepended; the accumulated list itself is never re-sorted.
/// The cursor advances to the newest raw-batch timestamp, via max() so it
/// never regresses.
fn merge_batch(state: &mut SyncState, mut batch: Vec<PersistedEvent>) -> usize {
    if batch.is_empty() {
        return 0;
    }

    sort_newest_first(&mut batch);

    let newest = batch[0].created_at;
    state.cursor = Some(state.cursor.map_or(newest, |cursor| cursor.max(newest)));

    let mut fresh: Vec<PersistedEvent> = batch
        .into_iter()
        .filter(|e| !state.seen.contains(&e.id))
        .collect();
    for event in &fresh {
        state.seen.insert(event.id);
    }

    let merged = fresh.len();
    fresh.append(&mut state.events);
    state.events = fresh;
    merged
}
