//! Event ingestion and query handlers.

use axum::{body::Bytes, extract::Query, extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use telemetry::metrics;
use tracing::{debug, error, info, warn};
use validator::Validate;

use event_store::EventFilter;
use surface_core::{issues_from, limits::DEFAULT_QUERY_LIMIT, EventEnvelope, ValidationIssue};

use crate::response::{ApiError, EventCreatedResponse, EventsResponse};
use crate::state::AppState;

/// POST /api/events - Ingests one envelope.
///
/// Validates the body, persists a record, and broadcasts it to live viewers.
/// Persistence and broadcast are uncoupled: a failed or partial broadcast
/// never fails the request, and a persistence failure is surfaced as 500
/// without retry (the sender is fire-and-forget).
pub async fn create_event(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<EventCreatedResponse>), ApiError> {
    metrics().events_received.inc();

    let envelope: EventEnvelope = serde_json::from_slice(&body).map_err(|e| {
        metrics().events_rejected.inc();
        debug!(error = %e, "Rejected unparseable event body");
        ApiError::invalid_body(vec![ValidationIssue::new("body", e.to_string())])
    })?;

    if let Err(errors) = envelope.validate() {
        metrics().events_rejected.inc();
        return Err(ApiError::invalid_body(issues_from(&errors)));
    }

    let event = state.store.create(envelope).await.map_err(|e| {
        metrics().persistence_errors.inc();
        error!(error = %e, "Failed to persist event");
        ApiError::record_failed(e.to_string())
    })?;

    metrics().events_persisted.inc();

    match serde_json::to_string(&event) {
        Ok(payload) => {
            let outcome = state.bus.broadcast(&payload);
            metrics().broadcasts_sent.inc();
            if outcome.dropped > 0 {
                metrics()
                    .broadcast_writes_failed
                    .inc_by(outcome.dropped as u64);
            }
            metrics()
                .active_subscribers
                .set(state.bus.subscriber_count() as u64);
            debug!(
                event_id = %event.id,
                delivered = outcome.delivered,
                dropped = outcome.dropped,
                "Broadcast new event"
            );
        }
        Err(e) => warn!(error = %e, "Failed to serialize event for broadcast"),
    }

    info!(
        event_id = %event.id,
        tag_id = %event.tag_id,
        event_type = %event.event_type,
        "Event recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(EventCreatedResponse::new(event)),
    ))
}

/// Query parameters for GET /api/events.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub tag_id: Option<String>,
    /// RFC 3339 timestamp; strictly-newer-than filter.
    pub since: Option<String>,
}

/// GET /api/events - Point query over persisted events, newest-first.
///
/// Without `since` the result is the most recent page; with `since` the cap
/// is removed and every qualifying record comes back, since the
/// incremental-sync path relies on that completeness.
pub async fn query_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ApiError> {
    let mut issues = Vec::new();

    if let Some(tag) = query.tag_id.as_deref() {
        if tag.is_empty() {
            issues.push(ValidationIssue::new("tagId", "tagId is required"));
        }
    }

    let since = match query.since.as_deref() {
        None => None,
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Some(dt.with_timezone(&Utc)),
            Err(_) => {
                issues.push(ValidationIssue::new(
                    "since",
                    "since must be an ISO 8601 timestamp",
                ));
                None
            }
        },
    };

    if !issues.is_empty() {
        return Err(ApiError::invalid_query(issues));
    }

    let filter = EventFilter {
        tag_id: query.tag_id,
        since,
        limit: if since.is_some() {
            None
        } else {
            Some(DEFAULT_QUERY_LIMIT)
        },
    };

    let events = state.store.find(&filter).await.map_err(|e| {
        error!(error = %e, "Failed to query events");
        ApiError::fetch_failed(e.to_string())
    })?;

    metrics().queries_served.inc();

    Ok(Json(EventsResponse { events }))
}
