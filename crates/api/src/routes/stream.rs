//! Live event stream (SSE).

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use telemetry::metrics;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use crate::state::AppState;

/// GET /api/events/stream - Persistent text event stream.
///
/// Sends an initial connectivity marker, then forwards broadcast payloads
/// until the client disconnects. There is no history replay: a new viewer
/// performs an initial load through the query endpoint instead. Dropping the
/// stream on disconnect unsubscribes the channel.
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.bus.clone().subscribe();
    debug!(subscriber = %subscription.id(), "Stream opened");

    metrics()
        .active_subscribers
        .set(state.bus.subscriber_count() as u64);

    let hello = tokio_stream::once(Ok::<_, Infallible>(
        Event::default().event("ping").data("connected"),
    ));
    let feed = subscription.map(|payload| Ok::<_, Infallible>(Event::default().data(payload)));

    Sse::new(hello.chain(feed)).keep_alive(KeepAlive::default())
}
