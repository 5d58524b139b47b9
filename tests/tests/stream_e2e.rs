//! Tests for the live push channel.
//!
//! Subscribers join through the same bus the SSE route uses; ingestion
//! through the real router triggers the broadcasts.

use axum::http::StatusCode;
use axum_test::TestServer;
use fanout::NotificationBus;
use integration_tests::{fixtures, setup::TestContext};

#[tokio::test]
async fn test_ingested_event_is_pushed_to_subscriber() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let mut subscription = ctx.subscribe();

    let response = server
        .post("/api/events")
        .json(&fixtures::envelope("t1"))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: serde_json::Value = response.json();

    let payload = subscription.recv().await.expect("broadcast payload");
    let pushed: serde_json::Value = serde_json::from_str(&payload).expect("payload is JSON");
    assert_eq!(pushed["id"], created["event"]["id"]);
    assert_eq!(pushed["tagId"], "t1");
}

#[tokio::test]
async fn test_every_subscriber_receives_the_broadcast() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let mut a = ctx.subscribe();
    let mut b = ctx.subscribe();

    server.post("/api/events").json(&fixtures::envelope("t1")).await;

    assert!(a.recv().await.is_some());
    assert!(b.recv().await.is_some());
}

/// No history replay: a new subscriber only sees events broadcast after it
/// joined, and catches up on the past through the query endpoint.
#[tokio::test]
async fn test_new_subscriber_sees_no_history() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.post("/api/events").json(&fixtures::envelope("t1")).await;

    let mut subscription = ctx.subscribe();
    let mut fresh = fixtures::envelope("t1");
    fresh["eventName"] = serde_json::json!("after-join");
    server.post("/api/events").json(&fresh).await;

    let payload = subscription.recv().await.expect("broadcast payload");
    let pushed: serde_json::Value = serde_json::from_str(&payload).expect("payload is JSON");
    assert_eq!(pushed["eventName"], "after-join");
}

/// Disconnecting removes the subscriber; later broadcasts see an empty set.
#[tokio::test]
async fn test_disconnect_removes_subscriber() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let subscription = ctx.subscribe();
    assert_eq!(ctx.bus.subscriber_count(), 1);

    drop(subscription);
    assert_eq!(ctx.bus.subscriber_count(), 0);

    // Broadcast to nobody is fine; ingestion is unaffected.
    let response = server
        .post("/api/events")
        .json(&fixtures::envelope("t1"))
        .await;
    response.assert_status(StatusCode::CREATED);
}
