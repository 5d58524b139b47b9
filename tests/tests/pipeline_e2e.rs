//! Full pipeline tests: capture agent → ingestion → retrieval.
//!
//! The agent dispatches through a `RecordingTransport` (same `Transport`
//! trait as the real HTTP transport); the test relays each captured envelope
//! through the real router, which is exactly what the fire-and-forget POST
//! does in production.

use std::sync::Arc;

use agent::{CaptureAgent, ElementNode, HostContextSource, MemoryIdentityStore};
use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, mocks::RecordingTransport, setup::TestContext};
use surface_core::Metadata;

struct Pipeline {
    ctx: TestContext,
    server: TestServer,
    agent: CaptureAgent,
    transport: Arc<RecordingTransport>,
}

fn pipeline(tag_id: &str) -> Pipeline {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let transport = Arc::new(RecordingTransport::new());
    let agent = CaptureAgent::with_transport(
        fixtures::agent_config(tag_id),
        Arc::new(MemoryIdentityStore::new()),
        Arc::new(HostContextSource::new(fixtures::page_state())),
        transport.clone(),
    );

    Pipeline {
        ctx,
        server,
        agent,
        transport,
    }
}

impl Pipeline {
    /// Relay every captured envelope through the ingestion endpoint.
    async fn relay_captured(&self) -> usize {
        let envelopes = self.transport.captured();
        let count = envelopes.len();
        for envelope in envelopes {
            let response = self.server.post("/api/events").json(&envelope).await;
            response.assert_status(StatusCode::CREATED);
        }
        self.transport.clear();
        count
    }

    async fn events_for(&self, tag_id: &str) -> Vec<serde_json::Value> {
        let response = self
            .server
            .get("/api/events")
            .add_query_param("tagId", tag_id)
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["events"].as_array().expect("events array").clone()
    }
}

#[tokio::test]
async fn test_page_track_identify_flow() {
    let p = pipeline("t1");

    p.agent.page(None, Metadata::new());
    p.agent.track(
        "signup",
        fixtures::props(&[("plan", serde_json::json!("pro"))]),
    );
    p.agent.identify("user-42", Metadata::new());

    let relayed = p.relay_captured().await;
    assert_eq!(relayed, 3);

    let events = p.events_for("t1").await;
    assert_eq!(events.len(), 3);

    // Newest-first: identify last in, first out.
    assert_eq!(events[0]["eventType"], "user_identified");
    assert_eq!(events[0]["eventName"], "user-42");
    assert_eq!(events[1]["eventType"], "custom_event");
    assert_eq!(events[1]["metadata"]["plan"], "pro");
    assert_eq!(events[2]["eventType"], "page_view");
    assert_eq!(events[2]["eventName"], "Home");

    // Ambient context landed in every envelope.
    assert!(events
        .iter()
        .all(|e| e["metadata"]["url"] == "https://example.com/"));
}

/// identify("user-42") followed by any dispatch uses the new visitor id.
#[tokio::test]
async fn test_events_after_identify_carry_new_identity() {
    let p = pipeline("t1");

    p.agent.page(None, Metadata::new());
    p.agent.identify("user-42", Metadata::new());
    p.agent.track("upgrade", Metadata::new());
    p.relay_captured().await;

    let events = p.events_for("t1").await;
    assert_eq!(events[0]["eventType"], "custom_event");
    assert_eq!(events[0]["visitorId"], "user-42");
    // The pre-identify page view kept the generated visitor id.
    assert_ne!(events[2]["visitorId"], "user-42");
}

/// Auto-clicks resolve to the nearest marked ancestor and arrive as one
/// custom event.
#[tokio::test]
async fn test_auto_click_reaches_the_dashboard() {
    let p = pipeline("t1");

    let container = ElementNode::new("section").with_attribute("data-surface-event", "outer");
    let button = ElementNode::new("button")
        .with_id("cta")
        .with_attribute("data-surface-event", "start-trial")
        .with_parent(container);
    let target = ElementNode::new("span")
        .with_text("Start trial")
        .with_parent(button);

    p.agent.handle_click(&target);
    let relayed = p.relay_captured().await;
    assert_eq!(relayed, 1, "exactly one track per click");

    let events = p.events_for("t1").await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["eventType"], "custom_event");
    assert_eq!(events[0]["eventName"], "start-trial");
    assert_eq!(events[0]["metadata"]["elementId"], "cta");
    assert_eq!(events[0]["metadata"]["text"], "Start trial");
}

/// New events pushed through the ingestion endpoint reach a live subscriber.
#[tokio::test]
async fn test_captured_event_reaches_live_subscriber() {
    let p = pipeline("t1");
    let mut subscription = p.ctx.subscribe();

    p.agent.track("signup", Metadata::new());
    p.relay_captured().await;

    let payload = subscription.recv().await.expect("broadcast payload");
    let event: serde_json::Value = serde_json::from_str(&payload).expect("payload is JSON");
    assert_eq!(event["eventType"], "custom_event");
    assert_eq!(event["eventName"], "signup");
}
