//! Tests for validation failures in the ingestion endpoint.
//!
//! Malformed bodies and queries produce structured 400s with itemized
//! issues; nothing is persisted on a rejected request.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};

fn issue_fields(body: &serde_json::Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .map(|e| e["field"].as_str().expect("field").to_string())
        .collect()
}

/// Scenario: missing tagId is rejected with an issue naming the field.
#[tokio::test]
async fn test_missing_tag_id_returns_400() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/api/events")
        .json(&fixtures::envelope_without("t1", "tagId"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Invalid request body");
    assert!(issue_fields(&body).contains(&"tagId".to_string()));

    assert_eq!(ctx.store.len(), 0, "rejected envelopes are never persisted");
}

#[tokio::test]
async fn test_missing_visitor_id_returns_400() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/api/events")
        .json(&fixtures::envelope_without("t1", "visitorId"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(issue_fields(&body).contains(&"visitorId".to_string()));
}

/// Required fields must be non-empty, not merely present.
#[tokio::test]
async fn test_empty_required_fields_return_400() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let mut envelope = fixtures::envelope("t1");
    envelope["tagId"] = serde_json::json!("");
    envelope["eventType"] = serde_json::json!("");

    let response = server.post("/api/events").json(&envelope).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    let fields = issue_fields(&body);
    assert!(fields.contains(&"tagId".to_string()));
    assert!(fields.contains(&"eventType".to_string()));
}

/// An unparseable body is a validation failure, not a server error.
#[tokio::test]
async fn test_unparseable_body_returns_400() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/api/events")
        .content_type("application/json")
        .bytes("not json at all".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Invalid request body");
    assert!(issue_fields(&body).contains(&"body".to_string()));
}

/// Metadata defaults to empty when omitted.
#[tokio::test]
async fn test_missing_metadata_defaults_to_empty() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/api/events")
        .json(&fixtures::envelope_without("t1", "metadata"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert!(body["event"]["metadata"]
        .as_object()
        .expect("metadata object")
        .is_empty());
}

/// Oversized metadata is rejected before persistence.
#[tokio::test]
async fn test_oversized_metadata_returns_400() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let mut envelope = fixtures::envelope("t1");
    envelope["metadata"]["blob"] = serde_json::json!("x".repeat(17 * 1024));

    let response = server.post("/api/events").json(&envelope).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(ctx.store.len(), 0);
}

/// Empty tagId in the query string is rejected with an issue naming it.
#[tokio::test]
async fn test_get_with_empty_tag_id_returns_400() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server.get("/api/events").add_query_param("tagId", "").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Invalid query parameters");
    assert!(issue_fields(&body).contains(&"tagId".to_string()));
}

/// A malformed since timestamp is rejected with an issue naming it.
#[tokio::test]
async fn test_get_with_invalid_since_returns_400() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .get("/api/events")
        .add_query_param("tagId", "t1")
        .add_query_param("since", "yesterday")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(issue_fields(&body).contains(&"since".to_string()));
}

/// A query without tagId is valid: the recent page across all tags.
#[tokio::test]
async fn test_get_without_tag_id_is_allowed() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server.post("/api/events").json(&fixtures::envelope("t1")).await;
    server.post("/api/events").json(&fixtures::envelope("t2")).await;

    let response = server.get("/api/events").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["events"].as_array().expect("events array").len(), 2);
}
