//! Test fixtures: envelopes, page state, and agent configuration.

use agent::{AgentConfig, PageState};
use surface_core::{Dimensions, Metadata};

/// A well-formed envelope body for `POST /api/events`.
pub fn envelope(tag_id: &str) -> serde_json::Value {
    envelope_of_type(tag_id, "page_view")
}

/// A well-formed envelope body with the given event type.
pub fn envelope_of_type(tag_id: &str, event_type: &str) -> serde_json::Value {
    serde_json::json!({
        "tagId": tag_id,
        "visitorId": "v1",
        "eventType": event_type,
        "eventName": "Home",
        "metadata": {
            "url": "https://example.com/",
            "path": "/",
            "title": "Home",
        },
    })
}

/// Envelope body missing one required field.
pub fn envelope_without(tag_id: &str, missing: &str) -> serde_json::Value {
    let mut body = envelope(tag_id);
    let map = body.as_object_mut().expect("object body");
    map.remove(missing);
    serde_json::Value::Object(map.clone())
}

/// Page state the capture agent snapshots per event.
pub fn page_state() -> PageState {
    PageState {
        url: "https://example.com/".into(),
        path: "/".into(),
        referrer: None,
        title: Some("Home".into()),
        user_agent: Some("Mozilla/5.0".into()),
        viewport: Dimensions::new(1280, 720),
        screen: Dimensions::new(2560, 1440),
    }
}

/// Agent configuration pointing at a test tag.
pub fn agent_config(tag_id: &str) -> AgentConfig {
    AgentConfig {
        tag_id: Some(tag_id.into()),
        ..AgentConfig::default()
    }
}

/// Call properties for a custom event.
pub fn props(pairs: &[(&str, serde_json::Value)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
