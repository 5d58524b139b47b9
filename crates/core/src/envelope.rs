//! Event envelope construction and validation.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::context::PageContext;
use crate::error::ValidationIssue;
use crate::limits::MAX_METADATA_BYTES;

/// Open key-value map attached to every envelope.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Closed set of categories the capture agent emits.
///
/// The server accepts any non-empty `eventType` string; this enum constrains
/// what the agent itself produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PageView,
    CustomEvent,
    UserIdentified,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PageView => "page_view",
            Self::CustomEvent => "custom_event",
            Self::UserIdentified => "user_identified",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates serialized metadata size.
fn validate_metadata_size(metadata: &Metadata) -> Result<(), ValidationError> {
    if metadata.is_empty() {
        return Ok(());
    }

    let size = serde_json::to_vec(metadata).map(|v| v.len()).unwrap_or(0);

    if size > MAX_METADATA_BYTES {
        let mut err = ValidationError::new("metadata_too_large");
        err.message = Some(
            format!(
                "metadata {}KB exceeds {}KB limit",
                size / 1024,
                MAX_METADATA_BYTES / 1024
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// The unit of transport and storage.
///
/// Every transmitted envelope carries a non-empty `tagId`, `visitorId`, and
/// `eventType`; envelopes missing any of these fail validation and are never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Site/project identifier of the ingesting tenant.
    #[validate(length(min = 1, message = "tagId is required"))]
    pub tag_id: String,
    /// Visitor identity active at send time.
    #[validate(length(min = 1, message = "visitorId is required"))]
    pub visitor_id: String,
    #[validate(length(min = 1, message = "eventType is required"))]
    pub event_type: String,
    /// Human-readable label: page title, custom event name, or assigned
    /// user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_metadata_size"))]
    pub metadata: Metadata,
}

/// Assembles a canonical envelope from call-site data, ambient page context,
/// and session context.
///
/// Metadata layering, later overriding earlier on key collision:
/// ambient page context, then session context, then call properties.
pub fn build_envelope(
    tag_id: &str,
    visitor_id: &str,
    event_type: EventType,
    event_name: Option<String>,
    page: &PageContext,
    session_context: &Metadata,
    properties: &Metadata,
) -> EventEnvelope {
    let mut metadata = page.to_metadata();
    for (k, v) in session_context {
        metadata.insert(k.clone(), v.clone());
    }
    for (k, v) in properties {
        metadata.insert(k.clone(), v.clone());
    }

    EventEnvelope {
        tag_id: tag_id.to_string(),
        visitor_id: visitor_id.to_string(),
        event_type: event_type.as_str().to_string(),
        event_name,
        metadata,
    }
}

/// Converts a struct field name to its wire form (`tag_id` -> `tagId`).
fn wire_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Flattens `validator` output into wire-named issues for a 400 response.
pub fn issues_from(errors: &ValidationErrors) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            let field = wire_field(field);
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                ValidationIssue::new(field.clone(), message)
            })
        })
        .collect();
    issues.sort_by(|a, b| a.field.cmp(&b.field));
    issues
}
