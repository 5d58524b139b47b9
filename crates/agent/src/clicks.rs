//! Declarative click instrumentation.
//!
//! Elements marked with the configured click attribute are auto-tracked:
//! a click anywhere inside a marked element resolves to the nearest marked
//! ancestor and produces one `custom_event`.

use std::collections::HashMap;

use surface_core::limits::CLICK_TEXT_MAX_CHARS;
use surface_core::Metadata;

/// Event name used when the click attribute is present but empty.
pub const DEFAULT_CLICK_EVENT: &str = "click";

/// Lightweight view of an element in the host's render tree, linked upward
/// to its parent.
#[derive(Debug, Clone, Default)]
pub struct ElementNode {
    pub tag: String,
    pub id: Option<String>,
    pub class_name: Option<String>,
    /// Visible text content.
    pub text: String,
    pub attributes: HashMap<String, String>,
    pub parent: Option<Box<ElementNode>>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_parent(mut self, parent: ElementNode) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    fn is_body(&self) -> bool {
        self.tag.eq_ignore_ascii_case("body")
    }
}

/// Walks from the click target up through its ancestors, stopping at the
/// document body, and returns the first node carrying `attr` together with
/// the event name to track.
///
/// The nearest marked ancestor wins; outer marked containers are never
/// consulted once a match is found.
pub fn find_tracked_ancestor<'a>(
    target: &'a ElementNode,
    attr: &str,
) -> Option<(&'a ElementNode, String)> {
    let mut current = Some(target);
    while let Some(node) = current {
        if node.is_body() {
            return None;
        }
        if let Some(value) = node.attributes.get(attr) {
            let name = if value.is_empty() {
                DEFAULT_CLICK_EVENT.to_string()
            } else {
                value.clone()
            };
            return Some((node, name));
        }
        current = node.parent.as_deref();
    }
    None
}

/// Properties reported for an auto-tracked click.
pub fn click_properties(node: &ElementNode) -> Metadata {
    let text: String = node.text.chars().take(CLICK_TEXT_MAX_CHARS).collect();

    let mut props = Metadata::new();
    props.insert(
        "elementId".into(),
        node.id.clone().map(Into::into).unwrap_or(serde_json::Value::Null),
    );
    props.insert("tag".into(), node.tag.clone().into());
    props.insert(
        "class".into(),
        node.class_name
            .clone()
            .map(Into::into)
            .unwrap_or(serde_json::Value::Null),
    );
    props.insert(
        "text".into(),
        if text.is_empty() {
            serde_json::Value::Null
        } else {
            text.into()
        },
    );
    props
}
