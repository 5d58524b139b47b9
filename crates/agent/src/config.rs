//! Capture agent configuration.

use url::Url;

/// Default ingestion URL.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/api/events";

/// Attribute marking clickable tracked elements.
pub const DEFAULT_CLICK_ATTRIBUTE: &str = "data-surface-event";

/// Identity store key for the visitor id.
pub const DEFAULT_IDENTITY_STORAGE_KEY: &str = "_sf_visitor_id";

/// Capture agent configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Ingestion URL events are POSTed to.
    pub endpoint: String,
    /// Site/project identifier. When unset, falls back to the `id` query
    /// parameter of `script_url`.
    pub tag_id: Option<String>,
    /// URL the embedding host loaded the capture script from; carries the
    /// tag id as `?id=` in the standard install snippet.
    pub script_url: Option<String>,
    /// Observe auto-tracked clicks.
    pub auto_track_clicks: bool,
    pub click_attribute: String,
    pub identity_storage_key: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            tag_id: None,
            script_url: None,
            auto_track_clicks: true,
            click_attribute: DEFAULT_CLICK_ATTRIBUTE.to_string(),
            identity_storage_key: DEFAULT_IDENTITY_STORAGE_KEY.to_string(),
        }
    }
}

impl AgentConfig {
    /// Effective tag id: explicit configuration first, then the script URL
    /// fallback.
    pub fn resolve_tag_id(&self) -> Option<String> {
        if let Some(tag) = self.tag_id.as_deref() {
            if !tag.is_empty() {
                return Some(tag.to_string());
            }
        }
        self.script_url.as_deref().and_then(tag_id_from_script_url)
    }
}

/// Extracts the `id` query parameter from the loading script's URL.
pub fn tag_id_from_script_url(script_url: &str) -> Option<String> {
    let url = Url::parse(script_url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
