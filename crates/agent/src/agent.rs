//! Capture agent: the public client object.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{debug, warn};

use surface_core::{build_envelope, EventType, Metadata};

use crate::clicks::{click_properties, find_tracked_ancestor, ElementNode};
use crate::config::AgentConfig;
use crate::context::ContextSource;
use crate::identity::{load_or_create_visitor_id, IdentityStore};
use crate::transport::{HttpTransport, Transport};

/// Public-facing capture client.
///
/// Owns the visitor identity and the session context, builds envelopes from
/// a fresh ambient snapshot per call, and hands them to the transport.
/// Every failure mode on this path degrades to "no telemetry sent"; no
/// method panics or returns an error to the host.
pub struct CaptureAgent {
    endpoint: String,
    tag_id: Option<String>,
    auto_track_clicks: bool,
    click_attribute: String,
    identity_key: String,
    visitor_id: Mutex<String>,
    session_context: Mutex<Metadata>,
    identity: Arc<dyn IdentityStore>,
    context: Arc<dyn ContextSource>,
    transport: Arc<dyn Transport>,
}

impl CaptureAgent {
    /// Builds an agent dispatching over HTTP to the configured endpoint.
    pub fn new(
        config: AgentConfig,
        identity: Arc<dyn IdentityStore>,
        context: Arc<dyn ContextSource>,
    ) -> Self {
        let transport = Arc::new(HttpTransport::new(config.endpoint.clone()));
        Self::with_transport(config, identity, context, transport)
    }

    /// Builds an agent with an explicit transport (tests, custom delivery).
    pub fn with_transport(
        config: AgentConfig,
        identity: Arc<dyn IdentityStore>,
        context: Arc<dyn ContextSource>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let tag_id = config.resolve_tag_id();
        let visitor_id = load_or_create_visitor_id(identity.as_ref(), &config.identity_storage_key);

        debug!(
            tag_id = tag_id.as_deref().unwrap_or("none"),
            visitor_id = %visitor_id,
            "Capture agent initialized"
        );

        Self {
            endpoint: config.endpoint,
            tag_id,
            auto_track_clicks: config.auto_track_clicks,
            click_attribute: config.click_attribute,
            identity_key: config.identity_storage_key,
            visitor_id: Mutex::new(visitor_id),
            session_context: Mutex::new(Metadata::new()),
            identity,
            context,
            transport,
        }
    }

    /// The visitor identity active at this moment.
    pub fn visitor_id(&self) -> String {
        self.visitor_id.lock().clone()
    }

    /// Identify the visitor with an application-assigned user id.
    ///
    /// Overwrites the stored identity when the id differs, then dispatches a
    /// `user_identified` envelope carrying `traits`.
    pub fn identify(&self, user_id: &str, traits: Metadata) {
        if user_id.is_empty() {
            warn!("identify requires a non-empty user id");
            return;
        }

        if *self.visitor_id.lock() != user_id {
            *self.visitor_id.lock() = user_id.to_string();
            if let Err(e) = self.identity.set(&self.identity_key, user_id) {
                warn!(error = %e, "Identity storage unavailable, new identity is in-memory only");
            }
        }

        let mut metadata = Metadata::new();
        metadata.insert("traits".into(), serde_json::Value::Object(traits));
        self.send(EventType::UserIdentified, Some(user_id.to_string()), metadata);
    }

    /// Track a page view. `name` defaults to the current page title.
    pub fn page(&self, name: Option<&str>, props: Metadata) {
        self.send(EventType::PageView, name.map(ToString::to_string), props);
    }

    /// Track a custom event.
    pub fn track(&self, event_name: &str, props: Metadata) {
        if event_name.is_empty() {
            warn!("track requires a non-empty event name");
            return;
        }
        self.send(EventType::CustomEvent, Some(event_name.to_string()), props);
    }

    /// Shallow-merges `ctx` into the session context attached to every
    /// subsequent event; later calls override same keys.
    pub fn set_context(&self, ctx: Metadata) {
        let mut session = self.session_context.lock();
        for (k, v) in ctx {
            session.insert(k, v);
        }
    }

    /// Auto-click entry point: resolves the nearest marked ancestor of the
    /// click target and tracks one event for it.
    pub fn handle_click(&self, target: &ElementNode) {
        if !self.auto_track_clicks {
            return;
        }
        if let Some((node, name)) = find_tracked_ancestor(target, &self.click_attribute) {
            self.track(&name, click_properties(node));
        }
    }

    fn can_send(&self) -> bool {
        if self.endpoint.is_empty() {
            warn!("Missing endpoint, event dropped");
            return false;
        }
        if self.tag_id.as_deref().map(str::is_empty).unwrap_or(true) {
            warn!("Missing tagId, event dropped");
            return false;
        }
        if self.visitor_id.lock().is_empty() {
            warn!("Missing visitorId, event dropped");
            return false;
        }
        true
    }

    fn send(&self, event_type: EventType, name: Option<String>, props: Metadata) {
        if !self.can_send() {
            return;
        }

        // Fresh ambient snapshot per event; context can change between calls.
        let page = self.context.snapshot();
        let name = match (name, event_type) {
            (None, EventType::PageView) => page.title.clone(),
            (name, _) => name,
        };

        let tag_id = self.tag_id.clone().unwrap_or_default();
        let envelope = build_envelope(
            &tag_id,
            &self.visitor_id.lock(),
            event_type,
            name,
            &page,
            &self.session_context.lock(),
            &props,
        );

        self.transport.deliver(envelope);
    }
}

static DEFAULT_AGENT: OnceLock<Arc<CaptureAgent>> = OnceLock::new();

/// Process-wide convenience instance.
///
/// Construction is idempotent: the first call builds the agent, every later
/// call returns the same instance regardless of arguments, so the click
/// observer and identity load happen exactly once.
pub fn default_agent(
    config: AgentConfig,
    identity: Arc<dyn IdentityStore>,
    context: Arc<dyn ContextSource>,
) -> Arc<CaptureAgent> {
    DEFAULT_AGENT
        .get_or_init(|| Arc::new(CaptureAgent::new(config, identity, context)))
        .clone()
}
