//! Ambient context sources.

use chrono::Utc;
use parking_lot::Mutex;

use surface_core::{Dimensions, PageContext};

/// Supplies the ambient page context for envelope construction.
///
/// `snapshot` is called once per event and must return current values, not
/// cached ones: URL, title, and dimensions can all change between events in
/// the same page lifetime.
pub trait ContextSource: Send + Sync {
    fn snapshot(&self) -> PageContext;
}

/// Mutable page state owned by the embedding host.
#[derive(Debug, Clone, Default)]
pub struct PageState {
    pub url: String,
    pub path: String,
    pub referrer: Option<String>,
    pub title: Option<String>,
    pub user_agent: Option<String>,
    pub viewport: Dimensions,
    pub screen: Dimensions,
}

/// Context source over host-supplied page state.
///
/// The host updates the state as its view changes (navigation, title
/// updates, resizes); every snapshot reads the state at that moment and
/// stamps the wall clock.
#[derive(Debug, Default)]
pub struct HostContextSource {
    state: Mutex<PageState>,
}

impl HostContextSource {
    pub fn new(state: PageState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Applies a host-side update to the page state.
    pub fn update(&self, apply: impl FnOnce(&mut PageState)) {
        apply(&mut self.state.lock());
    }
}

impl ContextSource for HostContextSource {
    fn snapshot(&self) -> PageContext {
        let state = self.state.lock();
        PageContext {
            url: state.url.clone(),
            path: state.path.clone(),
            referrer: state.referrer.clone(),
            title: state.title.clone(),
            user_agent: state.user_agent.clone(),
            viewport: state.viewport,
            screen: state.screen,
            ts: Utc::now(),
        }
    }
}
