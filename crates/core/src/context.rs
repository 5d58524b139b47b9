//! Ambient page context captured at send time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::envelope::Metadata;

/// Width/height pair for viewport and screen measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub w: Option<u32>,
    pub h: Option<u32>,
}

impl Dimensions {
    pub fn new(w: u32, h: u32) -> Self {
        Self {
            w: Some(w),
            h: Some(h),
        }
    }
}

/// Snapshot of the page environment at the moment an event is built.
///
/// Values can change between events in the same page lifetime (navigation,
/// title updates, window resizes), so a snapshot is taken fresh per call and
/// never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub url: String,
    pub path: String,
    pub referrer: Option<String>,
    pub title: Option<String>,
    pub user_agent: Option<String>,
    pub viewport: Dimensions,
    pub screen: Dimensions,
    /// Wall-clock capture time.
    pub ts: DateTime<Utc>,
}

impl PageContext {
    /// Flattens the snapshot into the base metadata layer of an envelope.
    pub fn to_metadata(&self) -> Metadata {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_object().cloned())
            .unwrap_or_default()
    }
}
