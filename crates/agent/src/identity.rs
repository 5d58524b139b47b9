//! Durable visitor identity.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use surface_core::{Error, Result};

/// Best-effort client-side key-value persistence.
///
/// Modeled on browser local storage: reads that fail for any reason report
/// the value as absent, and callers treat a failed write as "will be absent
/// next load" and continue with their in-memory copy. Neither operation ever
/// interrupts the host.
pub trait IdentityStore: Send + Sync {
    /// Returns the stored value, or `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Persists the value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Volatile store; identity lasts for the process lifetime only.
///
/// Also the fallback behavior when a durable store is unavailable.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Durable store backed by a small JSON file.
#[derive(Debug)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> HashMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }
}

impl IdentityStore for FileIdentityStore {
    fn get(&self, key: &str) -> Option<String> {
        self.load().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load();
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::storage_unavailable(e.to_string()))?;
        }

        let raw = serde_json::to_string(&entries)?;
        std::fs::write(&self.path, raw).map_err(|e| Error::storage_unavailable(e.to_string()))
    }
}

/// Loads the visitor id from the store, generating and best-effort
/// persisting a fresh one when absent.
///
/// A failed write leaves the identity in-memory only for this agent's
/// lifetime; the next construction will generate a new id.
pub fn load_or_create_visitor_id(store: &dyn IdentityStore, key: &str) -> String {
    if let Some(existing) = store.get(key) {
        if !existing.is_empty() {
            debug!(visitor_id = %existing, "Loaded visitor identity");
            return existing;
        }
    }

    let id = Uuid::new_v4().to_string();
    if let Err(e) = store.set(key, &id) {
        warn!(error = %e, "Identity storage unavailable, visitor id is in-memory only");
    }
    id
}
