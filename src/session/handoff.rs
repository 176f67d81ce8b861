//! Passing an enhancement result into the outline flow.
//!
//! Only the result reference travels; the bytes stay in the blob store.

use std::collections::HashMap;

/// Key under which the handed-off reference is kept.
///
/// The browser wizard uses the same key in `sessionStorage`.
pub const HANDOFF_KEY: &str = "inkline.enhanced_ref";

/// Session-scoped string key/value storage.
pub trait EphemeralStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// Process-local store, lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EphemeralStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionHandoff<S: EphemeralStore> {
    store: S,
}

impl<S: EphemeralStore> SessionHandoff<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record `result_ref` for the outline page. Blank references are ignored.
    pub fn handoff(&mut self, result_ref: &str) {
        let result_ref = result_ref.trim();
        if result_ref.is_empty() {
            tracing::debug!("Ignoring empty handoff reference");
            return;
        }
        tracing::debug!(result_ref, "Handing off enhanced result");
        self.store.set(HANDOFF_KEY, result_ref.to_string());
    }

    /// Read the pending reference without clearing it.
    pub fn consume(&self) -> Option<String> {
        self.store.get(HANDOFF_KEY).filter(|r| !r.is_empty())
    }

    pub fn clear(&mut self) {
        self.store.remove(HANDOFF_KEY);
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
