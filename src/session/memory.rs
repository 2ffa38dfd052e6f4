//! In-memory session storage.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{SessionScope, SessionStorage};
use crate::error::Result;

/// Session storage held in process memory.
#[derive(Debug)]
pub struct MemorySession {
    scope: SessionScope,
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySession {
    /// Creates storage for a freshly generated session.
    pub fn new() -> Self {
        Self::with_scope(SessionScope::generate())
    }

    pub fn with_scope(scope: SessionScope) -> Self {
        Self {
            scope,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Ends the session, dropping every stored value.
    pub fn end(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStorage for MemorySession {
    fn scope(&self) -> &SessionScope {
        &self.scope
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
