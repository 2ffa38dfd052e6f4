//! Construction options for a collection cache
//!
//! Mirrors the `{ store, route, name }` options object a cache is built from.

use serde::Deserialize;

use crate::cache::Item;

/// Cache name used when none is given.
pub const DEFAULT_NAME: &str = "base";

fn default_name() -> Option<String> {
    Some(DEFAULT_NAME.to_string())
}

/// Options describing one logical collection.
///
/// # Fields
/// - `store`: Initial item sequence (default: empty)
/// - `route`: Remote source URL (default: none)
/// - `name`: Cache key suffix (default: `base`, `null` disables persistence)
#[derive(Debug, Clone, Deserialize)]
pub struct StoreOptions {
    /// Initial in-memory items
    #[serde(default)]
    pub store: Vec<Item>,
    /// Remote endpoint the collection is fetched from
    #[serde(default)]
    pub route: Option<String>,
    /// Name distinguishing this collection in session storage
    #[serde(default = "default_name")]
    pub name: Option<String>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            store: Vec::new(),
            route: None,
            name: default_name(),
        }
    }
}

impl StoreOptions {
    /// Creates options with every field at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the remote source route.
    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Sets the cache name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Disables session persistence for this cache.
    pub fn without_name(mut self) -> Self {
        self.name = None;
        self
    }

    /// Seeds the in-memory item sequence.
    pub fn store(mut self, items: Vec<Item>) -> Self {
        self.store = items;
        self
    }

    /// Returns the effective name: an empty name falls back to the default.
    pub fn effective_name(&self) -> Option<String> {
        self.name.as_ref().map(|name| {
            if name.is_empty() {
                DEFAULT_NAME.to_string()
            } else {
                name.clone()
            }
        })
    }

    /// Returns the route with surrounding whitespace removed, or `None` if blank.
    pub fn effective_route(&self) -> Option<String> {
        self.route
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
    }
}
