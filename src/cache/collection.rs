//! Collection Cache
//!
//! Resolves a collection from memory, then session storage, then the remote
//! route, sharing one in-flight fetch between concurrent callers.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::lookup::find_first;
use crate::cache::{CacheContext, CacheStats, Item, Snapshot};
use crate::error::{CacheError, Result};
use crate::fetch::RemoteFetcher;
use crate::models::{Lookup, StoreOptions};
use crate::session::SessionStorage;
use crate::tasks::spawn_refresh_task;

// == Collection Cache ==
/// Cache for one logical collection.
///
/// Cloning is cheap; clones share the same in-memory sequence and counters.
#[derive(Clone)]
pub struct CollectionCache {
    inner: Arc<Inner>,
}

struct Inner {
    name: Option<String>,
    route: Option<String>,
    storage_key: Option<String>,
    items: RwLock<Snapshot>,
    stats: Mutex<CacheStats>,
    ctx: CacheContext,
}

impl CollectionCache {
    // == Constructor ==
    /// Creates a cache for the collection described by `options`.
    ///
    /// The storage key is the configured prefix followed by the name; a cache
    /// without a name is never persisted.
    pub fn new(options: StoreOptions, ctx: &CacheContext) -> Self {
        let name = options.effective_name();
        let route = options.effective_route();
        let storage_key = name.as_deref().map(|n| ctx.config.storage_key(n));

        let mut stats = CacheStats::new();
        stats.set_total_items(options.store.len());

        Self {
            inner: Arc::new(Inner {
                name,
                route,
                storage_key,
                items: RwLock::new(Arc::new(options.store)),
                stats: Mutex::new(stats),
                ctx: ctx.clone(),
            }),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub fn route(&self) -> Option<&str> {
        self.inner.route.as_deref()
    }

    pub fn storage_key(&self) -> Option<&str> {
        self.inner.storage_key.as_deref()
    }

    /// Returns the current in-memory contents.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.items.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.read().is_empty()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.stats.lock().clone()
    }

    // == Get All ==
    /// Returns the full collection.
    ///
    /// An empty memory is first restored from session storage. Cached contents
    /// are returned right away while a refresh runs in the background;
    /// otherwise the collection is fetched from the route.
    ///
    /// # Errors
    /// - `NotFound` if nothing is cached and no route is configured
    /// - Any fetch error when the collection has to come from the network
    pub async fn get_all(&self) -> Result<Snapshot> {
        let mut restored = false;
        if self.is_empty() {
            restored = self.restore();
        }

        if !self.is_empty() {
            {
                let mut stats = self.inner.stats.lock();
                if restored {
                    stats.record_restore();
                } else {
                    stats.record_memory_hit();
                }
            }
            self.refresh_in_background();
            return self.wait_populated().await;
        }

        match self.renew().await? {
            Some(items) => {
                self.inner.stats.lock().record_network_read();
                Ok(items)
            }
            None => Err(CacheError::NotFound(format!(
                "{} has no cached items and no route",
                self.label()
            ))),
        }
    }

    // == Get Single ==
    /// Returns the first item whose `key` field loosely equals `value`.
    pub async fn get_single(&self, key: &str, value: impl Into<Value>) -> Result<Item> {
        self.get_single_by(&Lookup::new(key, value)).await
    }

    /// Same as [`get_single`](Self::get_single) with a prepared [`Lookup`].
    pub async fn get_single_by(&self, lookup: &Lookup) -> Result<Item> {
        let items = self.get_all().await?;

        find_first(&items, lookup)
            .cloned()
            .ok_or_else(|| CacheError::ItemNotFound {
                key: lookup.key.clone(),
                value: lookup.value_label(),
            })
    }

    // == Wait Populated ==
    /// Resolves once memory holds items, waiting at most `config.wait_timeout`.
    ///
    /// # Errors
    /// - `EmptyStore` if memory is empty and no fill is in flight, or the fill
    ///   produced an empty collection
    /// - `WaitTimeout` if the in-flight fill outlives the wait bound
    /// - The fill's own error if it fails
    pub async fn wait_populated(&self) -> Result<Snapshot> {
        let current = self.snapshot();
        if !current.is_empty() {
            return Ok(current);
        }

        let flight = self
            .flight_key()
            .and_then(|key| self.inner.ctx.inflight.join(&key));
        let Some(flight) = flight else {
            return Err(CacheError::EmptyStore(self.label()));
        };

        let wait = self.inner.ctx.config.wait_timeout;
        match tokio::time::timeout(wait, flight.wait()).await {
            Ok(Ok(items)) => {
                self.replace(items.clone());
                if items.is_empty() {
                    Err(CacheError::EmptyStore(self.label()))
                } else {
                    Ok(items)
                }
            }
            Ok(Err(err)) => Err(err),
            Err(_) => Err(CacheError::WaitTimeout(wait)),
        }
    }

    // == Renew ==
    /// Re-fetches the collection from the route and replaces memory with it.
    ///
    /// Returns `Ok(None)` when no route is configured. Joins a fetch already
    /// in flight for the same key. On failure memory is left unchanged.
    pub async fn renew(&self) -> Result<Option<Snapshot>> {
        let Some(route) = self.inner.route.clone() else {
            debug!(cache = %self.label(), "No route configured, skipping renew");
            return Ok(None);
        };

        let key = flight_key(self.inner.storage_key.as_deref(), &route);
        let fill = fetch_collection(
            self.inner.ctx.fetcher.clone(),
            self.inner.ctx.session.clone(),
            route,
            self.inner.storage_key.clone(),
        );

        let flight = self.inner.ctx.inflight.start_or_join(&key, fill);
        let joined = flight.joined();
        if joined {
            self.inner.stats.lock().record_join();
        }

        // Only the caller that started the request counts its outcome
        match flight.wait().await {
            Ok(items) => {
                self.replace(items.clone());
                if !joined {
                    self.inner.stats.lock().record_fetch();
                }
                Ok(Some(items))
            }
            Err(err) => {
                if !joined {
                    self.inner.stats.lock().record_fetch_failure();
                }
                Err(err)
            }
        }
    }

    // == Background Refresh ==
    /// Spawns a renew on the runtime; `None` when no route is configured.
    pub fn refresh_in_background(&self) -> Option<JoinHandle<()>> {
        self.inner.route.as_ref()?;
        Some(spawn_refresh_task(self.clone()))
    }

    /// Human-readable name used in errors and logs.
    pub fn label(&self) -> String {
        match (&self.inner.name, &self.inner.route) {
            (Some(name), _) => name.clone(),
            (None, Some(route)) => route.clone(),
            (None, None) => "<unnamed>".to_string(),
        }
    }

    fn flight_key(&self) -> Option<String> {
        let route = self.inner.route.as_deref()?;
        Some(flight_key(self.inner.storage_key.as_deref(), route))
    }

    fn replace(&self, items: Snapshot) {
        let count = items.len();
        *self.inner.items.write() = items;
        self.inner.stats.lock().set_total_items(count);
    }

    /// Loads memory from session storage; returns true if items were restored.
    fn restore(&self) -> bool {
        let Some(key) = self.storage_key() else {
            return false;
        };

        let raw = match self.inner.ctx.session.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(err) => {
                warn!(key, error = %err, "Failed to read session storage");
                return false;
            }
        };

        match parse_collection(&raw) {
            Ok(items) => {
                debug!(key, items = items.len(), "Restored collection from session storage");
                let restored = !items.is_empty();
                self.replace(Arc::new(items));
                restored
            }
            Err(err) => {
                warn!(key, error = %err, "Ignoring unreadable persisted collection");
                false
            }
        }
    }
}

impl fmt::Debug for CollectionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionCache")
            .field("name", &self.inner.name)
            .field("route", &self.inner.route)
            .field("storage_key", &self.inner.storage_key)
            .field("items", &self.inner.items.read().len())
            .finish()
    }
}

/// Registry key for a fetch: caches share a request only when both the
/// storage slot and the route are the same.
fn flight_key(storage_key: Option<&str>, route: &str) -> String {
    match storage_key {
        Some(key) => format!("{}\u{0}{}", key, route),
        None => route.to_string(),
    }
}

// == Parsing ==
/// Parses persisted text into an item sequence; it must be a JSON array.
pub fn parse_collection(raw: &str) -> Result<Vec<Item>> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| CacheError::Parse(e.to_string()))?;
    into_items(value)
}

fn into_items(value: Value) -> Result<Vec<Item>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(CacheError::Parse(format!(
            "expected a JSON array, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Fetches the route and persists the body before handing it to waiters.
async fn fetch_collection(
    fetcher: Arc<dyn RemoteFetcher>,
    session: Arc<dyn SessionStorage>,
    route: String,
    storage_key: Option<String>,
) -> Result<Snapshot> {
    let items = into_items(fetcher.get_json(&route).await?)?;

    if let Some(key) = storage_key {
        let raw = serde_json::to_string(&items).map_err(|e| CacheError::Parse(e.to_string()))?;
        session.set(&key, &raw)?;
    }

    info!(route = %route, items = items.len(), "Fetched collection");
    Ok(Arc::new(items))
}
