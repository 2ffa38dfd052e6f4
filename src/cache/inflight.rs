//! In-flight Fetch Registry
//!
//! Collapses concurrent fills of the same cache key into one pending fetch
//! that every caller awaits.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::Snapshot;
use crate::error::Result;

type SharedFill = Shared<BoxFuture<'static, Result<Snapshot>>>;

struct Pending {
    id: u64,
    fill: SharedFill,
}

// == Flight ==
/// Handle on a pending fill, either started by this caller or joined.
#[derive(Clone)]
pub struct Flight {
    fill: SharedFill,
    joined: bool,
}

impl Flight {
    /// True when the caller attached to a fill someone else started.
    pub fn joined(&self) -> bool {
        self.joined
    }

    /// Waits for the fill to resolve.
    pub async fn wait(self) -> Result<Snapshot> {
        self.fill.await
    }
}

// == Inflight Registry ==
/// Registry mapping cache keys to the fetch currently filling them.
///
/// Fills are spawned on the runtime so they run to completion even when every
/// caller stops waiting; the entry is removed as soon as the fill resolves.
#[derive(Default)]
pub struct InflightRegistry {
    pending: Mutex<HashMap<String, Pending>>,
    next_id: AtomicU64,
}

impl InflightRegistry {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Start Or Join ==
    /// Joins the fill pending for `key`, or starts `fill` if there is none.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_or_join<F>(self: &Arc<Self>, key: &str, fill: F) -> Flight
    where
        F: Future<Output = Result<Snapshot>> + Send + 'static,
    {
        let mut pending = self.pending.lock();
        if let Some(existing) = pending.get(key) {
            debug!(key, "Joining in-flight fetch");
            return Flight {
                fill: existing.fill.clone(),
                joined: true,
            };
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::downgrade(self);
        let owned_key = key.to_string();
        let shared = async move {
            let result = fill.await;
            if let Some(registry) = registry.upgrade() {
                registry.finish(&owned_key, id);
            }
            result
        }
        .boxed()
        .shared();

        pending.insert(
            key.to_string(),
            Pending {
                id,
                fill: shared.clone(),
            },
        );
        drop(pending);

        tokio::spawn(shared.clone());

        Flight {
            fill: shared,
            joined: false,
        }
    }

    // == Join ==
    /// Returns the fill pending for `key`, if any.
    pub fn join(&self, key: &str) -> Option<Flight> {
        self.pending.lock().get(key).map(|pending| Flight {
            fill: pending.fill.clone(),
            joined: true,
        })
    }

    /// Returns true while a fill for `key` is pending.
    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.lock().contains_key(key)
    }

    /// Number of keys with a pending fill.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    fn finish(&self, key: &str, id: u64) {
        let mut pending = self.pending.lock();
        // A newer fill may already own the key
        if pending.get(key).is_some_and(|entry| entry.id == id) {
            pending.remove(key);
        }
    }
}

impl fmt::Debug for InflightRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self.pending.lock();
        f.debug_struct("InflightRegistry")
            .field("pending", &pending.keys().collect::<Vec<_>>())
            .finish()
    }
}
