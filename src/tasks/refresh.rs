//! Background Refresh Task
//!
//! Renews a collection while callers keep reading the cached contents.

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CollectionCache;

/// Spawns a task that renews `cache` once from its route.
///
/// Failures are logged and never reach the caller that triggered the
/// refresh; memory keeps its previous contents in that case. Concurrent
/// refreshes of the same key join a single request.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be awaited or aborted.
///
/// # Example
/// ```ignore
/// let handle = spawn_refresh_task(cache.clone());
/// // Later, if the refresh result is needed:
/// handle.await?;
/// ```
pub fn spawn_refresh_task(cache: CollectionCache) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(cache = %cache.label(), "Starting background refresh");

        match cache.renew().await {
            Ok(Some(items)) => {
                info!(
                    cache = %cache.label(),
                    items = items.len(),
                    "Background refresh completed"
                );
            }
            Ok(None) => {
                debug!(cache = %cache.label(), "Background refresh skipped: no route");
            }
            Err(err) => {
                warn!(cache = %cache.label(), error = %err, "Background refresh failed");
            }
        }
    })
}
