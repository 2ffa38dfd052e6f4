//! Cache Module
//!
//! Memoizes a remote collection in memory and in session storage, serving
//! reads from the cache while refreshes run in the background.

mod collection;
mod context;
mod inflight;
pub mod lookup;
mod stats;


use std::sync::Arc;

// Re-export public types
pub use collection::{parse_collection, CollectionCache};
pub use context::CacheContext;
pub use inflight::{Flight, InflightRegistry};
pub use stats::CacheStats;

// == Public Types ==
/// One record of a cached collection; fields are read by name.
pub type Item = serde_json::Value;

/// Immutable view of the cached collection at one point in time.
pub type Snapshot = Arc<Vec<Item>>;
