//! Collection Cache - A session-scoped cache for remote JSON collections
//!
//! Fetches a collection from a route, keeps it in memory and in session
//! storage, and serves later reads from the cache until it is renewed.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod session;
pub mod tasks;

pub use cache::{CacheContext, CollectionCache, Item, Snapshot};
pub use config::Config;
pub use error::{CacheError, Result};
pub use models::{Lookup, StoreOptions};
pub use tasks::spawn_refresh_task;
