//! Error types for the collection cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache reads, fetches and persistence.
///
/// Cloneable so a single failed fetch can be handed to every caller that
/// joined it.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Cache is empty and no source route is configured
    #[error("Collection not found: {0}")]
    NotFound(String),

    /// Wait path found nothing in memory and no fill in flight
    #[error("Store is empty: {0}")]
    EmptyStore(String),

    /// Bounded wait for a fill elapsed with the store still empty
    #[error("Timed out after {0:?} waiting for the store to populate")]
    WaitTimeout(Duration),

    /// No item matched a single-item lookup
    #[error("Item not found ({key}:{value})")]
    ItemNotFound { key: String, value: String },

    /// Transport failure (DNS, connection, TLS)
    #[error("Network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Remote answered with a non-success status
    #[error("HTTP error {status} from {url}")]
    Http { status: u16, url: String },

    /// Remote request timed out
    #[error("Request timeout")]
    Timeout,

    /// Response or persisted body is not a JSON collection
    #[error("Parse error: {0}")]
    Parse(String),

    /// Session storage failed to read or write
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configured route is not a usable URL
    #[error("Invalid route: {0}")]
    InvalidRoute(String),
}

impl CacheError {
    /// Returns true for failures raised by the remote source.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            CacheError::Network(_) | CacheError::Http { .. } | CacheError::Timeout
        )
    }
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CacheError::Timeout
        } else {
            CacheError::Network(Arc::new(err))
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Persistence(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the collection cache.
pub type Result<T> = std::result::Result<T, CacheError>;
