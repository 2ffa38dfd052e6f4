//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::time::Duration;

/// Default prefix prepended to a cache name to form its storage key.
pub const DEFAULT_STORAGE_PREFIX: &str = "collection_cache_";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix prepended to each cache name in session storage
    pub storage_prefix: String,
    /// Upper bound on waiting for an in-flight fill to populate memory
    pub wait_timeout: Duration,
    /// Timeout applied to each remote request
    pub request_timeout: Duration,
    /// User agent sent with remote requests
    pub user_agent: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `COLLECTION_CACHE_PREFIX` - Storage key prefix (default: `collection_cache_`)
    /// - `COLLECTION_CACHE_WAIT_TIMEOUT_MS` - Fill wait bound in milliseconds (default: 5000)
    /// - `COLLECTION_CACHE_REQUEST_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
    /// - `COLLECTION_CACHE_USER_AGENT` - User agent (default: `collection-cache/0.1`)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            storage_prefix: env::var("COLLECTION_CACHE_PREFIX")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.storage_prefix),
            wait_timeout: env::var("COLLECTION_CACHE_WAIT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.wait_timeout),
            request_timeout: env::var("COLLECTION_CACHE_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            user_agent: env::var("COLLECTION_CACHE_USER_AGENT")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.user_agent),
        }
    }

    /// Returns the storage key for a cache name.
    pub fn storage_key(&self, name: &str) -> String {
        format!("{}{}", self.storage_prefix, name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            wait_timeout: Duration::from_millis(5000),
            request_timeout: Duration::from_secs(30),
            user_agent: "collection-cache/0.1".to_string(),
        }
    }
}
