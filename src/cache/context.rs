//! Cache Context
//!
//! Collaborators shared by every cache built from the same context.

use std::fmt;
use std::sync::Arc;

use crate::cache::InflightRegistry;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::{HttpFetcher, RemoteFetcher};
use crate::session::{MemorySession, SessionStorage};

/// Remote fetcher, session storage, in-flight registry and configuration.
///
/// Caches built from one context with the same name share their persisted
/// slot and collapse concurrent fetches into one request.
#[derive(Clone)]
pub struct CacheContext {
    /// Issues GET requests against collection routes
    pub fetcher: Arc<dyn RemoteFetcher>,
    /// Session-scoped key/value persistence
    pub session: Arc<dyn SessionStorage>,
    /// Pending fetches keyed by cache key
    pub inflight: Arc<InflightRegistry>,
    /// Cache configuration
    pub config: Config,
}

impl CacheContext {
    /// Creates a context from explicit collaborators and the default config.
    pub fn new(fetcher: Arc<dyn RemoteFetcher>, session: Arc<dyn SessionStorage>) -> Self {
        Self {
            fetcher,
            session,
            inflight: Arc::new(InflightRegistry::new()),
            config: Config::default(),
        }
    }

    /// Creates a context with an HTTP fetcher and a fresh in-memory session.
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self {
            fetcher: Arc::new(fetcher),
            session: Arc::new(MemorySession::new()),
            inflight: Arc::new(InflightRegistry::new()),
            config,
        })
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Gives this context its own in-flight registry.
    pub fn with_registry(mut self, inflight: Arc<InflightRegistry>) -> Self {
        self.inflight = inflight;
        self
    }
}

impl fmt::Debug for CacheContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheContext")
            .field("session", &self.session.scope())
            .field("inflight", &self.inflight)
            .field("config", &self.config)
            .finish()
    }
}
