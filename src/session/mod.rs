//! Session Storage Module
//!
//! String key/value persistence whose lifetime is one explicit session.
//!
//! # Backends
//! - `MemorySession`: lives as long as the process
//! - `FileSession`: one directory per session id, survives restarts

mod file;
mod memory;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

pub use file::FileSession;
pub use memory::MemorySession;

/// Key/value store scoped to one session.
pub trait SessionStorage: Send + Sync {
    /// The session this storage belongs to.
    fn scope(&self) -> &SessionScope;

    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

// == Session Scope ==
/// Identifies one session and when it started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionScope {
    /// Session identifier
    pub id: String,
    /// When the session started
    pub started_at: DateTime<Utc>,
}

impl SessionScope {
    /// Creates a scope with the given id, starting now.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            started_at: Utc::now(),
        }
    }

    /// Creates a scope with a random (v4 UUID) id, starting now.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}
