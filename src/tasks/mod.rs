//! Background Tasks Module
//!
//! Contains tasks spawned on the runtime while callers are served from cache.
//!
//! # Tasks
//! - Refresh: Re-fetches a collection behind a stale read

mod refresh;

pub use refresh::spawn_refresh_task;
