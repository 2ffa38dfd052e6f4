//! Configuration and lookup models
//!
//! This module defines the plain data types callers use to describe a cache
//! and to look up a single item in it.

pub mod lookup;
pub mod options;

// Re-export commonly used types
pub use lookup::Lookup;
pub use options::{StoreOptions, DEFAULT_NAME};
