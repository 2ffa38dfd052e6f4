//! Cache Statistics Module
//!
//! Tracks how collection reads were served: from memory, from session
//! storage, or from the remote source.

use serde::Serialize;

// == Cache Stats ==
/// Tracks collection cache activity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Reads served from the in-memory sequence
    pub memory_hits: u64,
    /// Reads served by restoring from session storage
    pub restores: u64,
    /// Reads that had to wait for the remote source
    pub network_reads: u64,
    /// Requests this cache started that completed successfully
    pub fetches: u64,
    /// Requests this cache started that failed
    pub fetch_failures: u64,
    /// Renewals that joined a fetch already in flight
    pub joined: u64,
    /// Current number of items in memory
    pub total_items: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Fraction of reads answered without waiting on the network.
    ///
    /// Background refreshes are not reads and do not count.
    /// Returns (memory_hits + restores) / (memory_hits + restores + network_reads),
    /// or 0.0 if nothing has been read yet.
    pub fn hit_rate(&self) -> f64 {
        let cached = self.memory_hits + self.restores;
        let total = cached + self.network_reads;
        if total == 0 {
            0.0
        } else {
            cached as f64 / total as f64
        }
    }

    pub fn record_memory_hit(&mut self) {
        self.memory_hits += 1;
    }

    pub fn record_restore(&mut self) {
        self.restores += 1;
    }

    pub fn record_network_read(&mut self) {
        self.network_reads += 1;
    }

    pub fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    pub fn record_fetch_failure(&mut self) {
        self.fetch_failures += 1;
    }

    pub fn record_join(&mut self) {
        self.joined += 1;
    }

    // == Update Item Count ==
    /// Updates the in-memory item count.
    pub fn set_total_items(&mut self, count: usize) {
        self.total_items = count;
    }
}
