//! Counters describing term cache activity.

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to read the term store.
    pub misses: u64,
    /// Projections written to the cache.
    pub sets: u64,
    /// Projections dropped by an authoring save.
    pub invalidations: u64,
    /// Projections computed but not persisted.
    pub write_failures: u64,
}

impl CacheStats {
    /// Term lookups that reached the cache, answered or not.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Share of lookups answered from the cache; `None` before the first.
    pub fn hit_rate(&self) -> Option<f64> {
        match self.lookups() {
            0 => None,
            lookups => Some(self.hits as f64 / lookups as f64),
        }
    }
}
