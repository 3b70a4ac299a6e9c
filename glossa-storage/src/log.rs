//! Bounded, newest-first audit trail of cache lifecycle events.
//!
//! The log is persisted as one JSON array in the key-value store. Writing to
//! it never fails a caller: store errors are reported through `tracing` and
//! the entry is dropped.

use crate::cache::CacheKeys;
use crate::kv::{KvStore, KvStoreExt};
use glossa_core::{Clock, GlossaResult, LogEntry, RenderContext};
use std::sync::Arc;

/// Cache action log backed by a [`KvStore`].
pub struct CacheActionLog<K: KvStore> {
    kv: Arc<K>,
    clock: Arc<dyn Clock>,
    capacity: usize,
}

impl<K: KvStore> CacheActionLog<K> {
    pub fn new(kv: Arc<K>, clock: Arc<dyn Clock>, capacity: usize) -> Self {
        Self {
            kv,
            clock,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Prepend `message` unless the same message was already logged in `ctx`.
    ///
    /// The stored log is truncated to the configured capacity, dropping the
    /// oldest entries.
    pub fn record(&self, ctx: &mut RenderContext, message: &str) {
        if !ctx.claim_message(message) {
            tracing::trace!(message, "Duplicate cache log message suppressed");
            return;
        }

        let mut entries = match self.kv.get_json::<Vec<LogEntry>>(CacheKeys::LOG) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, message, "Failed to read cache action log");
                return;
            }
        };

        entries.insert(0, LogEntry::new(self.clock.now(), message));
        entries.truncate(self.capacity);

        if let Err(e) = self.kv.set_json(CacheKeys::LOG, &entries, None) {
            tracing::warn!(error = %e, message, "Failed to persist cache action log");
        }
    }

    /// All entries, newest first.
    pub fn entries(&self) -> GlossaResult<Vec<LogEntry>> {
        Ok(self
            .kv
            .get_json::<Vec<LogEntry>>(CacheKeys::LOG)?
            .unwrap_or_default())
    }

    /// Empty the log.
    pub fn clear(&self) -> GlossaResult<()> {
        self.kv
            .set_json(CacheKeys::LOG, &Vec::<LogEntry>::new(), None)
    }
}
