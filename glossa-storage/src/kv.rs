//! Key-value store with optional expiry.
//!
//! Stands in for the options/transient table of the content system. Values
//! are JSON documents; typed access goes through [`KvStoreExt`].

use glossa_core::{Clock, GlossaError, GlossaResult, StoreError, SystemClock, Timestamp};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Key-value store for cache entries and persisted options.
///
/// Implementations must treat an expired entry exactly like a missing one.
pub trait KvStore: Send + Sync {
    /// Get a live value.
    fn get(&self, key: &str) -> GlossaResult<Option<Value>>;

    /// Store a value, expiring after `ttl` when given.
    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> GlossaResult<()>;

    /// Delete a value. Returns whether a live value was removed.
    fn delete(&self, key: &str) -> GlossaResult<bool>;

    /// Delete every key starting with `prefix`. Returns the number removed.
    fn delete_prefix(&self, prefix: &str) -> GlossaResult<u64>;
}

/// Typed JSON access on top of any [`KvStore`].
pub trait KvStoreExt: KvStore {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> GlossaResult<Option<T>> {
        match self.get(key)? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                GlossaError::Store(StoreError::Serialization {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            }),
        }
    }

    fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> GlossaResult<()> {
        let value = serde_json::to_value(value).map_err(|e| {
            GlossaError::Store(StoreError::Serialization {
                key: key.to_string(),
                reason: e.to_string(),
            })
        })?;
        self.set(key, value, ttl)
    }
}

impl<K: KvStore + ?Sized> KvStoreExt for K {}

// ============================================================================
// IN-MEMORY IMPLEMENTATION
// ============================================================================

#[derive(Debug, Clone)]
struct StoredValue {
    value: Value,
    expires_at: Option<Timestamp>,
}

impl StoredValue {
    fn is_live(&self, now: Timestamp) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// In-memory key-value store.
///
/// Expiry is evaluated lazily against the injected [`Clock`]; expired
/// entries are dropped the next time they are touched.
pub struct InMemoryKvStore {
    entries: RwLock<HashMap<String, StoredValue>>,
    clock: Arc<dyn Clock>,
    unavailable: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            unavailable: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make reads and writes fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make `set` fail with `StoreError::WriteFailed` while reads keep working.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Whether `key` currently holds a live value.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .read()
            .map(|e| e.get(key).is_some_and(|v| v.is_live(now)))
            .unwrap_or(false)
    }

    /// Live keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let now = self.clock.now();
        let mut keys: Vec<String> = self
            .entries
            .read()
            .map(|e| {
                e.iter()
                    .filter(|(k, v)| k.starts_with(prefix) && v.is_live(now))
                    .map(|(k, _)| k.clone())
                    .collect()
            })
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .map(|e| e.values().filter(|v| v.is_live(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self, operation: &str) -> GlossaResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GlossaError::Store(StoreError::unavailable(
                operation,
                "key-value store marked unavailable",
            )));
        }
        Ok(())
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryKvStore")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl KvStore for InMemoryKvStore {
    fn get(&self, key: &str) -> GlossaResult<Option<Value>> {
        self.check_available("get")?;
        let now = self.clock.now();
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        match entries.get(key) {
            Some(stored) if stored.is_live(now) => Ok(Some(stored.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> GlossaResult<()> {
        self.check_available("set")?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GlossaError::Store(StoreError::WriteFailed {
                key: key.to_string(),
                reason: "writes disabled".to_string(),
            }));
        }
        let expires_at = match ttl {
            Some(ttl) => {
                let delta = chrono::Duration::from_std(ttl).map_err(|e| {
                    GlossaError::Store(StoreError::WriteFailed {
                        key: key.to_string(),
                        reason: e.to_string(),
                    })
                })?;
                self.clock.now().checked_add_signed(delta)
            }
            None => None,
        };
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.insert(key.to_string(), StoredValue { value, expires_at });
        Ok(())
    }

    fn delete(&self, key: &str) -> GlossaResult<bool> {
        self.check_available("delete")?;
        let now = self.clock.now();
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.remove(key).is_some_and(|v| v.is_live(now)))
    }

    fn delete_prefix(&self, prefix: &str) -> GlossaResult<u64> {
        self.check_available("delete_prefix")?;
        let now = self.clock.now();
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut removed = 0u64;
        entries.retain(|key, stored| {
            if key.starts_with(prefix) {
                if stored.is_live(now) {
                    removed += 1;
                }
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glossa_core::ManualClock;
    use serde_json::json;

    fn store_with_clock() -> (InMemoryKvStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (InMemoryKvStore::with_clock(clock.clone()), clock)
    }

    #[test]
    fn test_set_get_delete() {
        let store = InMemoryKvStore::new();
        store.set("a", json!({"x": 1}), None).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(json!({"x": 1})));
        assert!(store.delete("a").unwrap());
        assert_eq!(store.get("a").unwrap(), None);
        assert!(!store.delete("a").unwrap());
    }

    #[test]
    fn test_ttl_expiry() {
        let (store, clock) = store_with_clock();
        store
            .set("t", json!("v"), Some(Duration::from_secs(60)))
            .unwrap();
        clock.advance(Duration::from_secs(59));
        assert!(store.get("t").unwrap().is_some());
        clock.advance(Duration::from_secs(1));
        assert!(store.get("t").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_prefix_counts_live_entries() {
        let (store, clock) = store_with_clock();
        store.set("glossary_term_1", json!(1), None).unwrap();
        store.set("glossary_term_2", json!(2), None).unwrap();
        store
            .set("glossary_term_3", json!(3), Some(Duration::from_secs(1)))
            .unwrap();
        store.set("glossary_cached_terms", json!([]), None).unwrap();
        clock.advance(Duration::from_secs(5));

        assert_eq!(store.delete_prefix("glossary_term_").unwrap(), 2);
        assert!(store.keys_with_prefix("glossary_term_").is_empty());
        assert!(store.contains_key("glossary_cached_terms"));
    }

    #[test]
    fn test_typed_access() {
        let store = InMemoryKvStore::new();
        store
            .set_json("list", &vec!["RJ45".to_string()], None)
            .unwrap();
        let list: Option<Vec<String>> = store.get_json("list").unwrap();
        assert_eq!(list, Some(vec!["RJ45".to_string()]));
    }

    #[test]
    fn test_typed_access_reports_bad_shape() {
        let store = InMemoryKvStore::new();
        store.set("n", json!(42), None).unwrap();
        let err = store.get_json::<Vec<String>>("n").unwrap_err();
        assert!(matches!(
            err,
            GlossaError::Store(StoreError::Serialization { .. })
        ));
    }

    #[test]
    fn test_failure_injection() {
        let store = InMemoryKvStore::new();
        store.set_fail_writes(true);
        assert!(matches!(
            store.set("k", json!(1), None),
            Err(GlossaError::Store(StoreError::WriteFailed { .. }))
        ));
        store.set_fail_writes(false);
        store.set_unavailable(true);
        assert!(matches!(
            store.get("k"),
            Err(GlossaError::Store(StoreError::Unavailable { .. }))
        ));
    }
}
