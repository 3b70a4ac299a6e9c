//! Cached Terms Index: titles that have been cached at least once.
//!
//! Reporting only. Matching never consults it, and nothing removes a title
//! except a bulk clear or a regenerate.

use super::keys::CacheKeys;
use crate::kv::{KvStore, KvStoreExt};
use glossa_core::GlossaResult;
use std::sync::Arc;

pub struct CachedTermsIndex<K: KvStore> {
    kv: Arc<K>,
}

impl<K: KvStore> CachedTermsIndex<K> {
    pub fn new(kv: Arc<K>) -> Self {
        Self { kv }
    }

    /// Titles in insertion order.
    pub fn titles(&self) -> GlossaResult<Vec<String>> {
        Ok(self
            .kv
            .get_json::<Vec<String>>(CacheKeys::CACHED_TERMS)?
            .unwrap_or_default())
    }

    pub fn len(&self) -> GlossaResult<usize> {
        Ok(self.titles()?.len())
    }

    pub fn is_empty(&self) -> GlossaResult<bool> {
        Ok(self.titles()?.is_empty())
    }

    /// Append `title` unless already present. Returns whether it was added.
    pub fn add(&self, title: &str) -> GlossaResult<bool> {
        let mut titles = self.titles()?;
        if titles.iter().any(|t| t == title) {
            return Ok(false);
        }
        titles.push(title.to_string());
        self.kv.set_json(CacheKeys::CACHED_TERMS, &titles, None)?;
        Ok(true)
    }

    /// Overwrite the index wholesale.
    pub fn replace(&self, titles: Vec<String>) -> GlossaResult<()> {
        self.kv.set_json(CacheKeys::CACHED_TERMS, &titles, None)
    }

    pub fn clear(&self) -> GlossaResult<()> {
        self.kv.delete(CacheKeys::CACHED_TERMS).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryKvStore;

    #[test]
    fn test_add_is_idempotent() {
        let index = CachedTermsIndex::new(Arc::new(InMemoryKvStore::new()));
        assert!(index.add("RJ45").unwrap());
        assert!(!index.add("RJ45").unwrap());
        assert!(index.add("LAN").unwrap());
        assert_eq!(index.titles().unwrap(), vec!["RJ45", "LAN"]);
    }

    #[test]
    fn test_add_is_case_sensitive() {
        let index = CachedTermsIndex::new(Arc::new(InMemoryKvStore::new()));
        index.add("Lan").unwrap();
        index.add("LAN").unwrap();
        assert_eq!(index.len().unwrap(), 2);
    }

    #[test]
    fn test_replace_and_clear() {
        let index = CachedTermsIndex::new(Arc::new(InMemoryKvStore::new()));
        index.add("old").unwrap();
        index
            .replace(vec!["a".to_string(), "b".to_string()])
            .unwrap();
        assert_eq!(index.titles().unwrap(), vec!["a", "b"]);
        index.clear().unwrap();
        assert!(index.is_empty().unwrap());
    }
}
