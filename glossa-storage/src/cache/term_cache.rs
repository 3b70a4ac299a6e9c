//! Term Cache: lazily filled, TTL-bound projections keyed by term id.

use super::index::CachedTermsIndex;
use super::keys::CacheKeys;
use super::stats::CacheStats;
use crate::kv::{KvStore, KvStoreExt};
use crate::log::CacheActionLog;
use crate::TermStore;
use glossa_core::{
    CachedTermRecord, Clock, GlossaResult, GlossaryConfig, RenderContext, Term, TermId,
};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Demand-driven cache of [`CachedTermRecord`]s.
///
/// The cache never writes through. Callers edit terms in the [`TermStore`]
/// and then call [`invalidate`](Self::invalidate); the next render refills.
pub struct TermCache<S: TermStore, K: KvStore> {
    terms: Arc<S>,
    kv: Arc<K>,
    log: CacheActionLog<K>,
    index: CachedTermsIndex<K>,
    ttl: Duration,
    default_tooltip: String,
    stats: RwLock<CacheStats>,
}

impl<S: TermStore, K: KvStore> TermCache<S, K> {
    pub fn new(terms: Arc<S>, kv: Arc<K>, clock: Arc<dyn Clock>, config: &GlossaryConfig) -> Self {
        Self {
            log: CacheActionLog::new(kv.clone(), clock, config.log_capacity),
            index: CachedTermsIndex::new(kv.clone()),
            terms,
            kv,
            ttl: config.cache_ttl,
            default_tooltip: config.default_tooltip.clone(),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    pub fn log(&self) -> &CacheActionLog<K> {
        &self.log
    }

    pub fn index(&self) -> &CachedTermsIndex<K> {
        &self.index
    }

    pub fn term_store(&self) -> &Arc<S> {
        &self.terms
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.read().map(|s| *s).unwrap_or_default()
    }

    /// Resolve `id` to its projection, filling the cache on a miss.
    ///
    /// A term already processed in `ctx` is answered from the cache alone:
    /// no store lookup, no fill, no log entry. Returns `None` when the term
    /// is missing, is not a glossary term, or the store cannot be read.
    pub fn resolve(&self, ctx: &mut RenderContext, id: TermId) -> Option<CachedTermRecord> {
        if !ctx.mark_processed(id) {
            return self.read_entry(id).ok().flatten();
        }

        match self.read_entry(id) {
            Ok(Some(record)) => {
                self.bump(|s| s.hits += 1);
                tracing::debug!(term_id = %id, "Glossary cache hit");
                return Some(record);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, term_id = %id, "Cached term unreadable, refilling");
            }
        }

        self.bump(|s| s.misses += 1);
        self.log.record(ctx, &miss_message(id));

        let term = self.fetch_term(id)?;
        let record = CachedTermRecord::project(&term, &self.default_tooltip);

        match self.kv.set_json(&CacheKeys::term(id), &record, Some(self.ttl)) {
            Ok(()) => {
                self.bump(|s| s.sets += 1);
                self.log.record(ctx, &set_message(id));
                if let Err(e) = self.index.add(&record.title) {
                    tracing::warn!(
                        error = %e,
                        title = %record.title,
                        "Failed to update cached terms index"
                    );
                }
            }
            Err(e) => {
                self.bump(|s| s.write_failures += 1);
                tracing::warn!(error = %e, term_id = %id, "Failed to cache glossary term");
            }
        }

        Some(record)
    }

    /// Drop the cached projection of `id` after its tooltip was saved.
    ///
    /// Also clears the render-scoped marks for `id` in `ctx`, so a resolve in
    /// the same context refills and logs a fresh miss/set pair. Returns
    /// whether a live entry was removed.
    pub fn invalidate(&self, ctx: &mut RenderContext, id: TermId) -> GlossaResult<bool> {
        let removed = self.kv.delete(&CacheKeys::term(id))?;
        self.bump(|s| s.invalidations += 1);
        self.log.record(ctx, &invalidated_message(id));

        ctx.forget_term(id);
        ctx.forget_message(&miss_message(id));
        ctx.forget_message(&set_message(id));

        tracing::debug!(term_id = %id, removed, "Glossary cache invalidated");
        Ok(removed)
    }

    /// Resolve every published term, then rewrite the cached terms index
    /// with the titles of all published terms in listing order. A term that
    /// fails to cache is still indexed.
    ///
    /// Returns the number of published terms.
    pub fn generate(&self, ctx: &mut RenderContext) -> GlossaResult<usize> {
        let published = self.terms.list_published()?;
        let cached = published
            .iter()
            .filter(|term| self.resolve(ctx, term.id).is_some())
            .count();

        let count = published.len();
        self.log.record(ctx, &generated_message(count));
        self.index.replace(published.into_iter().map(|term| term.title).collect())?;

        tracing::info!(terms = count, cached, "Glossary cache generated");
        Ok(count)
    }

    /// Delete every cached projection and the cached terms index.
    ///
    /// Returns the number of projections removed.
    pub fn clear(&self, ctx: &mut RenderContext) -> GlossaResult<u64> {
        let removed = self.kv.delete_prefix(CacheKeys::TERM_PREFIX)?;
        self.index.clear()?;
        self.log.record(ctx, CLEARED_MESSAGE);

        tracing::info!(removed, "Glossary cache cleared");
        Ok(removed)
    }

    fn read_entry(&self, id: TermId) -> GlossaResult<Option<CachedTermRecord>> {
        self.kv.get_json(&CacheKeys::term(id))
    }

    fn fetch_term(&self, id: TermId) -> Option<Term> {
        match self.terms.get(id) {
            Ok(Some(term)) if term.is_glossary() => Some(term),
            Ok(Some(term)) => {
                tracing::debug!(
                    term_id = %id,
                    kind = ?term.kind,
                    "Referenced item is not a glossary term"
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, term_id = %id, "Term store read failed");
                None
            }
        }
    }

    fn bump(&self, update: impl FnOnce(&mut CacheStats)) {
        if let Ok(mut stats) = self.stats.write() {
            update(&mut stats);
        }
    }
}

// ============================================================================
// LOG MESSAGES
// ============================================================================

const CLEARED_MESSAGE: &str = "Glossary cache cleared manually.";

fn miss_message(id: TermId) -> String {
    format!("Cache miss for glossary term ID: {id}")
}

fn set_message(id: TermId) -> String {
    format!("Cache set for glossary term ID: {id}")
}

fn invalidated_message(id: TermId) -> String {
    format!("Cache invalidated for glossary term ID: {id}")
}

fn generated_message(count: usize) -> String {
    format!("Glossary cache generated with {count} terms.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryKvStore;
    use crate::InMemoryTermStore;
    use glossa_core::{ContentKind, ManualClock, PublicationStatus, StoreError, DEFAULT_TOOLTIP};

    struct Harness {
        terms: Arc<InMemoryTermStore>,
        kv: Arc<InMemoryKvStore>,
        clock: Arc<ManualClock>,
        cache: TermCache<InMemoryTermStore, InMemoryKvStore>,
    }

    fn harness(terms: Vec<Term>) -> Harness {
        let clock = Arc::new(ManualClock::default());
        let terms = Arc::new(InMemoryTermStore::with_terms(terms));
        let kv = Arc::new(InMemoryKvStore::with_clock(clock.clone()));
        let cache = TermCache::new(
            terms.clone(),
            kv.clone(),
            clock.clone(),
            &GlossaryConfig::default(),
        );
        Harness {
            terms,
            kv,
            clock,
            cache,
        }
    }

    fn messages(h: &Harness) -> Vec<String> {
        h.cache
            .log()
            .entries()
            .unwrap()
            .into_iter()
            .map(|e| e.message)
            .collect()
    }

    #[test]
    fn test_first_resolve_fills_and_logs_once() {
        let rj45 = Term::new("RJ45", "/glossary/rj45");
        let h = harness(vec![rj45.clone()]);
        let mut ctx = RenderContext::new();

        let first = h.cache.resolve(&mut ctx, rj45.id).unwrap();
        let second = h.cache.resolve(&mut ctx, rj45.id).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.tooltip_text, DEFAULT_TOOLTIP);

        assert_eq!(
            messages(&h),
            vec![set_message(rj45.id), miss_message(rj45.id)]
        );
        assert!(h.kv.contains_key(&CacheKeys::term(rj45.id)));
        assert_eq!(h.cache.index().titles().unwrap(), vec!["RJ45"]);
    }

    #[test]
    fn test_hit_in_later_render_is_silent() {
        let rj45 = Term::new("RJ45", "/glossary/rj45");
        let h = harness(vec![rj45.clone()]);
        h.cache.resolve(&mut RenderContext::new(), rj45.id);
        h.cache.resolve(&mut RenderContext::new(), rj45.id);

        assert_eq!(messages(&h).len(), 2);
        let stats = h.cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
    }

    #[test]
    fn test_hit_does_not_consult_term_store() {
        let rj45 = Term::new("RJ45", "/glossary/rj45");
        let h = harness(vec![rj45.clone()]);
        h.cache.resolve(&mut RenderContext::new(), rj45.id);
        h.terms.set_unavailable(true);
        assert!(h.cache.resolve(&mut RenderContext::new(), rj45.id).is_some());
    }

    #[test]
    fn test_missing_term_is_absent_and_not_cached() {
        let h = harness(vec![]);
        let id = TermId::now_v7();
        assert!(h.cache.resolve(&mut RenderContext::new(), id).is_none());
        assert_eq!(messages(&h), vec![miss_message(id)]);
        assert!(!h.kv.contains_key(&CacheKeys::term(id)));
    }

    #[test]
    fn test_wrong_kind_is_absent() {
        let page = Term::new("About", "/about").with_kind(ContentKind::Page);
        let h = harness(vec![page.clone()]);
        assert!(h.cache.resolve(&mut RenderContext::new(), page.id).is_none());
        assert!(h.cache.index().is_empty().unwrap());
    }

    #[test]
    fn test_store_unavailable_is_absent() {
        let rj45 = Term::new("RJ45", "/glossary/rj45");
        let h = harness(vec![rj45.clone()]);
        h.terms.set_unavailable(true);
        assert!(h.cache.resolve(&mut RenderContext::new(), rj45.id).is_none());
    }

    #[test]
    fn test_write_failure_returns_fresh_record_without_set_entry() {
        let rj45 = Term::new("RJ45", "/glossary/rj45").with_tooltip("Connector");
        let h = harness(vec![rj45.clone()]);
        h.kv.set_fail_writes(true);

        let record = h.cache.resolve(&mut RenderContext::new(), rj45.id).unwrap();
        assert_eq!(record.tooltip_text, "Connector");
        assert_eq!(h.cache.stats().write_failures, 1);

        h.kv.set_fail_writes(false);
        assert!(!messages(&h).contains(&set_message(rj45.id)));
        assert!(!h.kv.contains_key(&CacheKeys::term(rj45.id)));
    }

    #[test]
    fn test_invalidate_then_resolve_refills_in_same_render() {
        let rj45 = Term::new("RJ45", "/glossary/rj45").with_tooltip("old");
        let h = harness(vec![rj45.clone()]);
        let mut ctx = RenderContext::new();
        h.cache.resolve(&mut ctx, rj45.id);

        h.terms.save(&rj45.clone().with_tooltip("new")).unwrap();
        assert!(h.cache.invalidate(&mut ctx, rj45.id).unwrap());

        let record = h.cache.resolve(&mut ctx, rj45.id).unwrap();
        assert_eq!(record.tooltip_text, "new");
        assert_eq!(
            messages(&h),
            vec![
                set_message(rj45.id),
                miss_message(rj45.id),
                invalidated_message(rj45.id),
                set_message(rj45.id),
                miss_message(rj45.id),
            ]
        );
        assert_eq!(h.cache.stats().invalidations, 1);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let rj45 = Term::new("RJ45", "/glossary/rj45");
        let h = harness(vec![rj45.clone()]);
        h.cache.resolve(&mut RenderContext::new(), rj45.id);
        h.clock
            .advance(glossa_core::DEFAULT_CACHE_TTL + Duration::from_secs(1));
        h.cache.resolve(&mut RenderContext::new(), rj45.id);
        assert_eq!(h.cache.stats().misses, 2);
    }

    #[test]
    fn test_unpublished_term_keeps_stale_entry_until_expiry() {
        let rj45 = Term::new("RJ45", "/glossary/rj45");
        let h = harness(vec![rj45.clone()]);
        h.cache.resolve(&mut RenderContext::new(), rj45.id);
        h.terms
            .save(&rj45.clone().with_status(PublicationStatus::Draft))
            .unwrap();
        assert!(h.kv.contains_key(&CacheKeys::term(rj45.id)));
    }

    #[test]
    fn test_generate_resolves_all_published_and_rebuilds_index() {
        let a = Term::new("RJ45", "/glossary/rj45");
        let b = Term::new("LAN", "/glossary/lan");
        let draft = Term::new("WAN", "/glossary/wan").with_status(PublicationStatus::Draft);
        let h = harness(vec![a.clone(), b.clone(), draft]);
        h.cache.index().add("Stale").unwrap();

        let count = h.cache.generate(&mut RenderContext::new()).unwrap();
        assert_eq!(count, 2);

        let mut titles = h.cache.index().titles().unwrap();
        titles.sort();
        assert_eq!(titles, vec!["LAN", "RJ45"]);
        assert_eq!(messages(&h)[0], "Glossary cache generated with 2 terms.");
        assert_eq!(h.kv.keys_with_prefix(CacheKeys::TERM_PREFIX).len(), 2);
    }

    #[test]
    fn test_clear_removes_entries_and_index() {
        let a = Term::new("RJ45", "/glossary/rj45");
        let b = Term::new("LAN", "/glossary/lan");
        let h = harness(vec![a.clone(), b.clone()]);
        let mut ctx = RenderContext::new();
        h.cache.resolve(&mut ctx, a.id);
        h.cache.resolve(&mut ctx, b.id);

        let removed = h.cache.clear(&mut RenderContext::new()).unwrap();
        assert_eq!(removed, 2);
        assert!(h.cache.index().is_empty().unwrap());
        assert!(h.kv.keys_with_prefix(CacheKeys::TERM_PREFIX).is_empty());
        assert_eq!(messages(&h)[0], CLEARED_MESSAGE);
    }

    /// Term store whose `get` fails for one id.
    struct FailingGet {
        inner: InMemoryTermStore,
        failing: TermId,
    }

    impl TermStore for FailingGet {
        fn query(&self, query: &crate::TermQuery) -> GlossaResult<Vec<TermId>> {
            self.inner.query(query)
        }

        fn get(&self, id: TermId) -> GlossaResult<Option<Term>> {
            if id == self.failing {
                return Err(StoreError::unavailable("get", "read failed").into());
            }
            self.inner.get(id)
        }

        fn list_published(&self) -> GlossaResult<Vec<Term>> {
            self.inner.list_published()
        }

        fn save(&self, term: &Term) -> GlossaResult<()> {
            self.inner.save(term)
        }

        fn delete(&self, id: TermId) -> GlossaResult<bool> {
            self.inner.delete(id)
        }
    }

    #[test]
    fn test_generate_indexes_terms_that_fail_to_cache() {
        let a = Term::new("RJ45", "/glossary/rj45");
        let b = Term::new("LAN", "/glossary/lan");
        let c = Term::new("Wi-Fi", "/glossary/wifi");
        let store = Arc::new(FailingGet {
            inner: InMemoryTermStore::with_terms([a.clone(), b.clone(), c.clone()]),
            failing: b.id,
        });
        let clock = Arc::new(ManualClock::default());
        let kv = Arc::new(InMemoryKvStore::with_clock(clock.clone()));
        let cache = TermCache::new(store.clone(), kv.clone(), clock, &GlossaryConfig::default());

        assert_eq!(cache.generate(&mut RenderContext::new()).unwrap(), 3);

        let listed: Vec<String> = store
            .list_published()
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(cache.index().titles().unwrap(), listed);
        assert!(!kv.contains_key(&CacheKeys::term(b.id)));
        assert_eq!(kv.keys_with_prefix(CacheKeys::TERM_PREFIX).len(), 2);
    }
}
