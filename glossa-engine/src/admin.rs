//! Cache administration: the operations behind the admin screens.

use glossa_core::{GlossaResult, LogEntry, RenderContext};
use glossa_storage::{CacheStats, KvStore, TermCache, TermStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Titles currently listed in the cached terms index, with lookup
/// counters since startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheReport {
    pub count: usize,
    pub titles: Vec<String>,
    pub lookups: u64,
    pub hit_rate: Option<f64>,
}

/// Summary shown on the glossary info screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryInfo {
    pub published_terms: usize,
    pub ignore_shortcode: String,
}

pub struct CacheAdmin<S: TermStore, K: KvStore> {
    cache: Arc<TermCache<S, K>>,
    ignore_shortcode: String,
}

impl<S: TermStore, K: KvStore> CacheAdmin<S, K> {
    pub fn new(cache: Arc<TermCache<S, K>>, ignore_shortcode: impl Into<String>) -> Self {
        Self {
            cache,
            ignore_shortcode: ignore_shortcode.into(),
        }
    }

    /// Fill the cache for every published term. Returns the term count.
    pub fn generate_cache(&self) -> GlossaResult<usize> {
        self.cache.generate(&mut RenderContext::new())
    }

    /// Drop every cached projection. Returns how many were removed.
    pub fn clear_cache(&self) -> GlossaResult<u64> {
        self.cache.clear(&mut RenderContext::new())
    }

    pub fn cache_report(&self) -> GlossaResult<CacheReport> {
        let titles = self.cache.index().titles()?;
        let stats = self.cache.stats();
        Ok(CacheReport {
            count: titles.len(),
            titles,
            lookups: stats.lookups(),
            hit_rate: stats.hit_rate(),
        })
    }

    /// Cache action log, newest first.
    pub fn log_entries(&self) -> GlossaResult<Vec<LogEntry>> {
        self.cache.log().entries()
    }

    pub fn clear_log(&self) -> GlossaResult<()> {
        self.cache.log().clear()?;
        tracing::info!("Glossary cache log cleared");
        Ok(())
    }

    pub fn info(&self) -> GlossaResult<GlossaryInfo> {
        Ok(GlossaryInfo {
            published_terms: self.cache.term_store().list_published()?.len(),
            ignore_shortcode: self.ignore_shortcode.clone(),
        })
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
