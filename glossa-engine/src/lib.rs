//! Glossa Engine - Glossary Term Annotation
//!
//! Wires the storage and markup crates into the pieces a host application
//! calls:
//!
//! - [`GlossaryFilter`]: annotates rendered content with term markers
//! - [`Authoring`]: save hooks that keep the term cache consistent
//! - [`CacheAdmin`]: generate/clear cache, cache report, action log
//!
//! [`Glossary`] builds all three from one configuration and shared stores.

pub mod admin;
pub mod authoring;
pub mod filter;
pub mod resolver;

pub use admin::{CacheAdmin, CacheReport, GlossaryInfo};
pub use authoring::{sanitize_text, sanitize_tooltip, Authoring};
pub use filter::{GlossaryFilter, RenderView};
pub use resolver::TermResolver;

pub use glossa_core::{
    CachedTermRecord, Clock, GlossaError, GlossaResult, GlossaryConfig, LogEntry, SystemClock,
    Term, TermId,
};
pub use glossa_storage::{
    CacheStats, InMemoryKvStore, InMemoryTermStore, KvStore, TermCache, TermStore,
};

use std::sync::Arc;

/// The annotation engine over one term store and one key-value store.
pub struct Glossary<S: TermStore, K: KvStore> {
    config: GlossaryConfig,
    cache: Arc<TermCache<S, K>>,
    filter: GlossaryFilter<S, K>,
    authoring: Authoring<S, K>,
    admin: CacheAdmin<S, K>,
}

impl<S: TermStore, K: KvStore> Glossary<S, K> {
    /// Build the engine. Fails when `config` does not validate.
    pub fn new(
        config: GlossaryConfig,
        terms: Arc<S>,
        kv: Arc<K>,
        clock: Arc<dyn Clock>,
    ) -> GlossaResult<Self> {
        config.validate()?;

        let cache = Arc::new(TermCache::new(terms, kv, clock, &config));
        Ok(Self {
            filter: GlossaryFilter::new(cache.clone(), &config)?,
            authoring: Authoring::new(cache.clone(), &config),
            admin: CacheAdmin::new(cache.clone(), config.ignore_shortcode.clone()),
            cache,
            config,
        })
    }

    pub fn config(&self) -> &GlossaryConfig {
        &self.config
    }

    pub fn cache(&self) -> &TermCache<S, K> {
        &self.cache
    }

    pub fn filter(&self) -> &GlossaryFilter<S, K> {
        &self.filter
    }

    pub fn authoring(&self) -> &Authoring<S, K> {
        &self.authoring
    }

    pub fn admin(&self) -> &CacheAdmin<S, K> {
        &self.admin
    }

    /// Shorthand for [`GlossaryFilter::render`].
    pub fn render(&self, content: &str, view: RenderView) -> String {
        self.filter.render(content, view)
    }
}

impl Glossary<InMemoryTermStore, InMemoryKvStore> {
    /// Engine over fresh in-memory stores and the system clock.
    pub fn in_memory(
        config: GlossaryConfig,
        terms: impl IntoIterator<Item = Term>,
    ) -> GlossaResult<Self> {
        Self::new(
            config,
            Arc::new(InMemoryTermStore::with_terms(terms)),
            Arc::new(InMemoryKvStore::new()),
            Arc::new(SystemClock),
        )
    }
}
