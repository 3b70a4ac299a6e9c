//! Demand-driven cache of term projections.
//!
//! Projections are filled lazily the first time a render references a term,
//! expire after the configured TTL, and are dropped explicitly when the
//! authoring side saves a tooltip. Nothing writes through: an edit only
//! invalidates, and the next reference refills.
//!
//! # Example
//!
//! ```ignore
//! let cache = TermCache::new(terms, kv, clock, &config);
//! let mut ctx = RenderContext::new();
//!
//! // First reference: miss, fill, log "miss" + "set"
//! let record = cache.resolve(&mut ctx, term_id);
//!
//! // Authoring save: drop the projection, log "invalidated"
//! cache.invalidate(&mut RenderContext::new(), term_id)?;
//! ```

pub mod index;
pub mod keys;
pub mod stats;
pub mod term_cache;

pub use index::CachedTermsIndex;
pub use keys::CacheKeys;
pub use stats::CacheStats;
pub use term_cache::TermCache;
