//! Glossa Storage - Backing Store Traits, Term Cache and Action Log
//!
//! Defines the two collaborator interfaces the engine consumes:
//!
//! - [`TermStore`]: the content store holding glossary terms, queried by
//!   exact title and read by id.
//! - [`KvStore`]: an options/transient store with optional TTL, used to
//!   persist cached term projections, the cached-terms index and the log.
//!
//! In-memory implementations of both are provided for tests and for the
//! command-line tool. The [`cache`] module builds the demand-driven term
//! cache on top of them; [`log`] holds the bounded cache action log.

pub mod cache;
pub mod kv;
pub mod log;

pub use cache::{CacheKeys, CacheStats, CachedTermsIndex, TermCache};
pub use kv::{InMemoryKvStore, KvStore, KvStoreExt};
pub use log::CacheActionLog;

use glossa_core::{
    ContentKind, GlossaError, GlossaResult, PublicationStatus, StoreError, Term, TermId,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

// ============================================================================
// TERM QUERY
// ============================================================================

/// Structured lookup of terms by exact title.
///
/// Titles travel as values, never spliced into query text, so a backend
/// can bind them as parameters. Matching is byte-wise (binary collation):
/// `"rj45"` does not match a term titled `"RJ45"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermQuery {
    pub kind: ContentKind,
    pub status: PublicationStatus,
    pub titles: BTreeSet<String>,
}

impl TermQuery {
    /// Published glossary terms whose title equals one of `titles`.
    pub fn published_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: ContentKind::Glossary,
            status: PublicationStatus::Published,
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn matches(&self, term: &Term) -> bool {
        term.kind == self.kind && term.status == self.status && self.titles.contains(&term.title)
    }
}

// ============================================================================
// TERM STORE TRAIT
// ============================================================================

/// Content store holding glossary terms.
///
/// Owned by the authoring side; the engine only reads from it, except for
/// the authoring save hook which persists edits before invalidating.
pub trait TermStore: Send + Sync {
    /// Ids of all terms matching `query`, in store order.
    fn query(&self, query: &TermQuery) -> GlossaResult<Vec<TermId>>;

    /// Get a stored item by id, whatever its kind.
    fn get(&self, id: TermId) -> GlossaResult<Option<Term>>;

    /// All published glossary terms, in store order.
    fn list_published(&self) -> GlossaResult<Vec<Term>>;

    /// Insert or replace a term.
    fn save(&self, term: &Term) -> GlossaResult<()>;

    /// Delete a term. Returns whether it existed.
    fn delete(&self, id: TermId) -> GlossaResult<bool>;
}

// ============================================================================
// IN-MEMORY TERM STORE
// ============================================================================

/// In-memory term store for tests and the command-line tool.
///
/// Terms are kept ordered by id, so listing order follows creation order
/// for UUIDv7 ids.
#[derive(Debug, Default)]
pub struct InMemoryTermStore {
    terms: RwLock<BTreeMap<TermId, Term>>,
    unavailable: AtomicBool,
}

impl InMemoryTermStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `terms`.
    pub fn with_terms(terms: impl IntoIterator<Item = Term>) -> Self {
        let map = terms.into_iter().map(|t| (t.id, t)).collect();
        Self {
            terms: RwLock::new(map),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.terms.read().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every term.
    pub fn clear(&self) {
        if let Ok(mut terms) = self.terms.write() {
            terms.clear();
        }
    }

    fn check_available(&self, operation: &str) -> GlossaResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GlossaError::Store(StoreError::unavailable(
                operation,
                "term store marked unavailable",
            )));
        }
        Ok(())
    }
}

impl TermStore for InMemoryTermStore {
    fn query(&self, query: &TermQuery) -> GlossaResult<Vec<TermId>> {
        self.check_available("query")?;
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let terms = self.terms.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(terms
            .values()
            .filter(|t| query.matches(t))
            .map(|t| t.id)
            .collect())
    }

    fn get(&self, id: TermId) -> GlossaResult<Option<Term>> {
        self.check_available("get")?;
        let terms = self.terms.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(terms.get(&id).cloned())
    }

    fn list_published(&self) -> GlossaResult<Vec<Term>> {
        self.check_available("list_published")?;
        let terms = self.terms.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(terms
            .values()
            .filter(|t| t.is_glossary() && t.is_published())
            .cloned()
            .collect())
    }

    fn save(&self, term: &Term) -> GlossaResult<()> {
        self.check_available("save")?;
        let mut terms = self.terms.write().map_err(|_| StoreError::LockPoisoned)?;
        terms.insert(term.id, term.clone());
        Ok(())
    }

    fn delete(&self, id: TermId) -> GlossaResult<bool> {
        self.check_available("delete")?;
        let mut terms = self.terms.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(terms.remove(&id).is_some())
    }
}

// ============================================================================
// TESTS
// ============================================================================
