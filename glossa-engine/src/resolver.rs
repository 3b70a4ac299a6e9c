//! Term Resolver: candidate tokens to published term ids.

use glossa_core::TermId;
use glossa_storage::{TermQuery, TermStore};
use std::sync::Arc;

pub struct TermResolver<S: TermStore> {
    terms: Arc<S>,
}

impl<S: TermStore> TermResolver<S> {
    pub fn new(terms: Arc<S>) -> Self {
        Self { terms }
    }

    /// Ids of published glossary terms whose title equals one of `tokens`.
    ///
    /// Tokens go to the store as query values. An empty token list never
    /// reaches the store; a failed query resolves to nothing.
    pub fn resolve(&self, tokens: &[String]) -> Vec<TermId> {
        if tokens.is_empty() {
            return Vec::new();
        }

        let query = TermQuery::published_titles(tokens.iter().cloned());
        match self.terms.query(&query) {
            Ok(ids) => {
                tracing::debug!(
                    candidates = tokens.len(),
                    matched = ids.len(),
                    "Resolved glossary terms"
                );
                ids
            }
            Err(e) => {
                tracing::warn!(error = %e, candidates = tokens.len(), "Glossary term query failed");
                Vec::new()
            }
        }
    }
}
