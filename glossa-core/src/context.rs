//! Render-scoped de-duplication state.
//!
//! One [`RenderContext`] is created per independent render (or admin action)
//! and dropped afterwards. It is passed explicitly through the pipeline so
//! concurrent renders never share suppression state.

use crate::TermId;
use std::collections::HashSet;

#[derive(Debug, Default, Clone)]
pub struct RenderContext {
    processed_terms: HashSet<TermId>,
    logged_messages: HashSet<String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `id` went through a cache lookup.
    ///
    /// Returns `false` when it had already been processed in this render.
    pub fn mark_processed(&mut self, id: TermId) -> bool {
        self.processed_terms.insert(id)
    }

    pub fn is_processed(&self, id: TermId) -> bool {
        self.processed_terms.contains(&id)
    }

    /// Record that `message` is about to be logged.
    ///
    /// Returns `false` when the identical message was already logged in this
    /// render.
    pub fn claim_message(&mut self, message: &str) -> bool {
        if self.logged_messages.contains(message) {
            return false;
        }
        self.logged_messages.insert(message.to_string());
        true
    }

    /// Drop the processed mark for `id` so the next lookup refills the cache.
    pub fn forget_term(&mut self, id: TermId) {
        self.processed_terms.remove(&id);
    }

    /// Allow `message` to be logged again.
    pub fn forget_message(&mut self, message: &str) {
        self.logged_messages.remove(message);
    }

    pub fn processed_count(&self) -> usize {
        self.processed_terms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_processed_once() {
        let mut ctx = RenderContext::new();
        let id = TermId::now_v7();
        assert!(ctx.mark_processed(id));
        assert!(!ctx.mark_processed(id));
        assert!(ctx.is_processed(id));
        assert_eq!(ctx.processed_count(), 1);
    }

    #[test]
    fn test_claim_message_dedups() {
        let mut ctx = RenderContext::new();
        assert!(ctx.claim_message("Cache miss for glossary term ID: 1"));
        assert!(!ctx.claim_message("Cache miss for glossary term ID: 1"));
        assert!(ctx.claim_message("Cache miss for glossary term ID: 2"));
    }

    #[test]
    fn test_forget_releases_state() {
        let mut ctx = RenderContext::new();
        let id = TermId::now_v7();
        ctx.mark_processed(id);
        ctx.claim_message("m");
        ctx.forget_term(id);
        ctx.forget_message("m");
        assert!(!ctx.is_processed(id));
        assert!(ctx.claim_message("m"));
    }

    #[test]
    fn test_fresh_contexts_are_independent() {
        let id = TermId::now_v7();
        let mut first = RenderContext::new();
        first.mark_processed(id);
        let second = RenderContext::new();
        assert!(!second.is_processed(id));
    }
}
