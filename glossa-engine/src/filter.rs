//! Content filter: the annotation pipeline for one render.
//!
//! raw content → protect → tokenize → resolve → cache → substitute →
//! restore. Every call builds its own [`RenderContext`], so independent
//! renders never share de-duplication state.

use crate::resolver::TermResolver;
use glossa_core::{GlossaResult, GlossaryConfig, RenderContext};
use glossa_markup::{tokenize_runs, IgnoreShortcode, ProtectedRegionExtractor, SubstitutionEngine};
use glossa_storage::{KvStore, TermCache, TermStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What kind of page is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderView {
    #[default]
    Post,
    Page,
    /// Listing of all glossary terms.
    GlossaryArchive,
    /// A glossary term's own page.
    GlossarySingle,
    FrontPage,
}

impl RenderView {
    /// Glossary pages and the front page are never annotated.
    pub fn allows_annotation(self) -> bool {
        matches!(self, RenderView::Post | RenderView::Page)
    }
}

pub struct GlossaryFilter<S: TermStore, K: KvStore> {
    cache: Arc<TermCache<S, K>>,
    resolver: TermResolver<S>,
    extractor: ProtectedRegionExtractor,
    substitution: SubstitutionEngine,
    shortcode: Option<IgnoreShortcode>,
}

impl<S: TermStore, K: KvStore> GlossaryFilter<S, K> {
    pub fn new(cache: Arc<TermCache<S, K>>, config: &GlossaryConfig) -> GlossaResult<Self> {
        let shortcode = if config.expand_ignore_shortcodes {
            Some(IgnoreShortcode::new(&config.ignore_shortcode)?)
        } else {
            None
        };

        Ok(Self {
            resolver: TermResolver::new(cache.term_store().clone()),
            extractor: ProtectedRegionExtractor::new(&config.ignore_shortcode)?,
            substitution: SubstitutionEngine::new(config.max_occurrences),
            shortcode,
            cache,
        })
    }

    /// Annotate glossary terms in `content`.
    ///
    /// Returns the content unchanged for views that must not self-annotate.
    /// Store failures only reduce the set of annotated terms.
    pub fn annotate(&self, content: &str, view: RenderView) -> String {
        if !view.allows_annotation() {
            tracing::trace!(?view, "Annotation skipped for view");
            return content.to_string();
        }

        let mut ctx = RenderContext::new();
        let mut doc = self.extractor.extract(content);

        let tokens = tokenize_runs(doc.text_runs());
        let ids = self.resolver.resolve(&tokens);
        let records: Vec<_> = ids
            .into_iter()
            .filter_map(|id| self.cache.resolve(&mut ctx, id))
            .collect();

        if records.is_empty() {
            return doc.restore();
        }

        let report = self.substitution.apply(&mut doc, &records);
        tracing::debug!(
            protected = doc.regions().len(),
            tokens = tokens.len(),
            terms = records.len(),
            markers = report.markers,
            plain = report.plain,
            "Annotated content"
        );

        doc.restore()
    }

    /// Annotate, then render ignore shortcodes when enabled.
    pub fn render(&self, content: &str, view: RenderView) -> String {
        let annotated = self.annotate(content, view);
        match &self.shortcode {
            Some(shortcode) => shortcode.expand(&annotated),
            None => annotated,
        }
    }
}
