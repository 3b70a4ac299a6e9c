//! Authoring save hooks.
//!
//! The authoring side owns term content. Saving a tooltip persists it and
//! then drops the cached projection, so the next render picks the new text
//! up. Abbreviations are not part of the projection and leave the cache
//! alone.

use glossa_core::{
    GlossaError, GlossaResult, GlossaryConfig, RenderContext, StoreError, Term, TermId,
    ValidationError,
};
use glossa_markup::{escape_attr, sanitize_url, segments, strip_tags, SegmentKind};
use glossa_storage::{KvStore, TermCache, TermStore};
use std::sync::Arc;

/// Inline tags a tooltip may keep.
const ALLOWED_TOOLTIP_TAGS: &[&str] = &[
    "a", "abbr", "b", "br", "code", "em", "i", "small", "strong", "sub", "sup", "u",
];

pub struct Authoring<S: TermStore, K: KvStore> {
    cache: Arc<TermCache<S, K>>,
    tooltip_max_chars: usize,
}

impl<S: TermStore, K: KvStore> Authoring<S, K> {
    pub fn new(cache: Arc<TermCache<S, K>>, config: &GlossaryConfig) -> Self {
        Self {
            cache,
            tooltip_max_chars: config.tooltip_max_chars,
        }
    }

    /// Save the tooltip text of a glossary term and invalidate its cache entry.
    ///
    /// The text is cut to the configured length and then sanitized.
    pub fn save_tooltip(&self, id: TermId, text: &str) -> GlossaResult<Term> {
        let term = self.load_glossary_term(id)?;
        let truncated: String = text.chars().take(self.tooltip_max_chars).collect();
        let tooltip = sanitize_tooltip(&truncated);

        let updated = term.with_tooltip(tooltip);
        self.cache.term_store().save(&updated)?;
        self.cache.invalidate(&mut RenderContext::new(), id)?;

        tracing::info!(term_id = %id, title = %updated.title, "Glossary tooltip saved");
        Ok(updated)
    }

    /// Save the full form of an abbreviation term. Blank text clears it.
    pub fn save_abbreviation(&self, id: TermId, text: &str) -> GlossaResult<Term> {
        let mut term = self.load_glossary_term(id)?;
        let full_form = sanitize_text(text);
        term.abbreviation = (!full_form.is_empty()).then_some(full_form);

        self.cache.term_store().save(&term)?;
        tracing::debug!(term_id = %id, "Glossary abbreviation saved");
        Ok(term)
    }

    fn load_glossary_term(&self, id: TermId) -> GlossaResult<Term> {
        let term = self
            .cache
            .term_store()
            .get(id)?
            .ok_or(GlossaError::Store(StoreError::NotFound { id }))?;
        if !term.is_glossary() {
            return Err(GlossaError::Validation(ValidationError::InvalidValue {
                field: "term_id".to_string(),
                reason: format!("{id} is not a glossary term"),
            }));
        }
        Ok(term)
    }
}

// ============================================================================
// SANITIZING
// ============================================================================

/// Keep text and allowed inline tags; drop everything else.
///
/// Allowed tags are re-emitted without attributes, except `href` on `<a>`,
/// which is sanitized. Comments are removed. A `<` left in text (an
/// unclosed tag) is encoded.
pub fn sanitize_tooltip(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for segment in segments(input) {
        match segment.kind {
            SegmentKind::Text => out.push_str(&segment.text.replace('<', "&lt;")),
            SegmentKind::Comment => {}
            SegmentKind::Tag => {
                if let Some(tag) = rebuild_allowed_tag(segment.text) {
                    out.push_str(&tag);
                }
            }
        }
    }
    out.trim().to_string()
}

fn rebuild_allowed_tag(raw: &str) -> Option<String> {
    let inner = raw.strip_prefix('<')?;
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name_len = inner
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    let name = inner[..name_len].to_ascii_lowercase();
    if !ALLOWED_TOOLTIP_TAGS.contains(&name.as_str()) {
        return None;
    }

    if closing {
        return Some(format!("</{name}>"));
    }
    if name == "a" {
        if let Some(href) = attribute(&inner[name_len..], "href") {
            let href = sanitize_url(&href);
            if !href.is_empty() {
                return Some(format!("<a href=\"{}\">", escape_attr(&href)));
            }
        }
    }
    Some(format!("<{name}>"))
}

/// Value of attribute `name` in the attribute text of a tag.
fn attribute(attrs: &str, name: &str) -> Option<String> {
    let lower = attrs.to_ascii_lowercase();
    let mut search = 0;
    while let Some(offset) = lower[search..].find(name) {
        let at = search + offset;
        search = at + name.len();

        let preceded_by_space = at == 0 || lower.as_bytes()[at - 1].is_ascii_whitespace();
        let rest = attrs[search..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        if !preceded_by_space {
            continue;
        }

        let rest = rest.trim_start();
        let value = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => rest[1..].split(q).next().unwrap_or(""),
            _ => rest
                .split(|c: char| c.is_whitespace() || c == '>')
                .next()
                .unwrap_or(""),
        };
        return Some(value.to_string());
    }
    None
}

/// Plain text: tags stripped, whitespace runs collapsed, trimmed.
pub fn sanitize_text(input: &str) -> String {
    strip_tags(input)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
