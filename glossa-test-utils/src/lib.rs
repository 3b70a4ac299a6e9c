//! Glossa Test Utilities
//!
//! Shared test infrastructure for the Glossa workspace:
//! - Proptest generators for terms and content
//! - Fixtures for the common glossary scenarios
//! - Seeded in-memory stores on a manual clock

pub use glossa_core::{
    CachedTermRecord, Clock, ContentKind, GlossaError, GlossaResult, GlossaryConfig, LogEntry,
    ManualClock, PublicationStatus, RenderContext, Term, TermId, Timestamp,
};
pub use glossa_storage::{
    CacheActionLog, CacheKeys, InMemoryKvStore, InMemoryTermStore, KvStore, TermCache, TermStore,
};

use chrono::{TimeZone, Utc};
use std::sync::Arc;

// ============================================================================
// SEEDED STORES
// ============================================================================

/// In-memory term and key-value stores sharing one manual clock.
pub struct TestStores {
    pub terms: Arc<InMemoryTermStore>,
    pub kv: Arc<InMemoryKvStore>,
    pub clock: Arc<ManualClock>,
}

impl TestStores {
    pub fn new(terms: impl IntoIterator<Item = Term>) -> Self {
        let clock = Arc::new(ManualClock::new(fixtures::epoch()));
        Self {
            terms: Arc::new(InMemoryTermStore::with_terms(terms)),
            kv: Arc::new(InMemoryKvStore::with_clock(clock.clone())),
            clock,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// The clock as a trait object, for constructors taking `Arc<dyn Clock>`.
    pub fn dyn_clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// A term cache over these stores.
    pub fn term_cache(
        &self,
        config: &GlossaryConfig,
    ) -> TermCache<InMemoryTermStore, InMemoryKvStore> {
        TermCache::new(self.terms.clone(), self.kv.clone(), self.dyn_clock(), config)
    }

    /// Messages of the cache action log, newest first.
    pub fn log_messages(&self) -> Vec<String> {
        CacheActionLog::new(self.kv.clone(), self.dyn_clock(), usize::MAX)
            .entries()
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.message)
            .collect()
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use super::*;
    use uuid::Uuid;

    /// Eight literal occurrences of `RJ45`.
    pub const RJ45_SCENARIO: &str =
        "An RJ45 connector uses RJ45 wiring. RJ45 RJ45 RJ45 RJ45 RJ45 RJ45.";

    pub const CODE_SCENARIO: &str = "<code>RJ45</code> is a term.";

    /// Fixed start time for manual clocks.
    pub fn epoch() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Term with a deterministic id derived from `n`.
    pub fn term_with_id(n: u128, title: &str) -> Term {
        Term::new(title, format!("/glossary/{}", title.to_lowercase()))
            .with_id(TermId::new(Uuid::from_u128(n)))
    }

    /// Published `RJ45` term without a tooltip.
    pub fn rj45() -> Term {
        term_with_id(0x45, "RJ45")
    }

    /// A small networking glossary: three published terms, one draft and a page.
    pub fn networking_terms() -> Vec<Term> {
        vec![
            rj45(),
            term_with_id(1, "LAN").with_tooltip("Local area network"),
            term_with_id(2, "Wi-Fi").with_tooltip("Wireless <em>LAN</em> family"),
            term_with_id(3, "WAN").with_status(PublicationStatus::Draft),
            term_with_id(4, "About").with_kind(ContentKind::Page),
        ]
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    pub fn arb_term_id() -> impl Strategy<Value = TermId> {
        any::<u128>().prop_map(|n| TermId::new(Uuid::from_u128(n)))
    }

    /// Term-like titles: uppercase letters then digits, e.g. `RJ45`.
    ///
    /// Never collides with [`arb_filler_word`].
    pub fn arb_title() -> impl Strategy<Value = String> {
        "[A-Z]{1,4}[0-9]{1,3}"
    }

    /// Lowercase filler word.
    pub fn arb_filler_word() -> impl Strategy<Value = String> {
        "[a-z]{1,8}"
    }

    pub fn arb_status() -> impl Strategy<Value = PublicationStatus> {
        prop_oneof![
            Just(PublicationStatus::Published),
            Just(PublicationStatus::Draft),
            Just(PublicationStatus::Trashed),
        ]
    }

    pub fn arb_term() -> impl Strategy<Value = Term> {
        (arb_term_id(), arb_title(), "[ -~]{0,40}", arb_status()).prop_map(
            |(id, title, tooltip, status)| {
                Term::new(title.clone(), format!("/glossary/{}", title.to_lowercase()))
                    .with_id(id)
                    .with_tooltip(tooltip)
                    .with_status(status)
            },
        )
    }

    /// Plain text of filler words and punctuation, no markup.
    pub fn arb_plain_text() -> impl Strategy<Value = String> {
        prop::collection::vec(
            (arb_filler_word(), prop_oneof![Just(" "), Just(", "), Just(". "), Just("\n")]),
            0..20,
        )
        .prop_map(|parts| parts.into_iter().map(|(w, sep)| w + sep).collect())
    }

    /// Markup-bearing content without any title-like word.
    pub fn arb_markup_content() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                arb_plain_text(),
                arb_plain_text().prop_map(|t| format!("<p>{t}</p>")),
                arb_plain_text().prop_map(|t| format!("<em class=\"x\">{t}</em>")),
                arb_plain_text().prop_map(|t| format!("<code>{t}</code>")),
                arb_plain_text().prop_map(|t| format!("<pre>\n{t}</pre>")),
                arb_plain_text().prop_map(|t| format!("[gloss_ign]{t}[/gloss_ign]")),
                arb_plain_text().prop_map(|t| format!("<!-- {t} -->")),
                Just("<!--glossary-ignore-placeholder-0-->".to_string()),
                Just("a &amp; b &lt; c".to_string()),
                Just("if a<b then".to_string()),
                arb_filler_word().prop_map(|w| format!("<li>{w}</li><li>{w}</li>")),
            ],
            0..8,
        )
        .prop_map(|parts| parts.concat())
    }

    /// Plain text with `title` spliced in `occurrences` times as a whole word.
    pub fn arb_text_with_title(title: String, occurrences: usize) -> impl Strategy<Value = String> {
        prop::collection::vec(arb_filler_word(), occurrences + 1).prop_map(move |words| {
            let mut out = String::new();
            for (i, word) in words.iter().enumerate() {
                out.push_str(word);
                if i < occurrences {
                    out.push(' ');
                    out.push_str(&title);
                    out.push(' ');
                }
            }
            out
        })
    }

    /// Markup with `title` flush against tags, protected regions and stray
    /// `<`. The title stands in open text exactly `occurrences` times; some
    /// wrappers also put it inside a region or an attribute.
    pub fn arb_flush_markup(title: String, occurrences: usize) -> impl Strategy<Value = String> {
        let fillers = prop::collection::vec(
            prop_oneof![
                Just(String::new()),
                Just("<p>".to_string()),
                Just("</p>".to_string()),
                Just("<br/>".to_string()),
                Just(" if a<b then ".to_string()),
                Just("<!-- note -->".to_string()),
                Just("[gloss_ign]x[/gloss_ign]".to_string()),
                Just("<a title=\"[gloss_ign]x[/gloss_ign] y\">".to_string()),
            ],
            occurrences + 1,
        );
        let wrappers = prop::collection::vec(0usize..6, occurrences);
        (fillers, wrappers).prop_map(move |(fillers, wrappers)| {
            let t = &title;
            let mut out = String::new();
            for (i, filler) in fillers.iter().enumerate() {
                out.push_str(filler);
                let Some(wrapper) = wrappers.get(i) else {
                    continue;
                };
                out.push_str(&match wrapper {
                    0 => format!("<li>{t}</li>"),
                    1 => format!("<td>{t}</td>"),
                    2 => format!("{t}<code>{t}</code>"),
                    3 => format!("<pre>{t}</pre>{t}<br>"),
                    4 => format!("<a title=\"{t} [gloss_ign]x[/gloss_ign] {t}\">{t}</a>"),
                    _ => format!("<b>{t}</b>"),
                });
            }
            out
        })
    }

    pub fn arb_log_message() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 :.]{1,40}"
    }
}
