//! Property-Based Tests for the Markup Transforms
//!
//! Properties:
//! - Segments tile the source exactly
//! - Escaping is idempotent and leaves no raw markup characters
//! - Every token is a well-formed candidate word found in the input
//! - Extract → restore is the identity
//! - Text runs of a protected document hold no markup

use glossa_markup::{
    escape_html, segments, strip_tags, tokenize, ProtectedRegionExtractor, SegmentKind, Tokens,
};
use proptest::prelude::*;

fn arb_markupish() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[ -~]{0,12}",
            "[a-zA-Z0-9 _-]{0,12}",
            Just("<code>".to_string()),
            Just("</code>".to_string()),
            Just("<pre class=\"x\">".to_string()),
            Just("</pre>".to_string()),
            Just("[gloss_ign]".to_string()),
            Just("[/gloss_ign]".to_string()),
            Just("<!--".to_string()),
            Just("-->".to_string()),
            Just("é\n".to_string()),
            Just("<li>".to_string()),
            Just("</li>".to_string()),
            Just("a<b".to_string()),
            Just("<a title=\"".to_string()),
            Just("\">".to_string()),
        ],
        0..12,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_segments_tile_source(source in arb_markupish()) {
        let joined: String = segments(&source).map(|s| s.text).collect();
        prop_assert_eq!(joined, source);
    }

    #[test]
    fn prop_escape_idempotent(text in "[ -~]{0,40}") {
        let once = escape_html(&text);
        prop_assert!(!once.contains('<') && !once.contains('>') && !once.contains('"'));
        prop_assert_eq!(escape_html(&once), once);
    }

    #[test]
    fn prop_tokens_are_candidate_words(text in arb_markupish()) {
        let plain = strip_tags(&text);
        for token in Tokens::new(&plain) {
            prop_assert!(!token.is_empty());
            prop_assert!(token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-'));
            prop_assert!(plain.contains(token));
        }
        let distinct = tokenize(&plain);
        let mut sorted = distinct.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), distinct.len());
    }

    #[test]
    fn prop_extract_restore_identity(content in arb_markupish()) {
        let doc = ProtectedRegionExtractor::default().extract(&content);
        prop_assert_eq!(doc.restore(), content);
    }

    #[test]
    fn prop_text_runs_hold_no_markup(content in arb_markupish()) {
        let doc = ProtectedRegionExtractor::default().extract(&content);
        let runs = doc.text_runs();
        for run in &runs {
            prop_assert!(!run.is_empty());
            prop_assert!(segments(run).all(|s| s.kind == SegmentKind::Text));
        }
        let text_len: usize = runs.iter().map(|r| r.len()).sum();
        let region_len: usize = doc.regions().iter().map(String::len).sum();
        prop_assert!(text_len + region_len <= content.len());
    }
}
