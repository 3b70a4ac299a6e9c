//! Protected-Region Extractor
//!
//! Code blocks, preformatted blocks and ignore-shortcode spans are lifted
//! out of the content before substitution and put back afterwards. The
//! document is held as an ordered list of pieces; a protected region is a
//! [`Piece::Protected`] holding an index into the region table, so no
//! placeholder text ever appears in the content and nothing can collide
//! with it.
//!
//! Open pieces are scanned for markup as one stream in which every
//! protected or sealed piece counts as a single opaque character. A tag
//! split by a region therefore stays a tag on both sides of it, and text on
//! either side of a region or tag never joins into one word.

use crate::segment::segments;
use glossa_core::{ConfigError, GlossaError, GlossaResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Stand-in for a non-open piece when scanning the open pieces together.
const OPAQUE: char = '\u{FFFC}';

/// Tag name of the default ignore shortcode.
pub const DEFAULT_IGNORE_SHORTCODE: &str = "gloss_ign";

static DEFAULT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&pattern_source(DEFAULT_IGNORE_SHORTCODE)).expect("Valid protected region regex")
});

/// Non-greedy, case-insensitive, `.` matches newlines. Unterminated blocks
/// do not match and stay unprotected.
fn pattern_source(ignore_shortcode: &str) -> String {
    let tag = regex::escape(ignore_shortcode);
    format!(r"(?is)<pre\b.*?>.*?</pre>|<code\b.*?>.*?</code>|\[{tag}\].*?\[/{tag}\]")
}

// ============================================================================
// DOCUMENT
// ============================================================================

/// One piece of a protected document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Content open to substitution.
    Open(String),
    /// Index into the region table.
    Protected(usize),
    /// Generated markup that later substitution passes must not enter.
    Sealed(String),
}

/// Content with its protected regions lifted out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedDocument {
    pieces: Vec<Piece>,
    regions: Vec<String>,
}

impl ProtectedDocument {
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Source text of every protected region, in source order.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Byte ranges of text within each piece, indexed like [`Self::pieces`].
    ///
    /// Only open pieces get ranges. Markup is recognised across piece
    /// boundaries, so the tail of a tag interrupted by a region is not text.
    pub fn text_ranges(&self) -> Vec<Vec<Range<usize>>> {
        let mut stream = String::new();
        let mut spans = Vec::with_capacity(self.pieces.len());
        for piece in &self.pieces {
            match piece {
                Piece::Open(text) => {
                    let start = stream.len();
                    stream.push_str(text);
                    spans.push(Some(start..stream.len()));
                }
                Piece::Protected(_) | Piece::Sealed(_) => {
                    stream.push(OPAQUE);
                    spans.push(None);
                }
            }
        }

        let mut ranges = vec![Vec::new(); self.pieces.len()];
        let mut text = segments(&stream).filter(|s| s.is_text()).peekable();
        for (span, out) in spans.iter().zip(ranges.iter_mut()) {
            let Some(span) = span else { continue };
            while let Some(segment) = text.peek() {
                if segment.start >= span.end {
                    break;
                }
                let start = segment.start.max(span.start);
                let end = segment.end().min(span.end);
                if start < end {
                    out.push(start - span.start..end - span.start);
                }
                if segment.end() > span.end {
                    break;
                }
                text.next();
            }
        }
        ranges
    }

    /// Every text run of the open pieces, in document order.
    pub fn text_runs(&self) -> Vec<&str> {
        self.pieces
            .iter()
            .zip(self.text_ranges())
            .flat_map(|(piece, ranges)| match piece {
                Piece::Open(text) => ranges.into_iter().map(|r| &text[r]).collect::<Vec<_>>(),
                _ => Vec::new(),
            })
            .collect()
    }

    /// Rewrite every open piece with `rewrite`, splicing in its output.
    ///
    /// `rewrite` receives the piece and its text ranges.
    pub fn rewrite_open<F>(&mut self, mut rewrite: F)
    where
        F: FnMut(&str, &[Range<usize>]) -> Vec<Piece>,
    {
        let ranges = self.text_ranges();
        let pieces = std::mem::take(&mut self.pieces);
        for (piece, ranges) in pieces.into_iter().zip(ranges) {
            match piece {
                Piece::Open(text) => {
                    for new_piece in rewrite(&text, &ranges) {
                        self.push(new_piece);
                    }
                }
                other => self.pieces.push(other),
            }
        }
    }

    fn push(&mut self, piece: Piece) {
        match piece {
            Piece::Open(text) if text.is_empty() => {}
            Piece::Open(text) => match self.pieces.last_mut() {
                Some(Piece::Open(last)) => last.push_str(&text),
                _ => self.pieces.push(Piece::Open(text)),
            },
            other => self.pieces.push(other),
        }
    }

    /// Put every protected region back in place.
    pub fn restore(self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Open(text) | Piece::Sealed(text) => out.push_str(text),
                Piece::Protected(index) => {
                    if let Some(region) = self.regions.get(*index) {
                        out.push_str(region);
                    }
                }
            }
        }
        out
    }
}

// ============================================================================
// EXTRACTOR
// ============================================================================

#[derive(Debug, Clone)]
pub struct ProtectedRegionExtractor {
    pattern: Regex,
}

impl ProtectedRegionExtractor {
    /// Extractor recognising `[ignore_shortcode]...[/ignore_shortcode]`.
    pub fn new(ignore_shortcode: &str) -> GlossaResult<Self> {
        if ignore_shortcode == DEFAULT_IGNORE_SHORTCODE {
            return Ok(Self::default());
        }
        let pattern = Regex::new(&pattern_source(ignore_shortcode)).map_err(|e| {
            GlossaError::Config(ConfigError::InvalidValue {
                field: "ignore_shortcode".to_string(),
                value: ignore_shortcode.to_string(),
                reason: e.to_string(),
            })
        })?;
        Ok(Self { pattern })
    }

    /// Split `content` into open pieces and protected regions.
    pub fn extract(&self, content: &str) -> ProtectedDocument {
        let mut doc = ProtectedDocument::default();
        let mut last = 0;

        for m in self.pattern.find_iter(content) {
            doc.push(Piece::Open(content[last..m.start()].to_string()));
            doc.pieces.push(Piece::Protected(doc.regions.len()));
            doc.regions.push(m.as_str().to_string());
            last = m.end();
        }
        doc.push(Piece::Open(content[last..].to_string()));

        doc
    }
}

impl Default for ProtectedRegionExtractor {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(content: &str) -> ProtectedDocument {
        ProtectedRegionExtractor::default().extract(content)
    }

    fn open_text(doc: &ProtectedDocument) -> String {
        doc.pieces()
            .iter()
            .filter_map(|p| match p {
                Piece::Open(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_code_pre_and_ignore_are_protected() {
        let doc = extract(
            "a <code>RJ45</code> b <PRE class=\"x\">\nRJ45\n</PRE> c [gloss_ign]RJ45[/gloss_ign] d",
        );
        assert_eq!(
            doc.regions(),
            &[
                "<code>RJ45</code>".to_string(),
                "<PRE class=\"x\">\nRJ45\n</PRE>".to_string(),
                "[gloss_ign]RJ45[/gloss_ign]".to_string(),
            ]
        );
        assert_eq!(open_text(&doc), "a  b  c  d");
    }

    #[test]
    fn test_regions_are_numbered_in_source_order() {
        let doc = extract("<code>1</code><code>2</code>");
        assert_eq!(
            doc.pieces(),
            &[Piece::Protected(0), Piece::Protected(1)]
        );
    }

    #[test]
    fn test_non_greedy_match() {
        let doc = extract("<code>a</code> RJ45 <code>b</code>");
        assert_eq!(doc.regions().len(), 2);
        assert_eq!(open_text(&doc), " RJ45 ");
    }

    #[test]
    fn test_unterminated_block_left_open() {
        let doc = extract("<code>RJ45 and more");
        assert!(doc.regions().is_empty());
        assert_eq!(open_text(&doc), "<code>RJ45 and more");
    }

    #[test]
    fn test_similar_tag_names_not_protected() {
        let doc = extract("<codex>RJ45</codex>");
        assert!(doc.regions().is_empty());
    }

    #[test]
    fn test_restore_is_identity_without_rewrites() {
        let content =
            "x <pre>y</pre> [gloss_ign]z[/gloss_ign] <!--glossary-ignore-placeholder-0-->";
        assert_eq!(extract(content).restore(), content);
    }

    #[test]
    fn test_custom_shortcode() {
        let doc = ProtectedRegionExtractor::new("skip.me")
            .unwrap()
            .extract("[skip.me]a[/skip.me] [gloss_ign]b[/gloss_ign]");
        assert_eq!(doc.regions(), &["[skip.me]a[/skip.me]".to_string()]);
    }

    #[test]
    fn test_rewrite_open_leaves_regions_alone() {
        let mut doc = extract("RJ45 <code>RJ45</code> RJ45");
        doc.rewrite_open(|text, _| vec![Piece::Open(text.replace("RJ45", "X"))]);
        assert_eq!(doc.restore(), "X <code>RJ45</code> X");
    }

    #[test]
    fn test_sealed_pieces_are_not_rewritten() {
        let mut doc = extract("ab");
        doc.rewrite_open(|_, _| vec![Piece::Open("a".into()), Piece::Sealed("<b>".into())]);
        doc.rewrite_open(|text, _| vec![Piece::Open(text.to_uppercase())]);
        assert_eq!(doc.restore(), "A<b>");
    }

    #[test]
    fn test_text_runs_split_at_tags_and_regions() {
        let doc = extract("<td>RJ45</td><td>LAN</td> RJ45<code>x</code>LAN");
        assert_eq!(doc.text_runs(), vec!["RJ45", "LAN", " RJ45", "LAN"]);
    }

    #[test]
    fn test_tag_split_by_region_is_not_text() {
        let doc = extract(r#"<a title="RJ45 [gloss_ign]x[/gloss_ign] RJ45">RJ45</a> end"#);
        assert_eq!(doc.text_runs(), vec!["RJ45", " end"]);
        assert_eq!(
            doc.text_ranges(),
            vec![vec![], vec![], vec![7..11, 15..19]]
        );
    }

    #[test]
    fn test_unclosed_lt_is_text() {
        let doc = extract("RJ45 if a<b then <code>x</code> RJ45");
        assert_eq!(doc.text_runs(), vec!["RJ45 if a<b then ", " RJ45"]);
    }

    #[test]
    fn test_sealed_pieces_have_no_ranges() {
        let mut doc = extract("a b");
        doc.rewrite_open(|_, _| {
            vec![
                Piece::Open("x ".into()),
                Piece::Sealed("<i>y</i>".into()),
                Piece::Open(" z".into()),
            ]
        });
        assert_eq!(doc.text_ranges(), vec![vec![0..2], vec![], vec![0..2]]);
    }
}
