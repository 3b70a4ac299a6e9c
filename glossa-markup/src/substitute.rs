//! Substitution Engine
//!
//! Replaces whole-word, case-sensitive occurrences of each term title with
//! a marker element. Only the text ranges of open pieces are searched; tags
//! (including tags interrupted by a protected region), comments, protected
//! regions and markers inserted by earlier terms are never entered. Each
//! term gets its own occurrence counter per pass.

use crate::escape::{escape_attr, escape_html, sanitize_url, strip_tags};
use crate::protect::{Piece, ProtectedDocument};
use crate::tokenize::is_word_byte;
use glossa_core::CachedTermRecord;
use std::ops::Range;

/// Search pattern and marker markup for one term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermMarker {
    pattern: String,
    markup: String,
}

impl TermMarker {
    pub fn new(record: &CachedTermRecord) -> Self {
        Self {
            pattern: escape_html(&record.title),
            markup: render_marker(record),
        }
    }

    /// The title as it appears in escaped content.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }
}

/// Render the marker element for `record`.
///
/// The tooltip is tag-stripped and attribute-escaped, the link sanitized,
/// and the title escaped for both the attribute and the element body.
pub fn render_marker(record: &CachedTermRecord) -> String {
    format!(
        r#"<span class="glossary-term" data-tooltip-text="{tooltip}" data-link="{link}" data-title="{title_attr}">{title}</span>"#,
        tooltip = escape_attr(&strip_tags(&record.tooltip_text)),
        link = escape_attr(&sanitize_url(&record.link)),
        title_attr = escape_attr(&record.title),
        title = escape_html(&record.title),
    )
}

/// Occurrence counts for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    /// Occurrences turned into markers.
    pub markers: usize,
    /// Occurrences past the cap, left as escaped text.
    pub plain: usize,
}

impl std::ops::AddAssign for SubstitutionReport {
    fn add_assign(&mut self, other: Self) {
        self.markers += other.markers;
        self.plain += other.plain;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SubstitutionEngine {
    max_occurrences: usize,
}

impl SubstitutionEngine {
    pub fn new(max_occurrences: usize) -> Self {
        Self { max_occurrences }
    }

    pub fn max_occurrences(&self) -> usize {
        self.max_occurrences
    }

    /// Substitute every record into `doc`, in order.
    pub fn apply(
        &self,
        doc: &mut ProtectedDocument,
        records: &[CachedTermRecord],
    ) -> SubstitutionReport {
        let mut report = SubstitutionReport::default();
        for record in records {
            report += self.apply_term(doc, &TermMarker::new(record));
        }
        report
    }

    /// Substitute one term. The occurrence counter spans the whole document.
    pub fn apply_term(
        &self,
        doc: &mut ProtectedDocument,
        marker: &TermMarker,
    ) -> SubstitutionReport {
        let mut report = SubstitutionReport::default();
        if marker.pattern.is_empty() {
            return report;
        }
        doc.rewrite_open(|text, ranges| self.rewrite(text, ranges, marker, &mut report));
        report
    }

    fn rewrite(
        &self,
        text: &str,
        ranges: &[Range<usize>],
        marker: &TermMarker,
        report: &mut SubstitutionReport,
    ) -> Vec<Piece> {
        let mut pieces = Vec::new();
        let mut open = String::with_capacity(text.len());
        let mut last = 0;

        for range in ranges {
            let run = &text[range.clone()];
            for (start, end) in WholeWordMatches::new(run, &marker.pattern) {
                let (start, end) = (range.start + start, range.start + end);
                open.push_str(&text[last..start]);
                if report.markers < self.max_occurrences {
                    pieces.push(Piece::Open(std::mem::take(&mut open)));
                    pieces.push(Piece::Sealed(marker.markup.clone()));
                    report.markers += 1;
                } else {
                    open.push_str(&escape_html(&text[start..end]));
                    report.plain += 1;
                }
                last = end;
            }
        }

        open.push_str(&text[last..]);
        pieces.push(Piece::Open(open));
        pieces
    }
}

// ============================================================================
// WHOLE-WORD SEARCH
// ============================================================================

/// Non-overlapping occurrences of `needle` not adjacent to an ASCII word
/// character on either side. A rejected candidate does not hide a valid
/// occurrence that overlaps it.
struct WholeWordMatches<'a> {
    haystack: &'a str,
    needle: &'a str,
    from: usize,
}

impl<'a> WholeWordMatches<'a> {
    fn new(haystack: &'a str, needle: &'a str) -> Self {
        Self {
            haystack,
            needle,
            from: 0,
        }
    }
}

impl Iterator for WholeWordMatches<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.haystack.as_bytes();
        while self.from <= self.haystack.len() {
            let start = self.from + self.haystack[self.from..].find(self.needle)?;
            let end = start + self.needle.len();

            let word_before = start > 0 && is_word_byte(bytes[start - 1]);
            let word_after = end < bytes.len() && is_word_byte(bytes[end]);
            if !word_before && !word_after {
                self.from = end;
                return Some((start, end));
            }

            let step = self.haystack[start..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            self.from = start + step;
        }
        None
    }
}
