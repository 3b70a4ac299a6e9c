//! Markup scanner
//!
//! Splits content into tag and text segments. Anything between `<` and the
//! matching `>` is a tag when the `<` is followed by a letter, `/`, `!` or
//! `?`; quoted attribute values may contain `<` and `>`. Comments run to
//! `-->`. A `<` that is not closed by a `>` before the next unquoted `<` is
//! plain text, as is every other character.

use std::iter::Peekable;
use std::str::CharIndices;

// ============================================================================
// SEGMENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Text,
    Tag,
    Comment,
}

/// A slice of the source classified as markup or text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
    /// Byte offset of `text` in the source.
    pub start: usize,
}

impl Segment<'_> {
    pub fn is_text(&self) -> bool {
        self.kind == SegmentKind::Text
    }

    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

// ============================================================================
// SCANNER
// ============================================================================

/// Iterator over the [`Segment`]s of a source string.
///
/// Concatenating the yielded segments reproduces the source exactly.
pub struct MarkupScanner<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Offset of the last `>`; no markup can start at or after it.
    last_gt: usize,
}

impl<'a> MarkupScanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            last_gt: source.rfind('>').unwrap_or(0),
        }
    }

    fn peek_pos(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(i, _)| *i)
            .unwrap_or(self.source.len())
    }

    /// Kind and end offset of the markup starting at `pos`, if any.
    fn markup_at(&self, pos: usize) -> Option<(SegmentKind, usize)> {
        let rest = &self.source[pos..];
        let mut it = rest.chars();
        match (it.next(), it.next()) {
            (Some('<'), Some(c)) if c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?') => {}
            _ => return None,
        }
        if pos >= self.last_gt {
            return None;
        }

        if let Some(body) = rest.strip_prefix("<!--") {
            if let Some(offset) = body.find("-->") {
                return Some((SegmentKind::Comment, pos + "<!--".len() + offset + "-->".len()));
            }
        }
        self.tag_end(pos).map(|end| (SegmentKind::Tag, end))
    }

    /// End of the tag opened at `pos`, one past its `>`. An unquoted `<`
    /// before the `>` means the tag never closes.
    fn tag_end(&self, pos: usize) -> Option<usize> {
        let mut quote: Option<u8> = None;
        for (i, &b) in self.source.as_bytes()[pos + 1..].iter().enumerate() {
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    b'>' => return Some(pos + 1 + i + 1),
                    b'<' => return None,
                    _ => {}
                },
            }
        }
        None
    }

    fn scan_text(&mut self, start: usize) -> Segment<'a> {
        // The first character is never markup.
        self.chars.next();
        while let Some(&(i, _)) = self.chars.peek() {
            if self.markup_at(i).is_some() {
                break;
            }
            self.chars.next();
        }
        let end = self.peek_pos();
        self.segment(SegmentKind::Text, start, end)
    }

    fn scan_markup(&mut self, kind: SegmentKind, start: usize, end: usize) -> Segment<'a> {
        while self.peek_pos() < end {
            self.chars.next();
        }
        self.segment(kind, start, end)
    }

    fn segment(&self, kind: SegmentKind, start: usize, end: usize) -> Segment<'a> {
        Segment {
            kind,
            text: &self.source[start..end],
            start,
        }
    }
}

impl<'a> Iterator for MarkupScanner<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let &(start, _) = self.chars.peek()?;
        let segment = match self.markup_at(start) {
            Some((kind, end)) => self.scan_markup(kind, start, end),
            None => self.scan_text(start),
        };
        Some(segment)
    }
}

/// Scan `source` into segments.
pub fn segments(source: &str) -> MarkupScanner<'_> {
    MarkupScanner::new(source)
}
