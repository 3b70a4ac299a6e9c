//! Candidate token extraction
//!
//! A token is a maximal run of `[A-Za-z0-9-]` that starts and ends on an
//! ASCII word boundary, where word characters are `[A-Za-z0-9_]`. A hyphen
//! is not a word character, so `"-RJ45-"` yields `RJ45` and a lone `-`
//! yields nothing. Non-ASCII characters never belong to a token.

use std::collections::HashSet;

/// ASCII word character: `[A-Za-z0-9_]`.
pub fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

/// Word boundary between `bytes[pos - 1]` and `bytes[pos]`.
pub fn is_boundary(bytes: &[u8], pos: usize) -> bool {
    let before = pos > 0 && is_word_byte(bytes[pos - 1]);
    let after = pos < bytes.len() && is_word_byte(bytes[pos]);
    before != after
}

/// Iterator over every token occurrence in a string, left to right.
pub struct Tokens<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.source.as_bytes();

        while self.pos < bytes.len() {
            let start = self.pos;
            if !is_token_byte(bytes[start]) || !is_boundary(bytes, start) {
                self.pos += 1;
                continue;
            }

            let run_end = start
                + bytes[start..]
                    .iter()
                    .take_while(|b| is_token_byte(**b))
                    .count();

            // Longest prefix of the run that ends on a boundary.
            match (start + 1..=run_end).rev().find(|&end| is_boundary(bytes, end)) {
                Some(end) => {
                    self.pos = end;
                    return Some(&self.source[start..end]);
                }
                None => self.pos += 1,
            }
        }

        None
    }
}

/// Distinct tokens of `text` in first-seen order. Case is preserved.
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_runs([text])
}

/// Distinct tokens of several text runs, each scanned on its own, so no
/// token spans two runs.
pub fn tokenize_runs<'a, I>(runs: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    runs.into_iter()
        .flat_map(Tokens::new)
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}
