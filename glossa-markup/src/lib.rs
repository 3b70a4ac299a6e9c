//! Glossa Markup - Scanning, Protection, Tokenizing and Substitution
//!
//! Pure text transforms used by the annotation pipeline:
//!
//! - [`segment`]: splits markup into tag, comment and text segments
//! - [`protect`]: lifts code, preformatted and ignore spans out of content
//!   and restores them by index
//! - [`tokenize`]: candidate word tokens for the term query
//! - [`substitute`]: whole-word replacement of titles with marker elements
//! - [`escape`]: HTML escaping, tag stripping and URL sanitizing
//! - [`shortcode`]: rendering of the ignore shortcode
//!
//! Nothing here touches storage.

pub mod escape;
pub mod protect;
pub mod segment;
pub mod shortcode;
pub mod substitute;
pub mod tokenize;

pub use escape::{escape_attr, escape_html, sanitize_url, strip_tags};
pub use protect::{Piece, ProtectedDocument, ProtectedRegionExtractor, DEFAULT_IGNORE_SHORTCODE};
pub use segment::{segments, MarkupScanner, Segment, SegmentKind};
pub use shortcode::IgnoreShortcode;
pub use substitute::{render_marker, SubstitutionEngine, SubstitutionReport, TermMarker};
pub use tokenize::{is_word_byte, tokenize, tokenize_runs, Tokens};
