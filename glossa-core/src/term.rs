//! Glossary data model: terms, their cached projection, and log entries.

use crate::{TermId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tooltip shown when a term has no description.
pub const DEFAULT_TOOLTIP: &str = "No description available";

/// Content type of an item in the backing store.
///
/// The store holds more than glossary terms; the cache refuses to project
/// anything that is not a glossary entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Glossary,
    Post,
    Page,
}

/// Publication status of a stored item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    #[default]
    Published,
    Draft,
    Trashed,
}

/// A glossary entry as persisted by the authoring side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    #[serde(default = "crate::identity::new_term_id")]
    pub id: TermId,
    #[serde(default = "default_kind")]
    pub kind: ContentKind,
    /// Unique by convention, matched case-sensitively.
    pub title: String,
    /// Up to 300 characters of limited markup.
    #[serde(default)]
    pub tooltip_text: String,
    /// Canonical link of the term's own page.
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub status: PublicationStatus,
    /// Optional expansion of an abbreviation, e.g. "Registered Jack 45".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

fn default_kind() -> ContentKind {
    ContentKind::Glossary
}

impl Term {
    /// Create a published glossary term with a fresh identifier and no tooltip.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            id: TermId::now_v7(),
            kind: ContentKind::Glossary,
            title: title.into(),
            tooltip_text: String::new(),
            link: link.into(),
            status: PublicationStatus::Published,
            abbreviation: None,
        }
    }

    pub fn with_id(mut self, id: TermId) -> Self {
        self.id = id;
        self
    }

    pub fn with_tooltip(mut self, tooltip_text: impl Into<String>) -> Self {
        self.tooltip_text = tooltip_text.into();
        self
    }

    pub fn with_status(mut self, status: PublicationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_kind(mut self, kind: ContentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviation = Some(abbreviation.into());
        self
    }

    pub fn is_glossary(&self) -> bool {
        self.kind == ContentKind::Glossary
    }

    pub fn is_published(&self) -> bool {
        self.status == PublicationStatus::Published
    }
}

/// Cached projection of a [`Term`].
///
/// Never mutated in place: an edit invalidates it and the next reference
/// builds a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedTermRecord {
    pub title: String,
    pub tooltip_text: String,
    pub link: String,
}

impl CachedTermRecord {
    /// Project a term, substituting `default_tooltip` for an empty tooltip.
    pub fn project(term: &Term, default_tooltip: &str) -> Self {
        let tooltip_text = if term.tooltip_text.is_empty() {
            default_tooltip.to_string()
        } else {
            term.tooltip_text.clone()
        };
        Self {
            title: term.title.clone(),
            tooltip_text,
            link: term.link.clone(),
        }
    }
}

/// One line of the cache action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: Timestamp,
    pub message: String,
}

impl LogEntry {
    pub fn new(timestamp: Timestamp, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.message
        )
    }
}
