//! Identity types for glossary entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Opaque identifier of a glossary term.
///
/// Backed by a UUIDv7 so identifiers are sortable by creation time. The
/// textual form is the hyphenated UUID and is what appears in cache keys
/// and log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermId(Uuid);

impl TermId {
    /// Wrap an existing UUID.
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new timestamp-sortable identifier.
    pub fn now_v7() -> Self {
        Self(Uuid::now_v7())
    }

    /// The all-zero identifier. Never assigned to a stored term.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TermId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for TermId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Generate a new term identifier.
pub fn new_term_id() -> TermId {
    TermId::now_v7()
}
