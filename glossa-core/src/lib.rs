//! Glossa Core - Data Types
//!
//! Pure data structures shared by every other crate: term identity, the
//! glossary data model, errors, configuration, the clock abstraction and
//! the per-render de-duplication context. No storage or markup logic lives
//! here.

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod term;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{GlossaryConfig, DEFAULT_CACHE_TTL};
pub use context::RenderContext;
pub use error::{ConfigError, GlossaError, GlossaResult, StoreError, ValidationError};
pub use identity::{new_term_id, TermId, Timestamp};
pub use term::{
    CachedTermRecord, ContentKind, LogEntry, PublicationStatus, Term, DEFAULT_TOOLTIP,
};
