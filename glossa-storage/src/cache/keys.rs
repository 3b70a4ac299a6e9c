//! Persisted key names.

use glossa_core::TermId;

/// Key layout in the key-value store.
///
/// Term projections live under a shared prefix so a bulk clear can drop
/// them without touching the index or the log.
pub struct CacheKeys;

impl CacheKeys {
    /// Prefix of every cached term projection.
    pub const TERM_PREFIX: &'static str = "glossary_term_";

    /// Titles known to have been cached at least once.
    pub const CACHED_TERMS: &'static str = "glossary_cached_terms";

    /// Cache action log.
    pub const LOG: &'static str = "glossary_cache_log";

    /// Key of the cached projection for `id`.
    pub fn term(id: TermId) -> String {
        format!("{}{}", Self::TERM_PREFIX, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_key_format() {
        assert_eq!(
            CacheKeys::term(TermId::nil()),
            "glossary_term_00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_option_keys_outside_term_prefix() {
        assert!(!CacheKeys::CACHED_TERMS.starts_with(CacheKeys::TERM_PREFIX));
        assert!(!CacheKeys::LOG.starts_with(CacheKeys::TERM_PREFIX));
    }
}
