//! Configuration types

use crate::error::{ConfigError, GlossaError, GlossaResult};
use crate::term::DEFAULT_TOOLTIP;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One week, the lifetime of a cached term projection.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(168 * 3600);

/// Master configuration for the annotation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryConfig {
    /// Occurrences of a term turned into markers per render.
    pub max_occurrences: usize,
    /// Expiration horizon for cached term projections.
    pub cache_ttl: Duration,
    /// Maximum number of entries kept in the cache action log.
    pub log_capacity: usize,
    /// Authoring limit for tooltip text, in characters.
    pub tooltip_max_chars: usize,
    /// Tooltip used when a term has none.
    pub default_tooltip: String,
    /// Tag name of the ignore shortcode, `gloss_ign` by default.
    pub ignore_shortcode: String,
    /// Render `[gloss_ign]` spans once the filter has run.
    pub expand_ignore_shortcodes: bool,
}

impl Default for GlossaryConfig {
    fn default() -> Self {
        Self {
            max_occurrences: 7,
            cache_ttl: DEFAULT_CACHE_TTL,
            log_capacity: 1000,
            tooltip_max_chars: 300,
            default_tooltip: DEFAULT_TOOLTIP.to_string(),
            ignore_shortcode: "gloss_ign".to_string(),
            expand_ignore_shortcodes: true,
        }
    }
}

impl GlossaryConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `GLOSSA_MAX_OCCURRENCES` (default: 7)
    /// - `GLOSSA_CACHE_TTL_SECS` (default: 604800)
    /// - `GLOSSA_LOG_CAPACITY` (default: 1000)
    /// - `GLOSSA_TOOLTIP_MAX_CHARS` (default: 300)
    /// - `GLOSSA_DEFAULT_TOOLTIP` (default: "No description available")
    /// - `GLOSSA_IGNORE_SHORTCODE` (default: "gloss_ign")
    /// - `GLOSSA_EXPAND_IGNORE_SHORTCODES` (default: true)
    ///
    /// Unparseable values fall back to the default; call [`validate`](Self::validate)
    /// afterwards to reject out-of-range ones.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_occurrences: env_parse("GLOSSA_MAX_OCCURRENCES")
                .unwrap_or(defaults.max_occurrences),
            cache_ttl: env_parse("GLOSSA_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            log_capacity: env_parse("GLOSSA_LOG_CAPACITY").unwrap_or(defaults.log_capacity),
            tooltip_max_chars: env_parse("GLOSSA_TOOLTIP_MAX_CHARS")
                .unwrap_or(defaults.tooltip_max_chars),
            default_tooltip: std::env::var("GLOSSA_DEFAULT_TOOLTIP")
                .unwrap_or(defaults.default_tooltip),
            ignore_shortcode: std::env::var("GLOSSA_IGNORE_SHORTCODE")
                .unwrap_or(defaults.ignore_shortcode),
            expand_ignore_shortcodes: env_parse("GLOSSA_EXPAND_IGNORE_SHORTCODES")
                .unwrap_or(defaults.expand_ignore_shortcodes),
        }
    }

    pub fn with_max_occurrences(mut self, max: usize) -> Self {
        self.max_occurrences = max;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    pub fn with_expand_ignore_shortcodes(mut self, enabled: bool) -> Self {
        self.expand_ignore_shortcodes = enabled;
        self
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - max_occurrences, log_capacity, tooltip_max_chars > 0
    /// - cache_ttl is positive
    /// - default_tooltip is not empty
    /// - ignore_shortcode is a non-empty `[A-Za-z0-9_-]+` name
    pub fn validate(&self) -> GlossaResult<()> {
        if self.max_occurrences == 0 {
            return Err(invalid(
                "max_occurrences",
                self.max_occurrences.to_string(),
                "max_occurrences must be greater than 0",
            ));
        }

        if self.cache_ttl.is_zero() {
            return Err(invalid(
                "cache_ttl",
                format!("{:?}", self.cache_ttl),
                "cache_ttl must be positive",
            ));
        }

        if self.log_capacity == 0 {
            return Err(invalid(
                "log_capacity",
                self.log_capacity.to_string(),
                "log_capacity must be greater than 0",
            ));
        }

        if self.tooltip_max_chars == 0 {
            return Err(invalid(
                "tooltip_max_chars",
                self.tooltip_max_chars.to_string(),
                "tooltip_max_chars must be greater than 0",
            ));
        }

        if self.default_tooltip.trim().is_empty() {
            return Err(GlossaError::Config(ConfigError::MissingRequired {
                field: "default_tooltip".to_string(),
            }));
        }

        if self.ignore_shortcode.is_empty() {
            return Err(GlossaError::Config(ConfigError::MissingRequired {
                field: "ignore_shortcode".to_string(),
            }));
        }

        if !self
            .ignore_shortcode
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(invalid(
                "ignore_shortcode",
                self.ignore_shortcode.clone(),
                "ignore_shortcode may only contain ASCII letters, digits, '_' and '-'",
            ));
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

fn invalid(field: &str, value: String, reason: &str) -> GlossaError {
    GlossaError::Config(ConfigError::InvalidValue {
        field: field.to_string(),
        value,
        reason: reason.to_string(),
    })
}

// =============================================================================
// TESTS
// =============================================================================
