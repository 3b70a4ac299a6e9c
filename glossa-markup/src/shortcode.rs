//! Ignore shortcode rendering.
//!
//! `[gloss_ign]text[/gloss_ign]` renders as
//! `<span class="glossary-ignore">text</span>` once annotation is done. The
//! inner text is expanded again, so other ignore spans it contains render
//! too.

use crate::protect::DEFAULT_IGNORE_SHORTCODE;
use glossa_core::{ConfigError, GlossaError, GlossaResult};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static DEFAULT_SHORTCODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&shortcode_source(DEFAULT_IGNORE_SHORTCODE)).expect("Valid ignore shortcode regex")
});

fn shortcode_source(tag: &str) -> String {
    let tag = regex::escape(tag);
    format!(r"(?s)\[{tag}\](.*?)\[/{tag}\]")
}

#[derive(Debug, Clone)]
pub struct IgnoreShortcode {
    pattern: Regex,
}

impl IgnoreShortcode {
    pub fn new(tag: &str) -> GlossaResult<Self> {
        if tag == DEFAULT_IGNORE_SHORTCODE {
            return Ok(Self::default());
        }
        let pattern = Regex::new(&shortcode_source(tag)).map_err(|e| {
            GlossaError::Config(ConfigError::InvalidValue {
                field: "ignore_shortcode".to_string(),
                value: tag.to_string(),
                reason: e.to_string(),
            })
        })?;
        Ok(Self { pattern })
    }

    /// Render every ignore span in `content`.
    pub fn expand(&self, content: &str) -> String {
        self.pattern
            .replace_all(content, |caps: &Captures<'_>| {
                let inner = caps.get(1).map_or("", |m| m.as_str());
                format!(r#"<span class="glossary-ignore">{}</span>"#, self.expand(inner))
            })
            .into_owned()
    }
}

impl Default for IgnoreShortcode {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_SHORTCODE.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand() {
        assert_eq!(
            IgnoreShortcode::default().expand("a [gloss_ign]RJ45[/gloss_ign] b"),
            r#"a <span class="glossary-ignore">RJ45</span> b"#
        );
    }

    #[test]
    fn test_expand_multiline_and_multiple() {
        let out = IgnoreShortcode::default()
            .expand("[gloss_ign]a\nb[/gloss_ign][gloss_ign]c[/gloss_ign]");
        assert_eq!(
            out,
            "<span class=\"glossary-ignore\">a\nb</span><span class=\"glossary-ignore\">c</span>"
        );
    }

    #[test]
    fn test_tag_name_is_case_sensitive() {
        let content = "[GLOSS_IGN]x[/GLOSS_IGN]";
        assert_eq!(IgnoreShortcode::default().expand(content), content);
    }

    #[test]
    fn test_unterminated_left_alone() {
        let content = "[gloss_ign]x";
        assert_eq!(IgnoreShortcode::default().expand(content), content);
    }

    #[test]
    fn test_custom_tag() {
        let shortcode = IgnoreShortcode::new("noterm").unwrap();
        assert_eq!(
            shortcode.expand("[noterm]x[/noterm]"),
            r#"<span class="glossary-ignore">x</span>"#
        );
    }
}
