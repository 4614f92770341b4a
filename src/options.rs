//! Parse configuration and its builder.
use crate::ast::NodeKind;
use crate::error::{MarkdownError, Result};
use crate::{sanitize, slug};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Pluggable URL sanitizer: value in, accepted value (or `None`) out.
pub type Sanitizer = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Pluggable id generator for headings and footnotes.
pub type Slugify = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Options accepted by [`parse_with_options`](crate::parse_with_options).
pub struct ParseOptions {
    /// Rules to remove from the registry. The plain-text fallback cannot
    /// be disabled.
    pub disabled_rules: HashSet<NodeKind>,
    /// When set, restricts the registry to exactly these rules (plus the
    /// plain-text fallback).
    pub enabled_rules: Option<HashSet<NodeKind>>,
    /// Suppresses bare-URL autolinking.
    pub disable_autolink: bool,
    /// Suppresses the HTML block, self-closing and comment rules.
    pub disable_parsing_raw_html: bool,
    /// Forces block-mode parsing instead of auto-detection.
    pub force_block: bool,
    /// Forces inline-mode parsing instead of auto-detection.
    pub force_inline: bool,
    /// Escapes deny-listed dangerous HTML tags instead of emitting them.
    pub tagfilter: bool,
    /// Truncates a trailing incomplete construct before parsing, for input
    /// that is still being received.
    pub optimize_for_streaming: bool,
    /// Requires a space between `#` and ATX heading text.
    pub enforce_atx_headings: bool,
    /// Upper bound on accepted input size, in bytes.
    pub max_input_size: Option<usize>,
    /// Extra named character references, consulted before the built-ins.
    pub named_codes: HashMap<String, char>,
    /// URL sanitizer override; `None` uses the default policy.
    pub sanitizer: Option<Sanitizer>,
    /// Slug generator override; `None` uses the default.
    pub slugify: Option<Slugify>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            disabled_rules: HashSet::new(),
            enabled_rules: None,
            disable_autolink: false,
            disable_parsing_raw_html: false,
            force_block: false,
            force_inline: false,
            tagfilter: false,
            optimize_for_streaming: false,
            enforce_atx_headings: false,
            max_input_size: None,
            named_codes: HashMap::new(),
            sanitizer: None,
            slugify: None,
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("disabled_rules", &self.disabled_rules)
            .field("enabled_rules", &self.enabled_rules)
            .field("disable_autolink", &self.disable_autolink)
            .field("disable_parsing_raw_html", &self.disable_parsing_raw_html)
            .field("force_block", &self.force_block)
            .field("force_inline", &self.force_inline)
            .field("tagfilter", &self.tagfilter)
            .field("optimize_for_streaming", &self.optimize_for_streaming)
            .field("enforce_atx_headings", &self.enforce_atx_headings)
            .field("max_input_size", &self.max_input_size)
            .field("named_codes", &self.named_codes)
            .field("sanitizer", &self.sanitizer.as_ref().map(|_| "<custom>"))
            .field("slugify", &self.slugify.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

impl ParseOptions {
    /// Creates a builder for configuring parsing.
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }

    /// Returns whether a rule survives the enable/disable filters.
    pub fn rule_enabled(&self, kind: NodeKind) -> bool {
        if kind == NodeKind::Text {
            return true;
        }
        if self.disabled_rules.contains(&kind) {
            return false;
        }
        if self.disable_parsing_raw_html
            && matches!(
                kind,
                NodeKind::HtmlBlock | NodeKind::HtmlSelfClosing | NodeKind::HtmlComment
            )
        {
            return false;
        }
        match &self.enabled_rules {
            Some(set) => set.contains(&kind),
            None => true,
        }
    }

    /// Applies the configured or default sanitizer.
    pub fn sanitize(&self, url: &str) -> Option<String> {
        match &self.sanitizer {
            Some(f) => f(url),
            None => sanitize::sanitize_url(url),
        }
    }

    /// Applies the configured or default slug generator.
    pub fn slug(&self, text: &str) -> String {
        match &self.slugify {
            Some(f) => f(text),
            None => slug::slugify(text),
        }
    }
}

/// Fluent builder for [`ParseOptions`].
#[derive(Default)]
pub struct ParseOptionsBuilder {
    options: ParseOptions,
}

impl ParseOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes rules from the registry.
    pub fn disable_rules(mut self, kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        self.options.disabled_rules.extend(kinds);
        self
    }

    /// Restricts the registry to the given rules plus the text fallback.
    pub fn enable_only(mut self, kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        self.options.enabled_rules = Some(kinds.into_iter().collect());
        self
    }

    pub fn disable_autolink(mut self, disabled: bool) -> Self {
        self.options.disable_autolink = disabled;
        self
    }

    pub fn disable_parsing_raw_html(mut self, disabled: bool) -> Self {
        self.options.disable_parsing_raw_html = disabled;
        self
    }

    pub fn force_block(mut self, forced: bool) -> Self {
        self.options.force_block = forced;
        self
    }

    pub fn force_inline(mut self, forced: bool) -> Self {
        self.options.force_inline = forced;
        self
    }

    pub fn tagfilter(mut self, enabled: bool) -> Self {
        self.options.tagfilter = enabled;
        self
    }

    pub fn optimize_for_streaming(mut self, enabled: bool) -> Self {
        self.options.optimize_for_streaming = enabled;
        self
    }

    pub fn enforce_atx_headings(mut self, enforced: bool) -> Self {
        self.options.enforce_atx_headings = enforced;
        self
    }

    pub fn max_input_size(mut self, limit: usize) -> Self {
        self.options.max_input_size = Some(limit);
        self
    }

    /// Adds a named character reference (without `&` and `;`).
    pub fn named_code(mut self, name: impl Into<String>, value: char) -> Self {
        self.options.named_codes.insert(name.into(), value);
        self
    }

    pub fn sanitizer(mut self, f: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        self.options.sanitizer = Some(Box::new(f));
        self
    }

    pub fn slugify(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.options.slugify = Some(Box::new(f));
        self
    }

    /// Validates and produces the final options.
    pub fn build(self) -> Result<ParseOptions> {
        let options = self.options;
        if options.force_block && options.force_inline {
            return Err(MarkdownError::invalid_options(
                "force_block and force_inline are mutually exclusive",
            ));
        }
        if options.disabled_rules.contains(&NodeKind::Text) {
            return Err(MarkdownError::invalid_options(
                "the plain-text fallback rule cannot be disabled",
            ));
        }
        if let Some(enabled) = &options.enabled_rules {
            if let Some(conflict) = enabled.intersection(&options.disabled_rules).next() {
                return Err(MarkdownError::invalid_options(format!(
                    "rule {conflict:?} is both enabled and disabled"
                )));
            }
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_enable_everything() {
        let options = ParseOptions::default();
        assert!(options.rule_enabled(NodeKind::Table));
        assert!(options.rule_enabled(NodeKind::Text));
    }

    #[test]
    fn disabled_rules_are_filtered() {
        let options = ParseOptions::builder()
            .disable_rules([NodeKind::Table, NodeKind::Image])
            .build()
            .unwrap();
        assert!(!options.rule_enabled(NodeKind::Table));
        assert!(options.rule_enabled(NodeKind::Link));
    }

    #[test]
    fn enable_only_restricts_but_keeps_text() {
        let options = ParseOptions::builder()
            .enable_only([NodeKind::Paragraph, NodeKind::TextBolded])
            .build()
            .unwrap();
        assert!(options.rule_enabled(NodeKind::Paragraph));
        assert!(!options.rule_enabled(NodeKind::Heading));
        assert!(options.rule_enabled(NodeKind::Text));
    }

    #[test]
    fn raw_html_switch_covers_all_three_rules() {
        let options = ParseOptions::builder()
            .disable_parsing_raw_html(true)
            .build()
            .unwrap();
        assert!(!options.rule_enabled(NodeKind::HtmlBlock));
        assert!(!options.rule_enabled(NodeKind::HtmlSelfClosing));
        assert!(!options.rule_enabled(NodeKind::HtmlComment));
    }

    #[test]
    fn conflicting_force_flags_fail_validation() {
        let err = ParseOptions::builder()
            .force_block(true)
            .force_inline(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, MarkdownError::InvalidOptions { .. }));
    }

    #[test]
    fn text_fallback_cannot_be_disabled() {
        let err = ParseOptions::builder()
            .disable_rules([NodeKind::Text])
            .build()
            .unwrap_err();
        assert!(matches!(err, MarkdownError::InvalidOptions { .. }));
    }

    #[test]
    fn custom_sanitizer_is_used() {
        let options = ParseOptions::builder()
            .sanitizer(|_| Some("https://fixed".to_string()))
            .build()
            .unwrap();
        assert_eq!(
            options.sanitize("javascript:x"),
            Some("https://fixed".to_string())
        );
    }
}
