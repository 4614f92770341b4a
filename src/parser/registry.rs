//! The rule registry: every recognized construct as a priority-ordered
//! `(kind, scope, match, parse)` entry.
//!
//! The set is closed at compile time, so rules are plain `Copy` structs of
//! function pointers — no virtual dispatch. The table is sorted once at
//! construction; the driver iterates it in order and takes the first
//! match. Ties inside a band break on `NodeKind` declaration order, which
//! is the documented stable tie-break.
use crate::ast::{Node, NodeKind};
use crate::options::ParseOptions;
use crate::parser::context::{Context, Flags};
use crate::parser::core::Parser;
use crate::parser::{blocks, html, inline, links, list, refs, table};

/// Priority bands, highest urgency first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    /// Short-circuits everything: comments, front matter, definitions.
    Max = 0,
    /// Block constructs and escapes.
    High = 1,
    /// Priority inline formatting.
    Med = 2,
    /// Links, paragraphs, remaining formatting, newline coalescing.
    Low = 3,
    /// The plain-text fallback; always enabled.
    Min = 4,
}

/// Scope gate applied before a rule's pattern is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Active only outside inline and simple modes.
    Block,
    /// Active only in inline mode.
    Inline,
    /// Active in inline or simple mode; formatting that must work inside
    /// link text without producing nested links.
    SimpleInline,
    /// Always tried; raw HTML, comments and definitions can appear in any
    /// context. Rules with extra conditions check them in their matcher.
    Any,
}

impl Scope {
    /// Cheap flag check, evaluated before any pattern work.
    pub fn active(self, flags: &Flags) -> bool {
        match self {
            Scope::Block => flags.is_block(),
            Scope::Inline => flags.inline,
            Scope::SimpleInline => flags.inline || flags.simple,
            Scope::Any => true,
        }
    }
}

/// Matcher: returns the strictly non-empty consumed byte length.
pub type MatchFn = fn(&str, &Context, &ParseOptions) -> Option<usize>;

/// Node builder: receives the matched slice and the parser for re-entrant
/// nested parsing. Returns zero or more nodes (definitions return none).
pub type ParseFn = fn(&str, &mut Parser<'_>) -> Vec<Node>;

/// One registered syntax construct.
#[derive(Clone, Copy)]
pub struct Rule {
    pub kind: NodeKind,
    pub priority: Priority,
    pub scope: Scope,
    pub is_match: MatchFn,
    pub parse: ParseFn,
}

macro_rules! rule {
    ($kind:ident, $priority:ident, $scope:ident, $module:ident :: $match_fn:ident, $parse_fn:ident) => {
        Rule {
            kind: NodeKind::$kind,
            priority: Priority::$priority,
            scope: Scope::$scope,
            is_match: $module::$match_fn,
            parse: $module::$parse_fn,
        }
    };
}

/// The full rule table, in declaration order. Construction filters and
/// sorts it per the caller's options.
fn all_rules() -> Vec<Rule> {
    vec![
        // MAX
        rule!(FrontMatter, Max, Block, blocks::match_front_matter, parse_front_matter),
        rule!(HtmlComment, Max, Any, html::match_html_comment, parse_html_comment),
        rule!(RefDefinition, Max, Any, refs::match_ref_definition, parse_ref_definition),
        rule!(
            FootnoteDefinition,
            Max,
            Any,
            refs::match_footnote_definition,
            parse_footnote_definition
        ),
        rule!(HeadingSetext, Max, Block, blocks::match_heading_setext, parse_heading_setext),
        rule!(LinkAngle, Max, Inline, links::match_link_angle, parse_link_angle),
        rule!(LinkMailto, Max, Inline, links::match_link_mailto, parse_link_mailto),
        rule!(LinkBareUrl, Max, Inline, links::match_link_bare_url, parse_link_bare_url),
        // HIGH
        rule!(BreakLine, High, SimpleInline, inline::match_break_line, parse_break_line),
        rule!(BreakThematic, High, Block, blocks::match_break_thematic, parse_break_thematic),
        rule!(BlockQuote, High, Block, blocks::match_block_quote, parse_block_quote),
        rule!(CodeFenced, High, Block, blocks::match_code_fenced, parse_code_fenced),
        rule!(CodeIndented, High, Block, blocks::match_code_indented, parse_code_indented),
        rule!(Heading, High, Block, blocks::match_heading, parse_heading),
        rule!(GfmTask, High, SimpleInline, inline::match_gfm_task, parse_gfm_task),
        rule!(HtmlBlock, High, Any, html::match_html_block, parse_html_block),
        rule!(
            HtmlSelfClosing,
            High,
            Any,
            html::match_html_self_closing,
            parse_html_self_closing
        ),
        rule!(Image, High, SimpleInline, links::match_image, parse_image),
        rule!(RefImage, High, SimpleInline, links::match_ref_image, parse_ref_image),
        // Lists gate on the dual in-list/block condition in their matcher.
        rule!(OrderedList, High, Any, list::match_ordered_list, parse_ordered_list),
        rule!(UnorderedList, High, Any, list::match_unordered_list, parse_unordered_list),
        rule!(Table, High, Block, table::match_table, parse_table),
        rule!(
            FootnoteReference,
            High,
            Inline,
            links::match_footnote_reference,
            parse_footnote_reference
        ),
        rule!(TextEscaped, High, SimpleInline, inline::match_text_escaped, parse_text_escaped),
        // MED
        rule!(TextBolded, Med, SimpleInline, inline::match_text_bolded, parse_text_bolded),
        rule!(
            TextStrikethrough,
            Med,
            SimpleInline,
            inline::match_text_strikethrough,
            parse_text_strikethrough
        ),
        rule!(CodeInline, Med, SimpleInline, inline::match_code_inline, parse_code_inline),
        // LOW
        rule!(Link, Low, Inline, links::match_link, parse_link),
        rule!(RefLink, Low, Inline, links::match_ref_link, parse_ref_link),
        rule!(
            TextEmphasized,
            Low,
            SimpleInline,
            inline::match_text_emphasized,
            parse_text_emphasized
        ),
        rule!(TextMarked, Low, SimpleInline, inline::match_text_marked, parse_text_marked),
        rule!(NewlineCoalescer, Low, Block, blocks::match_newline, parse_newline),
        rule!(Paragraph, Low, Block, blocks::match_paragraph, parse_paragraph),
        // MIN
        rule!(Text, Min, Any, inline::match_text, parse_text),
    ]
}

/// Builds the sorted, filtered rule table for one parse call.
pub fn build_rules(options: &ParseOptions) -> Vec<Rule> {
    let mut rules: Vec<Rule> = all_rules()
        .into_iter()
        .filter(|rule| options.rule_enabled(rule.kind))
        .collect();
    rules.sort_by_key(|rule| (rule.priority, rule.kind));
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_by_band_then_kind() {
        let rules = build_rules(&ParseOptions::default());
        for pair in rules.windows(2) {
            assert!((pair[0].priority, pair[0].kind) < (pair[1].priority, pair[1].kind));
        }
        assert_eq!(rules.last().unwrap().kind, NodeKind::Text);
    }

    #[test]
    fn text_fallback_survives_every_filter() {
        let options = ParseOptions::builder()
            .enable_only([NodeKind::Paragraph])
            .build()
            .unwrap();
        let rules = build_rules(&options);
        assert!(rules.iter().any(|r| r.kind == NodeKind::Text));
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn scope_gates() {
        let block = Flags::default();
        let inline = Flags {
            inline: true,
            ..Flags::default()
        };
        let simple = Flags {
            simple: true,
            ..Flags::default()
        };
        assert!(Scope::Block.active(&block));
        assert!(!Scope::Block.active(&inline));
        assert!(Scope::Inline.active(&inline));
        assert!(!Scope::Inline.active(&simple));
        assert!(Scope::SimpleInline.active(&inline));
        assert!(Scope::SimpleInline.active(&simple));
        assert!(Scope::Any.active(&block) && Scope::Any.active(&simple));
    }
}
