//! Character-level rules: escapes, inline code, hard breaks, task markers,
//! delimiter formatting, and the plain-text fallback.
use crate::ast::{FormatStyle, Node};
use crate::entities::decode_entities;
use crate::options::ParseOptions;
use crate::parser::context::Context;
use crate::parser::core::Parser;
use crate::parser::scan::{find_backtick_close, find_delimiter_close, run_len};

// --------------------------------------------------------------------- escapes

pub fn match_text_escaped(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'\\') {
        return None;
    }
    match bytes.get(1) {
        Some(b) if b.is_ascii_punctuation() => Some(2),
        _ => None,
    }
}

pub fn parse_text_escaped(matched: &str, _parser: &mut Parser<'_>) -> Vec<Node> {
    vec![Node::text(&matched[1..])]
}

// ----------------------------------------------------------------- line breaks

pub fn match_break_line(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    if s.starts_with("\\\n") {
        return Some(2);
    }
    let spaces = run_len(s, b' ');
    if spaces >= 2 && s.as_bytes().get(spaces) == Some(&b'\n') {
        return Some(spaces + 1);
    }
    None
}

pub fn parse_break_line(_matched: &str, _parser: &mut Parser<'_>) -> Vec<Node> {
    vec![Node::BreakLine]
}

// ---------------------------------------------------------------- task markers

pub fn match_gfm_task(s: &str, ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    if !ctx.flags.in_list {
        return None;
    }
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'[') || bytes.get(2) != Some(&b']') {
        return None;
    }
    if !matches!(bytes.get(1), Some(b' ') | Some(b'x') | Some(b'X')) {
        return None;
    }
    match bytes.get(3) {
        Some(b' ') | Some(b'\n') | None => Some(3),
        _ => None,
    }
}

pub fn parse_gfm_task(matched: &str, _parser: &mut Parser<'_>) -> Vec<Node> {
    vec![Node::GfmTask {
        completed: matched.as_bytes().get(1) != Some(&b' '),
    }]
}

// ----------------------------------------------------------------- inline code

pub fn match_code_inline(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let open = run_len(s, b'`');
    if open == 0 {
        return None;
    }
    let close = find_backtick_close(&s[open..], open)?;
    Some(open + close)
}

pub fn parse_code_inline(matched: &str, _parser: &mut Parser<'_>) -> Vec<Node> {
    let open = run_len(matched, b'`');
    let inner = &matched[open..matched.len() - open];
    // One leading and trailing space are padding when both are present.
    let text = if inner.len() >= 2 && inner.starts_with(' ') && inner.ends_with(' ') {
        &inner[1..inner.len() - 1]
    } else {
        inner
    };
    vec![Node::CodeInline {
        text: text.to_string(),
    }]
}

// ------------------------------------------------------------------ formatting

fn match_double_delim(s: &str, delim: u8) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&delim) || bytes.get(1) != Some(&delim) {
        return None;
    }
    // A span never opens onto whitespace.
    if matches!(s[2..].chars().next(), None | Some(' ') | Some('\n')) {
        return None;
    }
    let close = find_delimiter_close(&s[2..], delim, 2)?;
    Some(2 + close.resume)
}

fn parse_double_delim(matched: &str, parser: &mut Parser<'_>, style: FormatStyle) -> Vec<Node> {
    let delim = matched.as_bytes()[0];
    let inner = match find_delimiter_close(&matched[2..], delim, 2) {
        Some(close) => &matched[2..2 + close.content_end],
        None => return vec![Node::text(matched)],
    };
    let children = parser.nested_parse(inner);
    vec![Node::TextFormatted { style, children }]
}

pub fn match_text_bolded(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    match_double_delim(s, b'*').or_else(|| match_double_delim(s, b'_'))
}

pub fn parse_text_bolded(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    parse_double_delim(matched, parser, FormatStyle::Bold)
}

pub fn match_text_strikethrough(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    match_double_delim(s, b'~')
}

pub fn parse_text_strikethrough(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    parse_double_delim(matched, parser, FormatStyle::Strikethrough)
}

pub fn match_text_marked(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    match_double_delim(s, b'=')
}

pub fn parse_text_marked(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    parse_double_delim(matched, parser, FormatStyle::Mark)
}

pub fn match_text_emphasized(s: &str, ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let delim = *s.as_bytes().first()?;
    if delim != b'*' && delim != b'_' {
        return None;
    }
    if run_len(s, delim) != 1 {
        return None;
    }
    if matches!(s[1..].chars().next(), None | Some(' ') | Some('\n')) {
        return None;
    }
    // `_` never opens mid-word, so snake_case stays literal.
    if delim == b'_' && ctx.last_consumed_char().is_some_and(char::is_alphanumeric) {
        return None;
    }
    let close = find_delimiter_close(&s[1..], delim, 1)?;
    Some(1 + close.resume)
}

pub fn parse_text_emphasized(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let delim = matched.as_bytes()[0];
    let inner = match find_delimiter_close(&matched[1..], delim, 1) {
        Some(close) => &matched[1..1 + close.content_end],
        None => return vec![Node::text(matched)],
    };
    let children = parser.nested_parse(inner);
    vec![Node::TextFormatted {
        style: FormatStyle::Italic,
        children,
    }]
}

// --------------------------------------------------------------- text fallback

/// Characters that hand control back to the rule table.
fn is_trigger(b: u8) -> bool {
    matches!(
        b,
        b'\n' | b'\\' | b'`' | b'*' | b'_' | b'~' | b'=' | b'[' | b'<' | b'!'
    )
}

/// Schemes the bare-URL rule can pick up mid-text.
fn is_autolink_scheme(word: &str) -> bool {
    word.eq_ignore_ascii_case("http") || word.eq_ignore_ascii_case("https")
}

/// Consumes plain text up to the next character another rule could claim.
/// Always consumes at least one character, which is the driver's progress
/// guarantee.
pub fn match_text(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let bytes = s.as_bytes();
    let first = *bytes.first()?;
    if is_trigger(first) {
        return Some(s.chars().next().map(char::len_utf8)?);
    }
    let mut word_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if is_trigger(b) {
            if b == b'\n' {
                // Leave a two-space hard break for its own rule.
                let spaces = s[..i].len() - s[..i].trim_end_matches(' ').len();
                if spaces >= 2 && i - spaces > 0 {
                    return Some(i - spaces);
                }
            }
            return Some(i);
        }
        if b == b':'
            && word_start > 0
            && is_autolink_scheme(&s[word_start..i])
            && !matches!(bytes.get(i + 1), None | Some(b' ') | Some(b'\n'))
        {
            // Stop before a scheme so the autolink rule sees it.
            return Some(word_start);
        }
        if !b.is_ascii_alphanumeric() {
            i += s[i..].chars().next().map(char::len_utf8).unwrap_or(1);
            word_start = i;
        } else {
            i += 1;
        }
    }
    Some(s.len())
}

pub fn parse_text(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    vec![Node::text(decode_entities(
        matched,
        &parser.options.named_codes,
    ))]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::core::Parser;

    fn ctx() -> Context {
        Context::new()
    }

    fn opts() -> ParseOptions {
        ParseOptions::default()
    }

    #[test]
    fn escape_consumes_punctuation_only() {
        assert_eq!(match_text_escaped("\\*x", &ctx(), &opts()), Some(2));
        assert_eq!(match_text_escaped("\\ax", &ctx(), &opts()), None);
        let options = opts();
        let mut parser = Parser::new(&options);
        assert_eq!(parse_text_escaped("\\*", &mut parser), vec![Node::text("*")]);
    }

    #[test]
    fn hard_break_forms() {
        assert_eq!(match_break_line("  \nx", &ctx(), &opts()), Some(3));
        assert_eq!(match_break_line("\\\nx", &ctx(), &opts()), Some(2));
        assert_eq!(match_break_line(" \nx", &ctx(), &opts()), None);
    }

    #[test]
    fn task_marker_needs_the_list_flag() {
        let options = opts();
        assert_eq!(match_gfm_task("[x] done", &ctx(), &options), None);
        let mut listed = ctx();
        listed.flags.in_list = true;
        assert_eq!(match_gfm_task("[x] done", &listed, &options), Some(3));
        assert_eq!(match_gfm_task("[ ] todo", &listed, &options), Some(3));
        assert_eq!(match_gfm_task("[y] no", &listed, &options), None);
    }

    #[test]
    fn inline_code_matches_run_lengths_exactly() {
        assert_eq!(match_code_inline("`a`", &ctx(), &opts()), Some(3));
        assert_eq!(match_code_inline("``a`b``x", &ctx(), &opts()), Some(7));
        assert_eq!(match_code_inline("`open", &ctx(), &opts()), None);
        let options = opts();
        let mut parser = Parser::new(&options);
        assert_eq!(
            parse_code_inline("`` `x` ``", &mut parser),
            vec![Node::CodeInline {
                text: "`x`".to_string()
            }]
        );
    }

    #[test]
    fn bold_and_nested_emphasis() {
        let options = opts();
        let mut parser = Parser::new(&options);
        parser.ctx.flags.inline = true;
        assert_eq!(match_text_bolded("**a**", &ctx(), &options), Some(5));
        let nodes = parse_text_bolded("***a***", &mut parser);
        match &nodes[0] {
            Node::TextFormatted { style, children } => {
                assert_eq!(*style, FormatStyle::Bold);
                assert_eq!(
                    children,
                    &vec![Node::TextFormatted {
                        style: FormatStyle::Italic,
                        children: vec![Node::text("a")],
                    }]
                );
            }
            other => panic!("expected bold, got {other:?}"),
        }
    }

    #[test]
    fn snake_case_stays_literal() {
        let options = opts();
        let mut consumed = ctx();
        consumed.push_consumed("a");
        assert_eq!(match_text_emphasized("_b_c_d", &consumed, &options), None);
    }

    #[test]
    fn emphasis_will_not_open_onto_whitespace() {
        assert_eq!(match_text_emphasized("* a*", &ctx(), &opts()), None);
        assert_eq!(match_text_bolded("** a**", &ctx(), &opts()), None);
    }

    #[test]
    fn text_stops_before_triggers_and_schemes() {
        assert_eq!(match_text("ab *c", &ctx(), &opts()), Some(3));
        assert_eq!(match_text("see https://x y", &ctx(), &opts()), Some(4));
        assert_eq!(match_text("*lead", &ctx(), &opts()), Some(1));
        assert_eq!(match_text("plain words", &ctx(), &opts()), Some(11));
    }

    #[test]
    fn text_leaves_two_space_breaks_alone() {
        assert_eq!(match_text("ab  \ncd", &ctx(), &opts()), Some(2));
    }

    #[test]
    fn text_decodes_entities() {
        let options = opts();
        let mut parser = Parser::new(&options);
        assert_eq!(
            parse_text("a &amp; b", &mut parser),
            vec![Node::text("a & b")]
        );
    }
}
