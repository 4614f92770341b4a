//! Raw HTML rules: paired blocks, self-closing elements, and comments.
//!
//! End tags are found with an explicit same-name depth counter, never by
//! backtracking. Unclosed HTML never fails the parse — the stray `<` falls
//! through to the plain-text rule.
use crate::ast::{Attribute, Node};
use crate::options::ParseOptions;
use crate::parser::context::Context;
use crate::parser::core::Parser;
use crate::parser::scan::{scan_tag, split_line};
use crate::parser::blocks::interrupts_paragraph;

/// Elements whose content is never re-parsed as markdown.
const VERBATIM_TAGS: &[&str] = &["pre", "script", "style", "textarea"];

/// Elements that never take a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Deny list for the tag filter, per the GFM tagfilter extension.
const FILTERED_TAGS: &[&str] = &[
    "title", "textarea", "style", "xmp", "iframe", "noembed", "noframes", "script", "plaintext",
];

fn is_void(name: &str) -> bool {
    VOID_TAGS.iter().any(|t| name.eq_ignore_ascii_case(t))
}

fn is_verbatim(name: &str) -> bool {
    VERBATIM_TAGS.iter().any(|t| name.eq_ignore_ascii_case(t))
}

fn is_filtered(name: &str) -> bool {
    FILTERED_TAGS.iter().any(|t| name.eq_ignore_ascii_case(t))
}

// -------------------------------------------------------------------- comments

pub fn match_html_comment(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    if !s.starts_with("<!--") {
        return None;
    }
    s.find("-->").map(|end| end + 3)
}

pub fn parse_html_comment(matched: &str, _parser: &mut Parser<'_>) -> Vec<Node> {
    let text = matched
        .strip_prefix("<!--")
        .and_then(|rest| rest.strip_suffix("-->"))
        .unwrap_or("");
    vec![Node::HtmlComment {
        text: text.to_string(),
    }]
}

// ---------------------------------------------------------------- paired blocks

/// Finds the matching close tag for `name`, starting after the open tag.
/// Returns `(inner_end, total_end)` offsets relative to `s`.
fn find_close(s: &str, name: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut i = from;
    let bytes = s.as_bytes();
    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        match scan_tag(&s[i..]) {
            Some(tag) if tag.name.eq_ignore_ascii_case(name) => {
                if tag.closing {
                    depth -= 1;
                    if depth == 0 {
                        return Some((i, i + tag.len));
                    }
                } else if !tag.self_closing {
                    depth += 1;
                }
                i += tag.len;
            }
            Some(tag) => i += tag.len,
            None => i += 1,
        }
    }
    None
}

pub fn match_html_block(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let tag = scan_tag(s)?;
    if tag.closing || tag.self_closing || is_void(tag.name) {
        return None;
    }
    let (_, total) = find_close(s, tag.name, tag.len)?;
    Some(total)
}

pub fn parse_html_block(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let tag = match scan_tag(matched) {
        Some(tag) => tag,
        None => return vec![Node::text(matched)],
    };
    if parser.options.tagfilter && is_filtered(tag.name) {
        log::debug!("tag filter demoted <{}> to text", tag.name);
        return vec![Node::text(matched)];
    }
    let (inner_end, _) = match find_close(matched, tag.name, tag.len) {
        Some(bounds) => bounds,
        None => return vec![Node::text(matched)],
    };
    let inner = &matched[tag.len..inner_end];
    let attrs = parse_attributes(tag.attrs, parser.options);

    if is_verbatim(tag.name) {
        return vec![Node::HtmlBlock {
            tag: tag.name.to_string(),
            attrs,
            children: Vec::new(),
            raw_text: Some(inner.to_string()),
            verbatim: true,
        }];
    }

    let trimmed = inner.trim_matches(['\n', ' ']);
    let children = if looks_block(trimmed) {
        parser.parse_blocks(trimmed)
    } else {
        parser.parse_inline(trimmed)
    };
    vec![Node::HtmlBlock {
        tag: tag.name.to_string(),
        attrs,
        children,
        raw_text: None,
        verbatim: false,
    }]
}

/// Inner HTML content is parsed as blocks when it carries block syntax.
fn looks_block(inner: &str) -> bool {
    if inner.contains("\n\n") {
        return true;
    }
    let mut rest = inner;
    while !rest.is_empty() {
        let (line, tail) = split_line(rest);
        if interrupts_paragraph(line) {
            return true;
        }
        rest = tail;
    }
    false
}

// ------------------------------------------------------------- self-closing

pub fn match_html_self_closing(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let tag = scan_tag(s)?;
    if tag.closing || !(tag.self_closing || is_void(tag.name)) {
        return None;
    }
    Some(tag.len)
}

pub fn parse_html_self_closing(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let tag = match scan_tag(matched) {
        Some(tag) => tag,
        None => return vec![Node::text(matched)],
    };
    if parser.options.tagfilter && is_filtered(tag.name) {
        log::debug!("tag filter demoted <{}> to text", tag.name);
        return vec![Node::text(matched)];
    }
    vec![Node::HtmlSelfClosing {
        tag: tag.name.to_string(),
        attrs: parse_attributes(tag.attrs, parser.options),
    }]
}

// ------------------------------------------------------------------ attributes

/// Parses a raw attribute region into name/value pairs. `href` and `src`
/// values pass through the URL sanitizer; rejected values drop the whole
/// attribute.
fn parse_attributes(raw: &str, options: &ParseOptions) -> Vec<Attribute> {
    let bytes = raw.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() || bytes[i] == b'/' {
            i += 1;
            continue;
        }
        let name_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            i += 1;
        }
        let name = &raw[name_start..i];
        let mut value = String::new();
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            match bytes.get(i) {
                Some(&q) if q == b'"' || q == b'\'' => {
                    i += 1;
                    let value_start = i;
                    while i < bytes.len() && bytes[i] != q {
                        i += 1;
                    }
                    value = raw[value_start..i].to_string();
                    i = (i + 1).min(bytes.len());
                }
                _ => {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    value = raw[value_start..i].to_string();
                }
            }
        }
        if name.is_empty() {
            continue;
        }
        if name.eq_ignore_ascii_case("href") || name.eq_ignore_ascii_case("src") {
            match options.sanitize(&value) {
                Some(clean) => attrs.push(Attribute::new(name, clean)),
                None => log::debug!("dropped unsafe {name} attribute"),
            }
            continue;
        }
        attrs.push(Attribute::new(name, value));
    }
    attrs
}
