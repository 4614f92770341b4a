//! Links, images, their reference forms, autolinks, and footnote
//! references.
//!
//! Every destination passes through the URL sanitizer; a rejected URL
//! leaves the node's `target` empty while its textual content survives.
//! Unresolvable references fall back to their own literal source text.
use crate::ast::Node;
use crate::options::ParseOptions;
use crate::parser::context::Context;
use crate::parser::core::Parser;
use crate::parser::scan::{matching_bracket, matching_paren};

/// Removes backslash escapes in front of punctuation.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek().is_some_and(|n| n.is_ascii_punctuation()) {
            continue;
        }
        out.push(c);
    }
    out
}

/// Splits a `(...)` interior into destination and optional title.
fn dest_and_title(region: &str) -> (String, Option<String>) {
    let trimmed = region.trim();
    let (dest, rest) = if let Some(wrapped) = trimmed.strip_prefix('<') {
        match wrapped.find('>') {
            Some(end) => (&wrapped[..end], &wrapped[end + 1..]),
            None => (trimmed, ""),
        }
    } else {
        let bytes = trimmed.as_bytes();
        let mut depth = 0usize;
        let mut split = trimmed.len();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 1,
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b' ' | b'\t' | b'\n' if depth == 0 => {
                    split = i;
                    break;
                }
                _ => {}
            }
            i += 1;
        }
        (&trimmed[..split], &trimmed[split.min(trimmed.len())..])
    };
    (unescape(dest), parse_title(rest.trim()))
}

/// A quoted title: `"t"`, `'t'`, or `(t)`.
fn parse_title(rest: &str) -> Option<String> {
    if rest.len() < 2 {
        return None;
    }
    let inner = match (rest.chars().next()?, rest.chars().last()?) {
        ('"', '"') | ('\'', '\'') => &rest[1..rest.len() - 1],
        ('(', ')') => &rest[1..rest.len() - 1],
        _ => return None,
    };
    Some(unescape(inner))
}

/// `[text](dest)` byte length, or `None`.
fn inline_form_len(s: &str) -> Option<(usize, usize)> {
    let bracket = matching_bracket(s)?;
    if s.as_bytes().get(bracket + 1) != Some(&b'(') {
        return None;
    }
    let paren = matching_paren(&s[bracket + 1..])?;
    Some((bracket, bracket + 1 + paren + 1))
}

// ----------------------------------------------------------------- plain links

pub fn match_link(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    if !s.starts_with('[') {
        return None;
    }
    let (_, len) = inline_form_len(s)?;
    Some(len)
}

pub fn parse_link(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let (bracket, _) = match inline_form_len(matched) {
        Some(bounds) => bounds,
        None => return vec![Node::text(matched)],
    };
    let text = &matched[1..bracket];
    let region = &matched[bracket + 2..matched.len() - 1];
    let (dest, title) = dest_and_title(region);
    let target = sanitize_target(&dest, parser.options);
    let children = parser.parse_simple(text);
    vec![Node::Link {
        target,
        title,
        children,
    }]
}

fn sanitize_target(dest: &str, options: &ParseOptions) -> Option<String> {
    let target = options.sanitize(dest);
    if target.is_none() && !dest.is_empty() {
        log::debug!("sanitizer rejected link target");
    }
    target
}

// --------------------------------------------------------------------- images

pub fn match_image(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    if !s.starts_with("![") {
        return None;
    }
    let (_, len) = inline_form_len(&s[1..])?;
    Some(1 + len)
}

pub fn parse_image(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let (bracket, _) = match inline_form_len(&matched[1..]) {
        Some(bounds) => bounds,
        None => return vec![Node::text(matched)],
    };
    let alt = unescape(&matched[2..1 + bracket]);
    let region = &matched[1 + bracket + 2..matched.len() - 1];
    let (dest, title) = dest_and_title(region);
    vec![Node::Image {
        target: sanitize_target(&dest, parser.options),
        alt: (!alt.is_empty()).then_some(alt),
        title,
    }]
}

// ---------------------------------------------------------------- ref variants

/// `[text][label]`, `[text][]`, or shortcut `[text]`. Returns the byte
/// length and the bracketed text/label bounds.
fn ref_form(s: &str) -> Option<(usize, usize, Option<(usize, usize)>)> {
    let bracket = matching_bracket(s)?;
    if s.as_bytes().get(bracket + 1) == Some(&b'[') {
        let label = matching_bracket(&s[bracket + 1..])?;
        let label_bounds = (bracket + 2, bracket + 1 + label);
        return Some((bracket + 1 + label + 1, bracket, Some(label_bounds)));
    }
    Some((bracket + 1, bracket, None))
}

pub fn match_ref_link(s: &str, ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    if !s.starts_with('[') {
        return None;
    }
    let (len, bracket, label) = ref_form(s)?;
    match label {
        Some(_) => Some(len),
        // The shortcut form only matches a known label, so stray bracketed
        // text stays plain.
        None => {
            ctx.lookup_ref(&s[1..bracket])?;
            Some(len)
        }
    }
}

pub fn parse_ref_link(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let (_, bracket, label) = match ref_form(matched) {
        Some(form) => form,
        None => return vec![Node::text(matched)],
    };
    let text = &matched[1..bracket];
    let label = match label {
        Some((start, end)) if start < end => &matched[start..end],
        _ => text,
    };
    match parser.ctx.lookup_ref(label).cloned() {
        Some(def) => {
            let target = sanitize_target(&def.target, parser.options);
            let children = parser.parse_simple(text);
            vec![Node::Link {
                target,
                title: def.title,
                children,
            }]
        }
        None => {
            log::debug!("unresolved link reference, keeping literal text");
            vec![Node::text(matched)]
        }
    }
}

pub fn match_ref_image(s: &str, ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    if !s.starts_with("![") {
        return None;
    }
    let (len, bracket, label) = ref_form(&s[1..])?;
    match label {
        Some(_) => Some(1 + len),
        None => {
            ctx.lookup_ref(&s[2..1 + bracket])?;
            Some(1 + len)
        }
    }
}

pub fn parse_ref_image(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let (_, bracket, label) = match ref_form(&matched[1..]) {
        Some(form) => form,
        None => return vec![Node::text(matched)],
    };
    let alt = &matched[2..1 + bracket];
    let label = match label {
        Some((start, end)) if start < end => &matched[1 + start..1 + end],
        _ => alt,
    };
    match parser.ctx.lookup_ref(label) {
        Some(def) => vec![Node::Image {
            target: sanitize_target(&def.target, parser.options),
            alt: (!alt.is_empty()).then(|| unescape(alt)),
            title: def.title.clone(),
        }],
        None => {
            log::debug!("unresolved image reference, keeping literal text");
            vec![Node::text(matched)]
        }
    }
}

// ------------------------------------------------------------------- autolinks

pub fn match_link_angle(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    if !s.starts_with('<') {
        return None;
    }
    let end = s.find('>')?;
    let inner = &s[1..end];
    if inner.is_empty() || inner.contains([' ', '<', '\n']) || !inner.contains(":/") {
        return None;
    }
    Some(end + 1)
}

pub fn parse_link_angle(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let inner = &matched[1..matched.len() - 1];
    vec![Node::Link {
        target: sanitize_target(inner, parser.options),
        title: None,
        children: vec![Node::text(inner)],
    }]
}

pub fn match_link_mailto(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    if !s.starts_with('<') {
        return None;
    }
    let end = s.find('>')?;
    let inner = &s[1..end];
    let addr = inner.strip_prefix("mailto:").unwrap_or(inner);
    if addr.is_empty() || addr.contains([' ', '<', '\n', '/']) || !addr.contains('@') {
        return None;
    }
    Some(end + 1)
}

pub fn parse_link_mailto(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let inner = &matched[1..matched.len() - 1];
    let addr = inner.strip_prefix("mailto:").unwrap_or(inner);
    vec![Node::Link {
        target: sanitize_target(&format!("mailto:{addr}"), parser.options),
        title: None,
        children: vec![Node::text(addr)],
    }]
}

/// Trailing punctuation that never belongs to a bare URL.
const URL_TRAIL: &[char] = &['.', ',', ';', ':', '!', '?', ')', '"', '\''];

pub fn match_link_bare_url(s: &str, ctx: &Context, options: &ParseOptions) -> Option<usize> {
    if options.disable_autolink || ctx.flags.in_anchor {
        return None;
    }
    let scheme_len = if s.len() >= 8 && s[..8].eq_ignore_ascii_case("https://") {
        8
    } else if s.len() >= 7 && s[..7].eq_ignore_ascii_case("http://") {
        7
    } else {
        return None;
    };
    let body_end = s
        .find(|c: char| c.is_whitespace() || c == '<' || c == '>')
        .unwrap_or(s.len());
    let url = s[..body_end].trim_end_matches(URL_TRAIL);
    if url.len() <= scheme_len {
        return None;
    }
    Some(url.len())
}

pub fn parse_link_bare_url(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    vec![Node::Link {
        target: sanitize_target(matched, parser.options),
        title: None,
        children: vec![Node::text(matched)],
    }]
}

// --------------------------------------------------------- footnote references

pub fn match_footnote_reference(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    if !s.starts_with("[^") {
        return None;
    }
    let end = s.find(']')?;
    let identifier = &s[2..end];
    if identifier.is_empty() || identifier.contains('\n') {
        return None;
    }
    Some(end + 1)
}

pub fn parse_footnote_reference(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let identifier = &matched[2..matched.len() - 1];
    if !parser.ctx.has_footnote(identifier) {
        log::debug!("unresolved footnote reference, keeping literal text");
        return vec![Node::text(matched)];
    }
    vec![Node::FootnoteReference {
        identifier: identifier.to_string(),
        display: identifier.to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::context::{FootnoteDef, RefDef};
    use crate::parser::core::Parser;

    fn ctx() -> Context {
        Context::new()
    }

    fn opts() -> ParseOptions {
        ParseOptions::default()
    }

    #[test]
    fn inline_link_with_title() {
        let options = opts();
        let mut parser = Parser::new(&options);
        let src = "[x](/url \"hi\")";
        assert_eq!(match_link(src, &ctx(), &options), Some(src.len()));
        assert_eq!(
            parse_link(src, &mut parser),
            vec![Node::Link {
                target: Some("/url".to_string()),
                title: Some("hi".to_string()),
                children: vec![Node::text("x")],
            }]
        );
    }

    #[test]
    fn angle_wrapped_destination_may_contain_spaces() {
        let options = opts();
        let mut parser = Parser::new(&options);
        let nodes = parse_link("[x](</my url>)", &mut parser);
        match &nodes[0] {
            Node::Link { target, .. } => assert_eq!(target.as_deref(), Some("/my url")),
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn sanitizer_rejection_empties_the_target() {
        let options = opts();
        let mut parser = Parser::new(&options);
        assert_eq!(
            parse_link("[x](javascript:alert(1))", &mut parser),
            vec![Node::Link {
                target: None,
                title: None,
                children: vec![Node::text("x")],
            }]
        );
    }

    #[test]
    fn nested_brackets_in_link_text() {
        let options = opts();
        let src = "[a [b] c](/u)";
        assert_eq!(match_link(src, &ctx(), &options), Some(src.len()));
    }

    #[test]
    fn image_carries_alt_and_title() {
        let options = opts();
        let mut parser = Parser::new(&options);
        assert_eq!(
            parse_image("![pic](/i.png 'cap')", &mut parser),
            vec![Node::Image {
                target: Some("/i.png".to_string()),
                alt: Some("pic".to_string()),
                title: Some("cap".to_string()),
            }]
        );
    }

    #[test]
    fn reference_link_resolves_or_falls_back() {
        let options = opts();
        let mut parser = Parser::new(&options);
        parser.ctx.refs.insert(
            "1".to_string(),
            RefDef {
                target: "/x".to_string(),
                title: None,
            },
        );
        let nodes = parse_ref_link("[a][1]", &mut parser);
        match &nodes[0] {
            Node::Link { target, .. } => assert_eq!(target.as_deref(), Some("/x")),
            other => panic!("expected link, got {other:?}"),
        }
        assert_eq!(
            parse_ref_link("[a][missing]", &mut parser),
            vec![Node::text("[a][missing]")]
        );
    }

    #[test]
    fn shortcut_reference_needs_a_known_label() {
        let options = opts();
        let mut ctx = Context::new();
        assert_eq!(match_ref_link("[plain]", &ctx, &options), None);
        ctx.refs.insert(
            "plain".to_string(),
            RefDef {
                target: "/p".to_string(),
                title: None,
            },
        );
        assert_eq!(match_ref_link("[plain]", &ctx, &options), Some(7));
    }

    #[test]
    fn autolink_variants() {
        let options = opts();
        assert_eq!(match_link_angle("<https://x/y>", &ctx(), &options), Some(13));
        assert_eq!(match_link_angle("<not a url>", &ctx(), &options), None);
        assert_eq!(match_link_mailto("<a@b.c>", &ctx(), &options), Some(7));
        assert_eq!(
            match_link_bare_url("https://x.dev/p, next", &ctx(), &options),
            Some("https://x.dev/p".len())
        );
        assert_eq!(match_link_bare_url("https://", &ctx(), &options), None);
    }

    #[test]
    fn bare_url_respects_the_disable_switch_and_anchors() {
        let disabled = ParseOptions::builder().disable_autolink(true).build().unwrap();
        assert_eq!(match_link_bare_url("https://x.dev", &ctx(), &disabled), None);
        let mut anchored = ctx();
        anchored.flags.in_anchor = true;
        assert_eq!(match_link_bare_url("https://x.dev", &anchored, &opts()), None);
    }

    #[test]
    fn footnote_reference_resolution() {
        let options = opts();
        let mut parser = Parser::new(&options);
        parser.ctx.footnotes.push(FootnoteDef {
            identifier: "n".to_string(),
            body: "note".to_string(),
        });
        assert_eq!(
            parse_footnote_reference("[^n]", &mut parser),
            vec![Node::FootnoteReference {
                identifier: "n".to_string(),
                display: "n".to_string(),
            }]
        );
        assert_eq!(
            parse_footnote_reference("[^ghost]", &mut parser),
            vec![Node::text("[^ghost]")]
        );
    }
}
