//! Ordered and unordered lists: two instantiations of one generic
//! algorithm.
//!
//! The marker must sit at a line start, checked against the consumed-text
//! lookbehind, and the rule fires either in block scope or while already
//! inside a list item — the dual gate that lets nested lists surface while
//! the outer item's content is parsed inline.
use crate::ast::Node;
use crate::options::ParseOptions;
use crate::parser::context::Context;
use crate::parser::core::Parser;
use crate::parser::scan::{indent_width, is_blank, split_line};

const MAX_MARKER_INDENT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marker {
    indent: usize,
    /// Column where the item's content begins.
    content_col: usize,
    /// Numeric value of an ordered marker.
    start: u32,
}

/// Recognizes a list marker line of the requested type.
fn marker_line(line: &str, ordered: bool) -> Option<Marker> {
    let indent = indent_width(line);
    if indent > MAX_MARKER_INDENT {
        return None;
    }
    let bytes = line.as_bytes();
    let (marker_end, start) = if ordered {
        let digits = line[indent..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 || digits > 9 {
            return None;
        }
        if !matches!(bytes.get(indent + digits), Some(b'.') | Some(b')')) {
            return None;
        }
        let start = line[indent..indent + digits].parse().ok()?;
        (indent + digits + 1, start)
    } else {
        if !matches!(bytes.get(indent), Some(b'-') | Some(b'*') | Some(b'+')) {
            return None;
        }
        (indent + 1, 1)
    };
    match bytes.get(marker_end) {
        Some(b' ') => {
            let spaces = indent_width(&line[marker_end..]);
            Some(Marker {
                indent,
                content_col: marker_end + spaces.min(4),
                start,
            })
        }
        // A bare marker is an empty item.
        None => Some(Marker {
            indent,
            content_col: marker_end,
            start,
        }),
        _ => None,
    }
}

fn match_list(s: &str, ctx: &Context, ordered: bool) -> Option<usize> {
    if !(ctx.flags.in_list || ctx.flags.is_block()) || !ctx.at_line_start() {
        return None;
    }
    let (first, _) = split_line(s);
    let head = marker_line(first, ordered)?;

    let mut offset = line_len(s, first);
    let mut end = offset;
    while offset < s.len() {
        let (line, _) = split_line(&s[offset..]);
        if is_blank(line) {
            offset += line_len(&s[offset..], line);
            continue;
        }
        let trailing_blank = end != offset;
        if let Some(next) = marker_line(line, ordered) {
            if next.indent <= head.indent {
                offset += line_len(&s[offset..], line);
                end = offset;
                continue;
            }
        }
        if marker_line(line, !ordered).is_some_and(|m| m.indent <= head.indent) {
            break;
        }
        if indent_width(line) > head.indent || !trailing_blank {
            // Indented continuation, or a lazy one directly under the item.
            offset += line_len(&s[offset..], line);
            end = offset;
            continue;
        }
        break;
    }
    Some(end)
}

fn line_len(source: &str, line: &str) -> usize {
    if source.len() > line.len() {
        line.len() + 1
    } else {
        line.len()
    }
}

pub fn match_ordered_list(s: &str, ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    match_list(s, ctx, true)
}

pub fn match_unordered_list(s: &str, ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    match_list(s, ctx, false)
}

/// One item's dedented source plus its looseness.
struct Item {
    content: String,
    loose: bool,
}

fn split_items(matched: &str, ordered: bool) -> (u32, Vec<Item>) {
    let (first, _) = split_line(matched);
    let head = match marker_line(first, ordered) {
        Some(head) => head,
        None => return (1, Vec::new()),
    };

    // Byte offsets of each item's marker line.
    let mut starts = vec![0usize];
    let mut offset = line_len(matched, first);
    while offset < matched.len() {
        let (line, _) = split_line(&matched[offset..]);
        if marker_line(line, ordered).is_some_and(|m| m.indent <= head.indent) {
            starts.push(offset);
        }
        offset += line_len(&matched[offset..], line);
    }
    starts.push(matched.len());

    let mut items = Vec::with_capacity(starts.len() - 1);
    for bounds in starts.windows(2) {
        let region = &matched[bounds[0]..bounds[1]];
        let (marker, rest) = split_line(region);
        let col = marker_line(marker, ordered)
            .map(|m| m.content_col)
            .unwrap_or(head.content_col);
        let mut content = String::with_capacity(region.len());
        content.push_str(&marker[col.min(marker.len())..]);
        content.push('\n');
        let mut remaining = rest;
        while !remaining.is_empty() {
            let (line, tail) = split_line(remaining);
            let strip = col.min(indent_width(line));
            content.push_str(&line[strip..]);
            content.push('\n');
            remaining = tail;
        }
        let loose = has_blank_line(&content);
        items.push(Item { content, loose });
    }

    // The last item inherits looseness from its predecessor when its own
    // content gives no signal.
    for idx in 1..items.len() {
        if idx == items.len() - 1 && !items[idx].loose {
            items[idx].loose = items[idx - 1].loose;
        }
    }

    (head.start, items)
}

/// Blank-line paragraph break inside one item's region: two newlines with
/// only spaces between them. A trailing separator blank counts, which is
/// what makes `a\n\nb` lists loose in both items.
fn has_blank_line(content: &str) -> bool {
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let mut j = i + 1;
            while bytes.get(j) == Some(&b' ') {
                j += 1;
            }
            if bytes.get(j) == Some(&b'\n') {
                return true;
            }
        }
        i += 1;
    }
    false
}

fn parse_list(matched: &str, parser: &mut Parser<'_>, ordered: bool) -> Vec<Node> {
    let (start, raw_items) = split_items(matched, ordered);
    let mut items = Vec::with_capacity(raw_items.len());
    let mut flags = parser.ctx.flags;
    flags.in_list = true;
    for item in raw_items {
        let children = if item.loose {
            let mut block = flags;
            block.inline = false;
            block.simple = false;
            parser.parse_scoped(&item.content, block)
        } else {
            let mut inline = flags;
            inline.inline = true;
            inline.simple = false;
            parser.parse_scoped(item.content.trim_end_matches('\n'), inline)
        };
        items.push(children);
    }
    if ordered {
        vec![Node::OrderedList { start, items }]
    } else {
        vec![Node::UnorderedList { items }]
    }
}

pub fn parse_ordered_list(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    parse_list(matched, parser, true)
}

pub fn parse_unordered_list(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    parse_list(matched, parser, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_ctx() -> Context {
        Context::new()
    }

    #[test]
    fn markers_of_both_types() {
        assert!(marker_line("- a", false).is_some());
        assert!(marker_line("* a", false).is_some());
        assert!(marker_line("+ a", false).is_some());
        assert_eq!(marker_line("-a", false), None);
        let m = marker_line("12. a", true).unwrap();
        assert_eq!(m.start, 12);
        assert_eq!(m.content_col, 4);
        assert_eq!(marker_line("12 a", true), None);
    }

    #[test]
    fn extent_covers_items_and_nested_content() {
        let options = ParseOptions::default();
        let src = "- a\n  - b\n- c\npara after\n\nnot list";
        let len = match_unordered_list(src, &block_ctx(), &options).unwrap();
        assert_eq!(&src[..len], "- a\n  - b\n- c\npara after\n");
    }

    #[test]
    fn extent_stops_at_other_marker_type() {
        let options = ParseOptions::default();
        let src = "- a\n1. b\n";
        let len = match_unordered_list(src, &block_ctx(), &options).unwrap();
        assert_eq!(&src[..len], "- a\n");
    }

    #[test]
    fn rejected_outside_block_scope_without_list_flag() {
        let options = ParseOptions::default();
        let mut ctx = Context::new();
        ctx.flags.inline = true;
        assert_eq!(match_unordered_list("- a\n", &ctx, &options), None);
        ctx.flags.in_list = true;
        assert!(match_unordered_list("- a\n", &ctx, &options).is_some());
    }

    #[test]
    fn ordered_start_is_taken_from_the_first_marker() {
        let options = ParseOptions::default();
        let mut parser = Parser::new(&options);
        let nodes = parse_ordered_list("2. a\n3. b\n", &mut parser);
        match &nodes[0] {
            Node::OrderedList { start, items } => {
                assert_eq!(*start, 2);
                assert_eq!(items.len(), 2);
            }
            other => panic!("expected ordered list, got {other:?}"),
        }
    }

    #[test]
    fn loose_items_wrap_paragraphs_tight_items_stay_inline() {
        let options = ParseOptions::default();
        let mut parser = Parser::new(&options);
        let nodes = parse_unordered_list("- a\n\n- b\n", &mut parser);
        match &nodes[0] {
            Node::UnorderedList { items } => {
                assert!(matches!(items[0][0], Node::Paragraph { .. }));
                assert!(matches!(items[1][0], Node::Paragraph { .. }));
            }
            other => panic!("expected unordered list, got {other:?}"),
        }

        let nodes = parse_unordered_list("- a\n- b\n", &mut parser);
        match &nodes[0] {
            Node::UnorderedList { items } => {
                assert_eq!(items[0], vec![Node::text("a")]);
            }
            other => panic!("expected unordered list, got {other:?}"),
        }
    }

    #[test]
    fn nested_list_lands_inside_the_parent_item() {
        let options = ParseOptions::default();
        let mut parser = Parser::new(&options);
        let nodes = parse_unordered_list("- a\n  - b\n- c\n", &mut parser);
        match &nodes[0] {
            Node::UnorderedList { items } => {
                assert_eq!(items.len(), 2);
                assert!(items[0]
                    .iter()
                    .any(|n| matches!(n, Node::UnorderedList { .. })));
                assert_eq!(items[1], vec![Node::text("c")]);
            }
            other => panic!("expected unordered list, got {other:?}"),
        }
    }
}
