//! Reference and footnote definitions.
//!
//! Resolution is two-phase: `collect_definitions` pre-scans the whole
//! document and fills the context's tables so forward references work,
//! then the registered MAX rules consume the definition lines during the
//! main pass without emitting nodes.
use crate::ast::Node;
use crate::options::ParseOptions;
use crate::parser::blocks::{fence_close, fence_open};
use crate::parser::context::{Context, FootnoteDef, RefDef};
use crate::parser::core::Parser;
use crate::parser::scan::{indent_width, is_blank, split_line};
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, space0, space1},
    combinator::{all_consuming, map, opt},
    sequence::{delimited, preceded, tuple},
    IResult,
};

const MAX_DEF_INDENT: usize = 3;

// ------------------------------------------------------- reference definitions

fn label(input: &str) -> IResult<&str, &str> {
    delimited(
        char('['),
        take_while1(|c| c != ']' && c != '\n'),
        char(']'),
    )(input)
}

fn target(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('<'), take_while(|c| c != '>' && c != '\n'), char('>')),
        take_while1(|c: char| !c.is_whitespace()),
    ))(input)
}

fn title(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while(|c| c != '"' && c != '\n'), char('"')),
        delimited(char('\''), take_while(|c| c != '\'' && c != '\n'), char('\'')),
        delimited(char('('), take_while(|c| c != ')' && c != '\n'), char(')')),
    ))(input)
}

/// Parses one `[label]: target "title"` line. Returns the normalized
/// label and the definition, or `None` when the line is something else.
pub(crate) fn ref_definition(line: &str) -> Option<(String, RefDef)> {
    if indent_width(line) > MAX_DEF_INDENT {
        return None;
    }
    let parsed: IResult<&str, (&str, &str, Option<&str>)> = all_consuming(map(
        tuple((
            space0,
            label,
            char(':'),
            space0,
            target,
            opt(preceded(space1, title)),
            space0,
        )),
        |(_, label, _, _, target, title, _)| (label, target, title),
    ))(line);
    match parsed {
        Ok((_, (label, target, title))) if !label.starts_with('^') => Some((
            Context::normalize_label(label),
            RefDef {
                target: target.to_string(),
                title: title.map(str::to_string),
            },
        )),
        _ => None,
    }
}

pub fn match_ref_definition(s: &str, ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    if !ctx.at_line_start() {
        return None;
    }
    let (line, _) = split_line(s);
    ref_definition(line)?;
    Some(line_len(s, line))
}

/// Definitions were collected before the main pass; consuming the line is
/// all that is left to do.
pub fn parse_ref_definition(_matched: &str, _parser: &mut Parser<'_>) -> Vec<Node> {
    Vec::new()
}

// -------------------------------------------------------- footnote definitions

/// Parses a footnote definition at the start of `s`: the marker line plus
/// indented continuation lines and blank-line-separated indented
/// paragraphs. Returns the identifier, the dedented body, and the consumed
/// byte length.
pub(crate) fn footnote_definition(s: &str) -> Option<(&str, String, usize)> {
    let (first, _) = split_line(s);
    let indent = indent_width(first);
    if indent > MAX_DEF_INDENT {
        return None;
    }
    let after = first[indent..].strip_prefix("[^")?;
    let close = after.find(']')?;
    let identifier = &after[..close];
    if identifier.is_empty() {
        return None;
    }
    let first_body = after[close + 1..].strip_prefix(':')?;

    let mut body = first_body.trim_start().to_string();
    let mut offset = line_len(s, first);
    let mut end = offset;
    let mut pending_blanks = 0usize;
    while offset < s.len() {
        let (line, _) = split_line(&s[offset..]);
        if is_blank(line) {
            pending_blanks += 1;
            offset += line_len(&s[offset..], line);
            continue;
        }
        let line_indent = indent_width(line);
        if line_indent < 2 {
            break;
        }
        for _ in 0..pending_blanks {
            body.push('\n');
        }
        pending_blanks = 0;
        body.push('\n');
        body.push_str(&line[line_indent.min(4)..]);
        offset += line_len(&s[offset..], line);
        end = offset;
    }
    Some((identifier, body, end))
}

pub fn match_footnote_definition(s: &str, ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    if !ctx.at_line_start() {
        return None;
    }
    footnote_definition(s).map(|(_, _, len)| len)
}

pub fn parse_footnote_definition(_matched: &str, _parser: &mut Parser<'_>) -> Vec<Node> {
    Vec::new()
}

// ------------------------------------------------------------ collection pass

/// Pre-pass over the whole (normalized) document: records every reference
/// and footnote definition so the main pass can resolve forward uses.
/// Fenced code and front matter are skipped, matching what the main pass
/// will consume as opaque regions.
pub fn collect_definitions(source: &str, ctx: &mut Context) {
    let mut offset = 0;

    if source.starts_with("---\n") {
        // Front matter: skip to the closing marker line.
        let mut scan = 4;
        while scan < source.len() {
            let (line, _) = split_line(&source[scan..]);
            scan += line_len(&source[scan..], line);
            if line.trim_end() == "---" {
                offset = scan;
                break;
            }
        }
    }

    let mut fence: Option<(u8, usize)> = None;
    while offset < source.len() {
        let (line, _) = split_line(&source[offset..]);
        if let Some((marker, open_len)) = fence {
            if fence_close(line, marker, open_len) {
                fence = None;
            }
            offset += line_len(&source[offset..], line);
            continue;
        }
        if let Some((marker, open_len, _)) = fence_open(line) {
            fence = Some((marker, open_len));
            offset += line_len(&source[offset..], line);
            continue;
        }
        if let Some((identifier, body, len)) = footnote_definition(&source[offset..]) {
            if !ctx.has_footnote(identifier) {
                ctx.footnotes.push(FootnoteDef {
                    identifier: identifier.to_string(),
                    body,
                });
            }
            offset += len.max(line_len(&source[offset..], line));
            continue;
        }
        if let Some((key, def)) = ref_definition(line) {
            ctx.refs.entry(key).or_insert(def);
        }
        offset += line_len(&source[offset..], line);
    }
}

fn line_len(source: &str, line: &str) -> usize {
    if source.len() > line.len() {
        line.len() + 1
    } else {
        line.len()
    }
}
