//! Line-oriented block rules: front matter, headings, blockquotes, code
//! blocks, thematic breaks, paragraphs and blank-line coalescing.
//!
//! All matchers here run in block scope, where the driver position is
//! always a line start. Each match consumes its trailing line terminator
//! except the paragraph, which leaves the separating newlines for the
//! coalescer.
use crate::ast::{plain_text, Node};
use crate::options::ParseOptions;
use crate::parser::context::Context;
use crate::parser::core::Parser;
use crate::parser::scan::{indent_width, is_blank, run_len, split_line};

/// Maximum indentation before a line stops being block syntax.
const MAX_BLOCK_INDENT: usize = 3;

/// Byte length of `line` plus its terminator within `source`.
fn line_span(source: &str, line: &str) -> usize {
    if source.len() > line.len() {
        line.len() + 1
    } else {
        line.len()
    }
}

// ---------------------------------------------------------------- front matter

pub fn match_front_matter(s: &str, ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    if !ctx.at_input_start() || !s.starts_with("---\n") {
        return None;
    }
    let mut offset = 4;
    while offset < s.len() {
        let (line, _) = split_line(&s[offset..]);
        let next = offset + line_span(&s[offset..], line);
        if line.trim_end() == "---" {
            return Some(next);
        }
        offset = next;
    }
    None
}

/// Front matter is metadata for outer tooling, not document content.
pub fn parse_front_matter(_matched: &str, _parser: &mut Parser<'_>) -> Vec<Node> {
    Vec::new()
}

// ------------------------------------------------------------------- headings

pub fn match_heading(s: &str, _ctx: &Context, options: &ParseOptions) -> Option<usize> {
    let indent = indent_width(s);
    if indent > MAX_BLOCK_INDENT {
        return None;
    }
    let after_indent = &s[indent..];
    let hashes = run_len(after_indent, b'#');
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &after_indent[hashes..];
    let line_done = rest.is_empty() || rest.starts_with('\n');
    if !line_done && !rest.starts_with(' ') && !rest.starts_with('\t') {
        if options.enforce_atx_headings {
            return None;
        }
        // Loose mode still refuses to misread an escaped or repeated
        // marker soup like `#######`.
        if rest.starts_with('#') {
            return None;
        }
    }
    let (line, _) = split_line(s);
    Some(line_span(s, line))
}

pub fn parse_heading(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let (line, _) = split_line(matched);
    let trimmed = line.trim_start_matches(' ');
    let level = run_len(trimmed, b'#').min(6) as u8;
    let body = trimmed[level as usize..]
        .trim_start_matches([' ', '\t'])
        .trim_end_matches(' ')
        .trim_end_matches('#')
        .trim_end();
    let children = parser.parse_inline(body);
    let id = parser.options.slug(&plain_text(&children));
    vec![Node::Heading {
        level,
        id,
        children,
    }]
}

pub fn match_heading_setext(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let (first, rest) = split_line(s);
    if rest.is_empty() || is_blank(first) || indent_width(first) > MAX_BLOCK_INDENT {
        return None;
    }
    // The text line must not itself look like an underline.
    if setext_level(first).is_some() {
        return None;
    }
    let (underline, _) = split_line(rest);
    setext_level(underline)?;
    Some(line_span(s, first) + line_span(rest, underline))
}

/// Recognizes an underline of `=` (level 1) or `-` (level 2), at least
/// three characters, nothing else on the line.
fn setext_level(line: &str) -> Option<u8> {
    let body = line.trim();
    if body.len() < 3 {
        return None;
    }
    if body.bytes().all(|b| b == b'=') {
        Some(1)
    } else if body.bytes().all(|b| b == b'-') {
        Some(2)
    } else {
        None
    }
}

pub fn parse_heading_setext(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let (first, rest) = split_line(matched);
    let (underline, _) = split_line(rest);
    let level = setext_level(underline).unwrap_or(1);
    let children = parser.parse_inline(first.trim());
    let id = parser.options.slug(&plain_text(&children));
    vec![Node::Heading {
        level,
        id,
        children,
    }]
}

// ------------------------------------------------------------- thematic break

pub fn match_break_thematic(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let (line, _) = split_line(s);
    if indent_width(line) > MAX_BLOCK_INDENT {
        return None;
    }
    let mut marker = 0u8;
    let mut count = 0;
    for b in line.bytes() {
        match b {
            b' ' => {}
            b'-' | b'*' | b'_' => {
                if marker == 0 {
                    marker = b;
                } else if marker != b {
                    return None;
                }
                count += 1;
            }
            _ => return None,
        }
    }
    if count < 3 {
        return None;
    }
    Some(line_span(s, line))
}

pub fn parse_break_thematic(_matched: &str, _parser: &mut Parser<'_>) -> Vec<Node> {
    vec![Node::BreakThematic]
}

// ------------------------------------------------------------------ blockquote

fn is_quote_line(line: &str) -> bool {
    indent_width(line) <= MAX_BLOCK_INDENT && line.trim_start_matches(' ').starts_with('>')
}

pub fn match_block_quote(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let (first, _) = split_line(s);
    if !is_quote_line(first) {
        return None;
    }
    let mut offset = 0;
    let mut started = false;
    while offset < s.len() {
        let (line, _) = split_line(&s[offset..]);
        if is_blank(line) {
            break;
        }
        // Lazy continuation: a non-blank line without `>` still belongs
        // to the quote.
        if started && !is_quote_line(line) && interrupts_paragraph(line) {
            break;
        }
        started = true;
        offset += line_span(&s[offset..], line);
    }
    Some(offset)
}

pub fn parse_block_quote(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let mut inner = String::with_capacity(matched.len());
    for line in matched.lines() {
        let stripped = line.trim_start_matches(' ');
        let stripped = stripped.strip_prefix('>').unwrap_or(stripped);
        inner.push_str(stripped.strip_prefix(' ').unwrap_or(stripped));
        inner.push('\n');
    }
    let mut alert = None;
    let (first, rest) = split_line(&inner);
    if let Some(label) = alert_label(first) {
        alert = Some(label.to_string());
        inner = rest.to_string();
    }
    let children = parser.parse_blocks(&inner);
    vec![Node::BlockQuote { alert, children }]
}

/// `[!NOTE]`-style alert label alone on the quote's first line.
fn alert_label(line: &str) -> Option<&str> {
    let body = line.trim();
    let label = body.strip_prefix("[!")?.strip_suffix(']')?;
    if label.is_empty() || label.contains(['[', ']']) {
        return None;
    }
    Some(label)
}

// ------------------------------------------------------------------ code blocks

pub(crate) fn fence_open(line: &str) -> Option<(u8, usize, &str)> {
    let indent = indent_width(line);
    if indent > MAX_BLOCK_INDENT {
        return None;
    }
    let body = &line[indent..];
    let marker = *body.as_bytes().first()?;
    if marker != b'`' && marker != b'~' {
        return None;
    }
    let run = run_len(body, marker);
    if run < 3 {
        return None;
    }
    let info = body[run..].trim();
    if marker == b'`' && info.contains('`') {
        return None;
    }
    Some((marker, run, info))
}

pub(crate) fn fence_close(line: &str, marker: u8, open_len: usize) -> bool {
    let body = line.trim();
    !body.is_empty() && body.bytes().all(|b| b == marker) && body.len() >= open_len
}

pub fn match_code_fenced(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let (first, _) = split_line(s);
    let (marker, open_len, _) = fence_open(first)?;
    let mut offset = line_span(s, first);
    while offset < s.len() {
        let (line, _) = split_line(&s[offset..]);
        offset += line_span(&s[offset..], line);
        if fence_close(line, marker, open_len) {
            return Some(offset);
        }
    }
    // An unterminated fence swallows the rest of the input as code.
    Some(s.len())
}

pub fn parse_code_fenced(matched: &str, _parser: &mut Parser<'_>) -> Vec<Node> {
    let (first, rest) = split_line(matched);
    let (marker, open_len, info) = match fence_open(first) {
        Some(open) => open,
        None => return vec![Node::text(matched)],
    };
    let (lang, attrs) = match info.split_once(' ') {
        Some((lang, attrs)) => (lang, attrs.trim()),
        None => (info, ""),
    };
    let mut text = String::with_capacity(rest.len());
    let mut remaining = rest;
    while !remaining.is_empty() {
        let (line, tail) = split_line(remaining);
        if fence_close(line, marker, open_len) {
            break;
        }
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(line);
        remaining = tail;
    }
    vec![Node::CodeBlock {
        lang: (!lang.is_empty()).then(|| lang.to_string()),
        attrs: (!attrs.is_empty()).then(|| attrs.to_string()),
        text,
    }]
}

pub fn match_code_indented(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let (first, _) = split_line(s);
    if is_blank(first) || indent_width(first) < 4 {
        return None;
    }
    let mut offset = 0;
    let mut end = 0;
    while offset < s.len() {
        let (line, _) = split_line(&s[offset..]);
        if is_blank(line) {
            // Blank lines join two indented chunks but never trail.
            offset += line_span(&s[offset..], line);
            continue;
        }
        if indent_width(line) < 4 {
            break;
        }
        offset += line_span(&s[offset..], line);
        end = offset;
    }
    Some(end)
}

pub fn parse_code_indented(matched: &str, _parser: &mut Parser<'_>) -> Vec<Node> {
    let mut text = String::with_capacity(matched.len());
    for (idx, line) in matched.lines().enumerate() {
        if idx > 0 {
            text.push('\n');
        }
        text.push_str(if line.len() >= 4 { &line[4..] } else { "" });
    }
    vec![Node::CodeBlock {
        lang: None,
        attrs: None,
        text,
    }]
}

// ------------------------------------------------------------------ paragraphs

/// True when a line opens a construct that cuts a paragraph short.
pub fn interrupts_paragraph(line: &str) -> bool {
    let indent = indent_width(line);
    if indent > MAX_BLOCK_INDENT {
        return false;
    }
    let body = &line[indent..];
    let bytes = body.as_bytes();
    match bytes.first() {
        Some(b'#') => {
            let run = run_len(body, b'#');
            run <= 6 && matches!(bytes.get(run), None | Some(b' ') | Some(b'\t'))
        }
        Some(b'>') => true,
        Some(b'`') => run_len(body, b'`') >= 3,
        Some(b'~') => run_len(body, b'~') >= 3,
        Some(b'-') | Some(b'*') | Some(b'+') => {
            bytes.get(1) == Some(&b' ') || setext_level(body).is_some() || {
                let mut marker = 0u8;
                let mut count = 0;
                for &b in bytes {
                    match b {
                        b' ' => {}
                        b'-' | b'*' | b'_' => {
                            if marker == 0 {
                                marker = b;
                            } else if marker != b {
                                return false;
                            }
                            count += 1;
                        }
                        _ => return false,
                    }
                }
                count >= 3
            }
        }
        Some(b) if b.is_ascii_digit() => {
            let digits = body.bytes().take_while(u8::is_ascii_digit).count();
            digits <= 9
                && matches!(bytes.get(digits), Some(b'.') | Some(b')'))
                && bytes.get(digits + 1) == Some(&b' ')
        }
        _ => false,
    }
}

pub fn match_paragraph(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let (first, _) = split_line(s);
    if is_blank(first) {
        return None;
    }
    let mut end = first.len();
    let mut offset = line_span(s, first);
    while offset < s.len() {
        let (line, _) = split_line(&s[offset..]);
        if is_blank(line) || interrupts_paragraph(line) {
            break;
        }
        offset += line_span(&s[offset..], line);
        end = offset.min(s.len());
        if !s[..end].ends_with('\n') {
            continue;
        }
        end -= 1;
    }
    Some(end)
}

pub fn parse_paragraph(matched: &str, parser: &mut Parser<'_>) -> Vec<Node> {
    let children = parser.parse_inline(matched.trim_end());
    vec![Node::Paragraph { children }]
}

// ------------------------------------------------------------------- newlines

/// Consumes the run of newlines and blank lines separating blocks. Spaces
/// are only eaten when the rest of their line is blank, so the indentation
/// of a following construct is preserved.
pub fn match_newline(s: &str, _ctx: &Context, _options: &ParseOptions) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'\n') {
        return None;
    }
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => i += 1,
            b' ' => {
                let run = run_len(&s[i..], b' ');
                match bytes.get(i + run) {
                    Some(b'\n') => i += run + 1,
                    None => {
                        i += run;
                        break;
                    }
                    _ => break,
                }
            }
            _ => break,
        }
    }
    Some(i)
}

pub fn parse_newline(_matched: &str, _parser: &mut Parser<'_>) -> Vec<Node> {
    Vec::new()
}
