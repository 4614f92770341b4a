//! Streaming-mode truncation.
//!
//! When input is a partially received document, a trailing incomplete
//! construct would parse as literal text for one frame and then reparse as
//! its real node once the rest arrives. Truncating it up front keeps
//! partial syntax from flickering. The recognized cases are the contract:
//! an unterminated fence or tag, an unterminated code span or delimiter
//! run, a header-only table, and a lone trailing list marker.
use crate::parser::scan::{find_backtick_close, find_delimiter_close, is_blank, run_len, split_line};

/// Returns the prefix of `source` that is safe to parse now.
pub fn truncate_incomplete(source: &str) -> &str {
    let mut cut = source.len();
    if let Some(fence_cut) = unterminated_fence(source) {
        cut = cut.min(fence_cut);
    }

    let tail_start = tail_start(&source[..cut]);
    let tail = &source[tail_start..cut];
    if let Some(rel) = unterminated_tag(tail)
        .into_iter()
        .chain(unterminated_code_span(tail))
        .chain(unterminated_delimiter(tail))
        .min()
    {
        cut = cut.min(tail_start + rel);
    }
    if header_only_table(&source[tail_start..cut]) {
        cut = tail_start;
    }
    if let Some(rel) = lone_list_marker(&source[..cut]) {
        cut = rel;
    }
    &source[..cut]
}

/// Start of the segment after the last blank line.
fn tail_start(source: &str) -> usize {
    let mut start = 0;
    let mut offset = 0;
    while offset < source.len() {
        let (line, _) = split_line(&source[offset..]);
        offset += if source[offset..].len() > line.len() {
            line.len() + 1
        } else {
            line.len()
        };
        if is_blank(line) {
            start = offset;
        }
    }
    start
}

/// Cut position of a fence that never closes, anywhere in the input.
fn unterminated_fence(source: &str) -> Option<usize> {
    let mut open: Option<(usize, u8, usize)> = None;
    let mut offset = 0;
    while offset < source.len() {
        let (line, _) = split_line(&source[offset..]);
        let span = if source[offset..].len() > line.len() {
            line.len() + 1
        } else {
            line.len()
        };
        match open {
            Some((_, marker, open_len)) => {
                if crate::parser::blocks::fence_close(line, marker, open_len) {
                    open = None;
                }
            }
            None => {
                if let Some((marker, open_len, _)) = crate::parser::blocks::fence_open(line) {
                    open = Some((offset, marker, open_len));
                }
            }
        }
        offset += span;
    }
    open.map(|(start, _, _)| start)
}

/// A `<` in the tail with no `>` after it.
fn unterminated_tag(tail: &str) -> Option<usize> {
    let open = tail.rfind('<')?;
    if tail[open..].contains('>') {
        return None;
    }
    Some(open)
}

/// A backtick run in the tail with no matching close.
fn unterminated_code_span(tail: &str) -> Option<usize> {
    let bytes = tail.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == b'`' {
            let open = run_len(&tail[i..], b'`');
            match find_backtick_close(&tail[i + open..], open) {
                Some(close) => i += open + close,
                None => return Some(i),
            }
            continue;
        }
        i += 1;
    }
    None
}

const DELIMS: &[u8] = &[b'*', b'_', b'~', b'='];

/// An opening delimiter run in the tail that never closes.
fn unterminated_delimiter(tail: &str) -> Option<usize> {
    let bytes = tail.as_bytes();
    let mut i = 0;
    let mut prev_space = true;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            i += 2;
            prev_space = false;
            continue;
        }
        if DELIMS.contains(&b) && prev_space {
            let run = run_len(&tail[i..], b).min(2);
            let rest = &tail[i + run..];
            if !rest.starts_with(' ') && find_delimiter_close(rest, b, run).is_none() {
                return Some(i);
            }
        }
        prev_space = b == b' ' || b == b'\n';
        i += 1;
    }
    None
}

/// The tail is exactly a table header plus separator, with no data row yet.
fn header_only_table(tail: &str) -> bool {
    let mut lines = tail.lines().filter(|line| !is_blank(line));
    let (header, separator) = match (lines.next(), lines.next()) {
        (Some(header), Some(separator)) => (header, separator),
        _ => return false,
    };
    if lines.next().is_some() || !header.contains('|') {
        return false;
    }
    separator
        .trim()
        .bytes()
        .all(|b| matches!(b, b'-' | b':' | b'|' | b' '))
        && separator.contains('-')
}

/// A final line holding nothing but a list marker.
fn lone_list_marker(source: &str) -> Option<usize> {
    let last_start = source.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let line = source[last_start..].trim_end();
    let lone = match line.trim_start() {
        "-" | "*" | "+" => true,
        other => {
            let digits = other.bytes().take_while(u8::is_ascii_digit).count();
            digits > 0 && (other.len() == digits + 1)
                && matches!(other.as_bytes().get(digits), Some(b'.') | Some(b')'))
        }
    };
    lone.then_some(last_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_input_passes_through() {
        let src = "# done\n\nfull *para* here.\n";
        assert_eq!(truncate_incomplete(src), src);
    }

    #[test]
    fn unterminated_fence_is_cut_from_its_opening() {
        assert_eq!(truncate_incomplete("before\n\n```rust\nfn par"), "before\n\n");
    }

    #[test]
    fn unterminated_tag_is_cut() {
        assert_eq!(truncate_incomplete("text <div cla"), "text ");
        assert_eq!(truncate_incomplete("text <b>x</b>"), "text <b>x</b>");
    }

    #[test]
    fn unterminated_code_span_is_cut() {
        assert_eq!(truncate_incomplete("read `par"), "read ");
        assert_eq!(truncate_incomplete("read `code`"), "read `code`");
    }

    #[test]
    fn unterminated_emphasis_run_is_cut() {
        assert_eq!(truncate_incomplete("some **bol"), "some ");
        assert_eq!(truncate_incomplete("some **bold**"), "some **bold**");
    }

    #[test]
    fn header_only_table_is_cut() {
        assert_eq!(truncate_incomplete("done\n\n| a | b |\n|---|---|\n"), "done\n\n");
        let with_row = "| a |\n|---|\n| 1 |\n";
        assert_eq!(truncate_incomplete(with_row), with_row);
    }

    #[test]
    fn lone_trailing_list_marker_is_cut() {
        assert_eq!(truncate_incomplete("- a\n- b\n- "), "- a\n- b\n");
        assert_eq!(truncate_incomplete("- a\n- b\n1."), "- a\n- b\n");
        assert_eq!(truncate_incomplete("- a\n- full"), "- a\n- full");
    }
}
