//! Shared linear scanners.
//!
//! Every recursive construct here is tracked with an explicit depth
//! counter or run-length comparison instead of backtracking, so matching
//! cost stays linear in the scanned region. Open-ended scans over bracket
//! groups and tags are additionally capped so a flood of group openers
//! cannot turn repeated failed scans into quadratic work.

/// Upper bound on a single bracket-group or tag scan, in bytes.
const MAX_GROUP_SCAN: usize = 1024;

/// Length of the run of `ch` at the start of `s`.
pub fn run_len(s: &str, ch: u8) -> usize {
    s.bytes().take_while(|&b| b == ch).count()
}

/// True for a line of only spaces (line excludes its terminator).
pub fn is_blank(line: &str) -> bool {
    line.bytes().all(|b| b == b' ')
}

/// Number of leading spaces.
pub fn indent_width(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}

/// Splits off the first line (without terminator) and the rest (after it).
pub fn split_line(s: &str) -> (&str, &str) {
    match s.find('\n') {
        Some(pos) => (&s[..pos], &s[pos + 1..]),
        None => (s, ""),
    }
}

/// A scanned HTML tag at the start of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagScan<'a> {
    /// Tag name, as written.
    pub name: &'a str,
    /// Raw attribute region between the name and `>`.
    pub attrs: &'a str,
    /// Total byte length including both angle brackets.
    pub len: usize,
    /// True for `</tag>`.
    pub closing: bool,
    /// True for `<tag ... />`.
    pub self_closing: bool,
}

/// Scans a single HTML tag at the start of `s` (which must begin with
/// `<`). Quoted attribute values may contain `>`. Returns `None` for
/// anything that is not a well-formed tag within the scan cap.
pub fn scan_tag(s: &str) -> Option<TagScan<'_>> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }
    let mut i = 1;
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }
    let name_start = i;
    if !bytes.get(i).is_some_and(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    while bytes
        .get(i)
        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'-')
    {
        i += 1;
    }
    let name_end = i;

    let attrs_start = i;
    let mut quote: Option<u8> = None;
    let limit = s.len().min(name_end + MAX_GROUP_SCAN);
    while i < limit {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => {
                    let mut attrs_end = i;
                    let mut self_closing = false;
                    if attrs_end > attrs_start && bytes[attrs_end - 1] == b'/' {
                        self_closing = true;
                        attrs_end -= 1;
                    }
                    if closing && (self_closing || attrs_start != attrs_end) {
                        // A closing tag carries nothing but the name.
                        if !s[attrs_start..attrs_end].trim().is_empty() {
                            return None;
                        }
                    }
                    return Some(TagScan {
                        name: &s[name_start..name_end],
                        attrs: &s[attrs_start..attrs_end],
                        len: i + 1,
                        closing,
                        self_closing,
                    });
                }
                b'<' => return None,
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Where a delimiter span closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterClose {
    /// Byte offset in the scanned region where the content ends.
    pub content_end: usize,
    /// Byte offset just past the consumed closing run.
    pub resume: usize,
}

/// Searches `s` (the text after an opening run) for the run that closes a
/// formatting span of `delim` with opening length `open_len` (1 or 2).
///
/// The scan skips escaped characters, code spans (backtick runs suspend
/// delimiter recognition until the matching run), bracket-and-paren link
/// groups (explicit bracket depth), and raw HTML tag spans (explicit tag
/// depth). A blank line aborts the search: formatting never spans a block
/// break. For single-character delimiters the closing run is rejected when
/// it is adjacent to the same delimiter or runs into a word character,
/// which keeps `a_b_c_d` literal.
pub fn find_delimiter_close(s: &str, delim: u8, open_len: usize) -> Option<DelimiterClose> {
    let bytes = s.as_bytes();
    let mut tag_depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\\' => {
                i += 2;
                continue;
            }
            b'\n' if bytes.get(i + 1) == Some(&b'\n') => return None,
            b'`' => {
                let open = run_len(&s[i..], b'`');
                let close = find_backtick_close(&s[i + open..], open)?;
                i += open + close;
                continue;
            }
            b'[' if tag_depth == 0 => {
                match skip_bracket_group(&s[i..]) {
                    Some(skip) => {
                        i += skip;
                        continue;
                    }
                    None => {
                        i += 1;
                        continue;
                    }
                }
            }
            b'<' => {
                if let Some(tag) = scan_tag(&s[i..]) {
                    if tag.closing {
                        tag_depth = tag_depth.saturating_sub(1);
                    } else if !tag.self_closing {
                        tag_depth += 1;
                    }
                    i += tag.len;
                    continue;
                }
                i += 1;
                continue;
            }
            _ if b == delim && tag_depth == 0 => {
                let run = run_len(&s[i..], delim);
                if open_len == 1 {
                    // First unprotected run decides the match outcome.
                    if i == 0 || run > 1 {
                        return None;
                    }
                    let next = s[i + 1..].chars().next();
                    if next.is_some_and(|c| c.is_alphanumeric()) {
                        return None;
                    }
                    return Some(DelimiterClose {
                        content_end: i,
                        resume: i + 1,
                    });
                }
                if run >= open_len {
                    // Longer runs donate their leading delimiters to the
                    // content, closing with the final `open_len` characters.
                    let content_end = i + run - open_len;
                    if content_end == 0 {
                        return None;
                    }
                    return Some(DelimiterClose {
                        content_end,
                        resume: i + run,
                    });
                }
                i += run;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Finds the end of a code span opened by a run of `open_len` backticks.
/// Returns the offset just past the closing run, relative to the content
/// start. The closing run must have exactly the opening length.
pub fn find_backtick_close(s: &str, open_len: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let run = run_len(&s[i..], b'`');
            if run == open_len {
                return Some(i + run);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

/// Skips a complete `[...]` group, plus an immediately following `(...)`
/// group when present. Returns the total length, or `None` when no
/// matching bracket exists within the scan cap.
pub fn skip_bracket_group(s: &str) -> Option<usize> {
    let close = matching_bracket(s)?;
    let mut i = close + 1;
    if s.as_bytes().get(i) == Some(&b'(') {
        let paren = matching_paren(&s[i..])?;
        i += paren + 1;
    }
    Some(i)
}

/// Offset of the `]` matching the `[` at the start of `s`.
pub fn matching_bracket(s: &str) -> Option<usize> {
    matching_delim(s, b'[', b']')
}

/// Offset of the `)` matching the `(` at the start of `s`.
pub fn matching_paren(s: &str) -> Option<usize> {
    matching_delim(s, b'(', b')')
}

fn matching_delim(s: &str, open: u8, close: u8) -> Option<usize> {
    let bytes = s.as_bytes();
    debug_assert_eq!(bytes.first(), Some(&open));
    let mut depth = 0usize;
    let mut i = 0;
    let limit = s.len().min(MAX_GROUP_SCAN);
    while i < limit {
        let b = bytes[i];
        if b == b'\\' {
            i += 2;
            continue;
        }
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_scanning_handles_attributes_and_quotes() {
        let tag = scan_tag("<a href=\"x>y\" class='c'>rest").unwrap();
        assert_eq!(tag.name, "a");
        assert_eq!(tag.attrs, " href=\"x>y\" class='c'");
        assert!(!tag.closing);
        assert!(!tag.self_closing);
        assert_eq!(&"<a href=\"x>y\" class='c'>rest"[..tag.len], "<a href=\"x>y\" class='c'>");
    }

    #[test]
    fn tag_scanning_recognizes_closing_and_self_closing() {
        assert!(scan_tag("</div>").unwrap().closing);
        assert!(scan_tag("<br/>").unwrap().self_closing);
        assert!(scan_tag("<hr />").unwrap().self_closing);
        assert_eq!(scan_tag("<1bad>"), None);
        assert_eq!(scan_tag("< spaced>"), None);
        assert_eq!(scan_tag("<unclosed"), None);
    }

    #[test]
    fn delimiter_close_basic() {
        let close = find_delimiter_close("a*", b'*', 1).unwrap();
        assert_eq!(close.content_end, 1);
        assert_eq!(close.resume, 2);
    }

    #[test]
    fn single_char_close_rejects_word_adjacency() {
        // Content of `_b_c_d` as seen after an opening `_`.
        assert_eq!(find_delimiter_close("b_c_d", b'_', 1), None);
    }

    #[test]
    fn double_char_close_consumes_run_tail() {
        // `***x***` after the bold rule consumed `**`: content is `*x*`.
        let close = find_delimiter_close("*x***", b'*', 2).unwrap();
        assert_eq!(close.content_end, 3);
        assert_eq!(close.resume, 5);
    }

    #[test]
    fn code_spans_suspend_delimiters() {
        let close = find_delimiter_close("a `*` b*", b'*', 1).unwrap();
        assert_eq!(close.content_end, 7);
    }

    #[test]
    fn bracket_groups_are_skipped() {
        let close = find_delimiter_close("[x*](y*)z*", b'*', 1).unwrap();
        assert_eq!(close.content_end, 9);
    }

    #[test]
    fn html_tags_suspend_delimiters() {
        let close = find_delimiter_close("<b>*</b>*", b'*', 1).unwrap();
        assert_eq!(close.content_end, 8);
    }

    #[test]
    fn blank_line_aborts() {
        assert_eq!(find_delimiter_close("a\n\nb*", b'*', 1), None);
    }

    #[test]
    fn unterminated_code_span_aborts() {
        assert_eq!(find_delimiter_close("a `code*", b'*', 1), None);
    }

    #[test]
    fn bracket_matching_tracks_depth_and_escapes() {
        assert_eq!(matching_bracket("[a[b]c]"), Some(6));
        assert_eq!(matching_bracket("[a\\]b]"), Some(5));
        assert_eq!(matching_bracket("[never"), None);
    }
}
