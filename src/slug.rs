//! Default id generation for headings and footnotes.
use unicode_segmentation::UnicodeSegmentation;

/// Produces a URL-friendly id from arbitrary text.
///
/// Grapheme-aware so combining sequences are kept or dropped as a unit:
/// alphanumeric graphemes are lowercased and kept, whitespace becomes a
/// single hyphen, everything else is dropped.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for grapheme in text.graphemes(true) {
        let mut chars = grapheme.chars();
        let first = match chars.next() {
            Some(c) => c,
            None => continue,
        };
        if first.is_whitespace() {
            if !out.is_empty() {
                pending_hyphen = true;
            }
            continue;
        }
        if first.is_alphanumeric() || first == '-' || first == '_' {
            if pending_hyphen {
                out.push('-');
                pending_hyphen = false;
            }
            for c in grapheme.chars() {
                out.extend(c.to_lowercase());
            }
        }
    }
    out
}
