//! The default URL sanitizer applied to every link and image target.
//!
//! The policy: percent-decode the value (malformed sequences reject it),
//! strip every character that is not alphanumeric, `:` or `/` from the
//! decoded copy, then test the result against a case-insensitive scheme
//! blocklist. The original value is returned untouched when accepted, so
//! sanitization is idempotent.
use log::debug;

/// Sanitizes a URL, returning `None` when it must not reach a renderer.
pub fn sanitize_url(url: &str) -> Option<String> {
    let decoded = match percent_decode(url) {
        Some(decoded) => decoded,
        None => {
            debug!("rejecting URL with malformed percent-encoding: {url:?}");
            return None;
        }
    };

    // The scheme test runs on a stripped copy so obfuscations like
    // "java\tscript:" or "j&#97;vascript:" cannot smuggle a scheme past it.
    let stripped: String = decoded
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ':' || *c == '/')
        .collect();
    let lower = stripped.to_lowercase();

    if lower.starts_with("javascript:")
        || lower.starts_with("vbscript:")
        || (lower.starts_with("data:") && !lower.starts_with("data:image"))
    {
        debug!("rejecting URL with blocked scheme: {url:?}");
        return None;
    }
    Some(url.to_string())
}

/// Decodes percent escapes; returns `None` on malformed sequences or
/// invalid UTF-8 in the decoded bytes.
fn percent_decode(input: &str) -> Option<String> {
    if !input.contains('%') {
        return Some(input.to_string());
    }
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_digit(*bytes.get(i + 1)?)?;
            let lo = hex_digit(*bytes.get(i + 2)?)?;
            out.push(hi * 16 + lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_urls() {
        assert_eq!(
            sanitize_url("https://example.com/a?b=c"),
            Some("https://example.com/a?b=c".to_string())
        );
        assert_eq!(sanitize_url("/relative/path"), Some("/relative/path".to_string()));
        assert_eq!(sanitize_url("#anchor"), Some("#anchor".to_string()));
    }

    #[test]
    fn rejects_script_schemes() {
        assert_eq!(sanitize_url("javascript:alert(1)"), None);
        assert_eq!(sanitize_url("JaVaScRiPt:alert(1)"), None);
        assert_eq!(sanitize_url("vbscript:msgbox"), None);
    }

    #[test]
    fn rejects_obfuscated_schemes() {
        assert_eq!(sanitize_url("java\tscript:alert(1)"), None);
        assert_eq!(sanitize_url("%6A%61%76%61script:alert(1)"), None);
    }

    #[test]
    fn data_urls_only_allow_images() {
        assert_eq!(sanitize_url("data:text/html;base64,PGI+"), None);
        assert!(sanitize_url("data:image/png;base64,iVBOR").is_some());
    }

    #[test]
    fn malformed_percent_encoding_rejects_without_panicking() {
        assert_eq!(sanitize_url("%"), None);
        assert_eq!(sanitize_url("%2"), None);
        assert_eq!(sanitize_url("%zz"), None);
        assert_eq!(sanitize_url("%ff%fe"), None); // invalid UTF-8
    }

    #[test]
    fn sanitize_is_idempotent() {
        for url in ["https://a/b", "/x%20y", "mailto:a@b.c", "#f"] {
            let once = sanitize_url(url);
            let twice = once.as_deref().and_then(sanitize_url);
            assert_eq!(once, twice);
        }
    }
}
