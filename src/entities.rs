//! Character entity decoding for plain text runs.
//!
//! The built-in named table is deliberately small — the six references the
//! engine has always recognized — and callers extend it through
//! [`ParseOptions::named_codes`](crate::options::ParseOptions). Numeric
//! references (`&#35;` and `&#x41;`) are always decoded.
use std::collections::HashMap;

/// Looks up a built-in named character reference (without `&` and `;`).
pub fn builtin_named_code(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "apos" => Some('\''),
        "gt" => Some('>'),
        "lt" => Some('<'),
        "nbsp" => Some('\u{a0}'),
        "quot" => Some('"'),
        _ => None,
    }
}

/// Decodes character entities in `text`, consulting `extra` before the
/// built-in table. Unrecognized or malformed entities pass through
/// unchanged.
pub fn decode_entities(text: &str, extra: &HashMap<String, char>) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'&' {
            let ch_len = char_len(bytes[i]);
            out.push_str(&text[i..i + ch_len]);
            i += ch_len;
            continue;
        }
        match decode_one(&text[i..], extra) {
            Some((ch, len)) => {
                out.push(ch);
                i += len;
            }
            None => {
                out.push('&');
                i += 1;
            }
        }
    }
    out
}

/// Attempts to decode a single entity at the start of `s` (which begins
/// with `&`). Returns the character and the byte length consumed.
fn decode_one(s: &str, extra: &HashMap<String, char>) -> Option<(char, usize)> {
    let end = s[1..].find(';').map(|p| p + 1)?;
    if end == 1 || end > 32 {
        return None;
    }
    let body = &s[1..end];
    let consumed = end + 1;

    if let Some(rest) = body.strip_prefix('#') {
        let code = if let Some(hex) = rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            rest.parse::<u32>().ok()?
        };
        return char::from_u32(code).map(|ch| (ch, consumed));
    }

    if let Some(&ch) = extra.get(body) {
        return Some((ch, consumed));
    }
    builtin_named_code(body).map(|ch| (ch, consumed))
}

fn char_len(first_byte: u8) -> usize {
    match first_byte {
        b if b < 0x80 => 1,
        b if b >= 0xf0 => 4,
        b if b >= 0xe0 => 3,
        _ => 2,
    }
}
