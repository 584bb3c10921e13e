//! Escaping for XML text and attribute values, and entity decoding.

use memchr::{memchr, memchr3};
use std::borrow::Cow;

/// Escapes a string for use as element text.
///
/// Only `&`, `<` and `>` are replaced; quotes are legal in text.
#[inline]
pub fn escape_text(s: &str) -> Cow<'_, str> {
    if memchr3(b'&', b'<', b'>', s.as_bytes()).is_none() {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    push_escaped(s, &mut out, false);
    Cow::Owned(out)
}

/// Escapes a string for use inside a double-quoted attribute value.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    if memchr3(b'&', b'<', b'>', bytes).is_none() && memchr::memchr2(b'"', b'\'', bytes).is_none() {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    push_escaped(s, &mut out, true);
    Cow::Owned(out)
}

fn push_escaped(s: &str, out: &mut String, quotes: bool) {
    let mut last = 0;
    for (i, b) in s.bytes().enumerate() {
        let entity = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' if quotes => "&quot;",
            b'\'' if quotes => "&apos;",
            _ => continue,
        };
        // `i` sits on an ASCII byte, so both slices end on char boundaries.
        out.push_str(&s[last..i]);
        out.push_str(entity);
        last = i + 1;
    }
    out.push_str(&s[last..]);
}

/// An entity reference that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnescapeError {
    /// The offending reference, as written.
    pub entity: String,
    /// Byte offset of the `&` in the input.
    pub position: usize,
}

impl std::fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid entity reference '{}' at offset {}", self.entity, self.position)
    }
}

impl std::error::Error for UnescapeError {}

/// Decodes the five predefined entities and numeric character references.
pub fn unescape(s: &str) -> Result<Cow<'_, str>, UnescapeError> {
    let Some(first) = memchr(b'&', s.as_bytes()) else {
        return Ok(Cow::Borrowed(s));
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut rest = &s[first..];
    let mut offset = first;

    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        out.push_str(&rest[..amp]);
        offset += amp;
        let tail = &rest[amp + 1..];
        let end = match memchr(b';', tail.as_bytes()) {
            Some(end) if end > 0 => end,
            _ => {
                return Err(UnescapeError {
                    entity: "&".to_string(),
                    position: offset,
                })
            }
        };
        let name = &tail[..end];
        match decode_named(name).or_else(|| decode_numeric(name)) {
            Some(c) => out.push(c),
            None => {
                return Err(UnescapeError {
                    entity: format!("&{};", name),
                    position: offset,
                })
            }
        }
        rest = &tail[end + 1..];
        offset += end + 2;
    }
    out.push_str(rest);

    Ok(Cow::Owned(out))
}

fn decode_named(name: &str) -> Option<char> {
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => return None,
    })
}

fn decode_numeric(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}
