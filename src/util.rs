//! Utility functions shared by the codecs.

use std::borrow::Cow;

use quick_xml::escape::resolve_html5_entity;

/// Get current time as microseconds since the Unix epoch.
pub fn time_now_micros() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from a `charset=` declaration)
/// 3. Falls back to Windows-1252 (common in old browser exports)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the charset named by an HTML content-type declaration.
///
/// Scans the first kilobyte for `charset=` and returns the token after it,
/// e.g. `windows-1252` from
/// `<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=windows-1252">`.
pub fn extract_html_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];

    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let after = &prefix[pos + 8..];
    let after = after.strip_prefix(b"\"").unwrap_or(after);

    let end = after
        .iter()
        .position(|&b| !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_'))
        .unwrap_or(after.len());
    if end == 0 {
        return None;
    }

    std::str::from_utf8(&after[..end]).ok()
}

/// Escape text for use in XML/HTML content and double-quoted attributes.
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Longest reference body looked at between `&` and `;`.
const MAX_REFERENCE_LEN: usize = 40;

/// Resolve HTML character references (named and numeric).
///
/// Bare ampersands and unknown entities are common in hand-edited bookmark
/// files. Each one stays literal while the references around it still
/// resolve.
pub fn unescape_html(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut result = String::with_capacity(raw.len());
    let mut pos = 0;
    for amp in memchr::memchr_iter(b'&', raw.as_bytes()) {
        if amp < pos {
            continue;
        }
        result.push_str(&raw[pos..amp]);
        pos = amp;
        if let Some(len) = push_reference(&mut result, &raw[amp + 1..]) {
            pos = amp + 1 + len;
        }
    }
    result.push_str(&raw[pos..]);
    Cow::Owned(result)
}

/// Resolve the reference at the start of `rest` (just past its `&`) into
/// `out`. Returns the bytes consumed, including the `;`.
fn push_reference(out: &mut String, rest: &str) -> Option<usize> {
    let end = rest
        .bytes()
        .take(MAX_REFERENCE_LEN)
        .position(|b| b == b';')?;
    let name = &rest[..end];
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => u32::from_str_radix(hex, 16).ok()?,
            None if num.bytes().all(|b| b.is_ascii_digit()) => num.parse().ok()?,
            _ => return None,
        };
        out.push(char::from_u32(code)?);
    } else {
        out.push_str(resolve_html5_entity(name)?);
    }
    Some(end + 1)
}
