//! Character encoding detection and transcoding.
//!
//! A fetched body is decoded with the charset named by its `content-type`
//! header. When the document declares a different charset in a `meta` tag,
//! the declaration in the document wins.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

use crate::patterns::ENCODING_RE;

/// Match `<meta charset="...">` tag
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).expect("valid regex")
});

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">` tag
#[allow(clippy::expect_used)]
static CONTENT_TYPE_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#).expect("valid regex")
});

/// Encoding named by a `content-type` value such as `text/html; charset=latin1`.
///
/// Unknown labels yield `None`.
#[must_use]
pub fn encoding_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    let label = ENCODING_RE
        .captures(content_type)
        .and_then(|c| c.get(1))
        .map_or(content_type, |m| m.as_str());
    Encoding::for_label(label.trim().as_bytes())
}

/// Encoding declared inside the document, if any.
///
/// Only examines the first 1024 bytes for performance.
#[must_use]
pub fn declared_encoding(html: &[u8]) -> Option<&'static Encoding> {
    let head = &html[..html.len().min(1024)];
    let head_str = String::from_utf8_lossy(head);

    CONTENT_TYPE_CHARSET_RE
        .captures(&head_str)
        .or_else(|| CHARSET_META_RE.captures(&head_str))
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
}

/// Decode a response body to UTF-8.
///
/// The header charset is tried first (UTF-8 when absent or unknown); a
/// differing charset declared by the document itself takes precedence.
/// Invalid sequences become U+FFFD rather than errors.
#[must_use]
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let header = content_type
        .and_then(encoding_from_content_type)
        .unwrap_or(UTF_8);
    let encoding = match declared_encoding(body) {
        Some(declared) if declared != header => declared,
        _ => header,
    };

    if encoding == UTF_8 {
        return String::from_utf8_lossy(body).into_owned();
    }

    let (decoded, _encoding_used, _had_errors) = encoding.decode(body);
    decoded.into_owned()
}
