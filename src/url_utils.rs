//! URL Utility Functions
//!
//! Validation, resolution and comparison helpers used when rewriting links,
//! picking a rule set by host, and following pagination.

use url::Url;

use crate::patterns::{HAS_ALPHA_RE, IS_ALPHA_RE, PAGE_IN_HREF_RE};

/// Check if a string is a valid absolute http(s) URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - Whether URL is absolute and the parsed URL if valid
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if s.is_empty() {
        return (false, None);
    }

    // Must start with http:// or https://
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) if url.host().is_some() => (true, Some(url)),
        _ => (false, None),
    }
}

/// Parse a URL string into a Url object.
///
/// # Returns
/// * `Some(Url)` if valid absolute URL, `None` otherwise
#[must_use]
pub fn parse_url(url_str: &str) -> Option<Url> {
    is_absolute_url(url_str).1
}

/// Convert a relative or absolute URL to absolute form.
///
/// # Returns
/// * The absolute URL string, or the original if resolution fails
#[must_use]
pub fn create_absolute_url(url_str: &str, base: &Url) -> String {
    let url_str = url_str.trim();

    if url_str.is_empty() {
        return String::new();
    }

    // Preserve special URLs unchanged
    if url_str.starts_with("data:")
        || url_str.starts_with("javascript:")
        || url_str.starts_with("mailto:")
        || url_str.starts_with("tel:")
    {
        return url_str.to_string();
    }

    match base.join(url_str) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => url_str.to_string(),
    }
}

/// Resolve every candidate of a `srcset` value, keeping width and density
/// descriptors and dropping duplicates.
#[must_use]
pub fn absolutize_srcset(srcset: &str, base: &Url) -> String {
    let mut out: Vec<String> = Vec::new();
    for candidate in srcset.split(',') {
        let mut parts = candidate.split_whitespace();
        let Some(src) = parts.next() else {
            continue;
        };
        let mut resolved = create_absolute_url(src, base);
        for descriptor in parts {
            resolved.push(' ');
            resolved.push_str(descriptor);
        }
        if !out.contains(&resolved) {
            out.push(resolved);
        }
    }
    out.join(", ")
}

/// Extract the hostname (domain) from a URL.
///
/// # Returns
/// * The hostname, or empty string if invalid
#[must_use]
pub fn get_domain_url(url_str: &str) -> String {
    parse_url(url_str)
        .and_then(|url| url.host_str().map(std::string::ToString::to_string))
        .unwrap_or_default()
}

/// The last two labels of a hostname (`www.example.co` -> `example.co`).
#[must_use]
pub fn base_domain(hostname: &str) -> String {
    let labels: Vec<&str> = hostname.split('.').collect();
    let start = labels.len().saturating_sub(2);
    labels[start..].join(".")
}

/// Drop the fragment and any trailing slash.
#[must_use]
pub fn remove_anchor(url_str: &str) -> String {
    let without_fragment = url_str.split('#').next().unwrap_or_default();
    without_fragment
        .strip_suffix('/')
        .unwrap_or(without_fragment)
        .to_string()
}

/// Check if two URLs point to the same page (ignoring fragments).
#[must_use]
pub fn urls_match(url1: &str, url2: &str) -> bool {
    remove_anchor(url1) == remove_anchor(url2)
}

fn is_good_segment(segment: &str, index: usize, first_segment_has_letters: bool) -> bool {
    // "index" as the final path segment says nothing about the article
    if index == 0 && segment.eq_ignore_ascii_case("index") {
        return false;
    }
    // Short, letter-free trailing segments look like page numbers
    if index < 2 && segment.chars().count() < 3 && !first_segment_has_letters {
        return false;
    }
    true
}

/// The article URL with pagination data removed from its path.
///
/// Used to decide whether a candidate next-page link belongs to the same
/// article: `https://x.com/story/2` reduces to `https://x.com/story`.
#[must_use]
pub fn article_base_url(url_str: &str) -> String {
    let Some(parsed) = parse_url(url_str) else {
        return remove_anchor(url_str);
    };
    let host = parsed.host_str().unwrap_or_default();
    let port = parsed.port().map(|p| format!(":{p}")).unwrap_or_default();

    let mut first_segment_has_letters = false;
    let mut cleaned: Vec<String> = Vec::new();
    for (index, raw) in parsed.path().split('/').rev().enumerate() {
        let mut segment = raw.to_string();

        // Split off anything that looks like a file extension
        if let Some((stem, ext)) = raw.split_once('.') {
            if IS_ALPHA_RE.is_match(ext) {
                segment = stem.to_string();
            }
        }

        if index < 2 && PAGE_IN_HREF_RE.is_match(&segment) {
            segment = PAGE_IN_HREF_RE.replace_all(&segment, "").into_owned();
        }

        if index == 0 {
            first_segment_has_letters = HAS_ALPHA_RE.is_match(&segment);
        }

        if is_good_segment(&segment, index, first_segment_has_letters) {
            cleaned.push(segment);
        }
    }
    cleaned.reverse();

    format!("{}://{host}{port}{}", parsed.scheme(), cleaned.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_absolute_url() {
        assert!(is_absolute_url("https://example.com/a").0);
        assert!(!is_absolute_url("/relative").0);
        assert!(!is_absolute_url("ftp://example.com").0);
    }

    #[test]
    fn test_create_absolute_url() {
        let Ok(base) = Url::parse("https://example.com/news/story.html") else {
            panic!("base url");
        };
        assert_eq!(create_absolute_url("img/a.png", &base), "https://example.com/news/img/a.png");
        assert_eq!(create_absolute_url("//cdn.example.com/x.js", &base), "https://cdn.example.com/x.js");
        assert_eq!(create_absolute_url("mailto:a@b.c", &base), "mailto:a@b.c");
    }

    #[test]
    fn test_absolutize_srcset() {
        let Ok(base) = Url::parse("https://example.com/post/") else {
            panic!("base url");
        };
        assert_eq!(
            absolutize_srcset("a.jpg 1x, /b.jpg 2x, a.jpg 1x", &base),
            "https://example.com/post/a.jpg 1x, https://example.com/b.jpg 2x"
        );
    }

    #[test]
    fn test_base_domain() {
        assert_eq!(base_domain("news.ycombinator.com"), "ycombinator.com");
        assert_eq!(base_domain("localhost"), "localhost");
    }

    #[test]
    fn test_remove_anchor() {
        assert_eq!(remove_anchor("https://x.com/a/#top"), "https://x.com/a");
        assert!(urls_match("https://x.com/a", "https://x.com/a/#c"));
    }

    #[test]
    fn test_article_base_url_strips_page_numbers() {
        assert_eq!(
            article_base_url("https://example.com/story/2"),
            "https://example.com/story"
        );
        assert_eq!(
            article_base_url("https://example.com/2016/story-title.html"),
            "https://example.com/2016/story-title"
        );
    }
}
