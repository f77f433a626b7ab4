use std::collections::HashMap;
use std::sync::LazyLock;

use dom_query::Document;
use regex::Regex;
use strsim::normalized_levenshtein;
use url::Url;

use crate::dom::{normalize_spaces, strip_tags};
use crate::patterns::TITLE_SPLITTERS_RE;

#[allow(clippy::expect_used)]
static DOMAIN_ENDINGS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.com$|\.net$|\.org$|\.co\.uk$").expect("DOMAIN_ENDINGS_RE regex")
});

/// Longest title kept without looking for a lone `h1` instead.
const MAX_TITLE_LENGTH: usize = 150;

/// Clean a selected title.
///
/// Site names and breadcrumbs are split off, an implausibly long title is
/// replaced by the page's only `h1`, and markup is stripped.
#[must_use]
pub fn clean_title(title: &str, url: &str, doc: &Document) -> String {
    let mut title = if TITLE_SPLITTERS_RE.is_match(title) {
        resolve_split_title(title, url)
    } else {
        title.to_string()
    };

    if title.chars().count() > MAX_TITLE_LENGTH {
        let h1 = doc.select("h1");
        if h1.length() == 1 {
            title = h1.text().to_string();
        }
    }

    normalize_spaces(strip_tags(&title).trim())
}

/// Split `title` on `: `, ` - ` and ` | `, keeping the separators.
fn split_title(title: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut last = 0;
    for splitter in TITLE_SPLITTERS_RE.find_iter(title) {
        parts.push(title[last..splitter.start()].to_string());
        parts.push(splitter.as_str().to_string());
        last = splitter.end();
    }
    parts.push(title[last..].to_string());
    parts
}

/// Drop breadcrumbs or a site name from a title such as
/// `Story headline | Example News`.
#[must_use]
pub fn resolve_split_title(title: &str, url: &str) -> String {
    let parts = split_title(title);
    if parts.len() == 1 {
        return title.to_string();
    }

    if let Some(breadcrumb) = extract_breadcrumb_title(&parts, title) {
        return breadcrumb;
    }

    if let Some(without_domain) = clean_domain_from_title(&parts, url) {
        return without_domain;
    }

    title.to_string()
}

/// Heavily breadcrumbed titles (`Gadgets : Bits : Blogs : NYTimes.com`):
/// keep the longer end.
fn extract_breadcrumb_title(parts: &[String], title: &str) -> Option<String> {
    if parts.len() < 6 {
        return None;
    }

    // The most frequent part, when repeated and short, is the real splitter.
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for part in parts {
        *counts.entry(part.as_str()).or_default() += 1;
    }
    let mut max_term = "";
    let mut max_count = 0;
    for part in parts {
        let count = counts[part.as_str()];
        if count > max_count {
            max_term = part;
            max_count = count;
        }
    }

    let resplit: Vec<&str> = if max_count >= 2 && max_term.chars().count() <= 4 && !max_term.is_empty() {
        title.split(max_term).collect()
    } else {
        parts.iter().map(String::as_str).collect()
    };

    let first = resplit.first().copied().unwrap_or_default();
    let last = resplit.last().copied().unwrap_or_default();
    let longest = if first.chars().count() > last.chars().count() {
        first
    } else {
        last
    };

    if longest.chars().count() > 10 {
        Some(longest.to_string())
    } else {
        Some(title.to_string())
    }
}

/// Remove a title end that fuzzily matches the page's domain.
fn clean_domain_from_title(parts: &[String], url: &str) -> Option<String> {
    let host = Url::parse(url).ok()?.host_str()?.to_string();
    let naked_domain = DOMAIN_ENDINGS_RE.replace(&host, "").into_owned();

    let start_slug = parts.first()?.to_lowercase().replacen(' ', "", 1);
    if normalized_levenshtein(&start_slug, &naked_domain) > 0.4 && start_slug.chars().count() > 5 {
        return Some(parts[2.min(parts.len())..].concat());
    }

    let end_slug = parts.last()?.to_lowercase().replacen(' ', "", 1);
    if normalized_levenshtein(&end_slug, &naked_domain) > 0.4 && end_slug.chars().count() >= 5 {
        return Some(parts[..parts.len().saturating_sub(2)].concat());
    }

    None
}
