use crate::options::ExtractorOptions;
use crate::url_utils::{get_domain_url, parse_url};

use super::extract_from_meta;

const CANONICAL_META_TAGS: &[&str] = &["og:url"];

/// The canonical URL of the page and its host.
///
/// A `link[rel=canonical]` wins over `og:url`; the fetched URL is the
/// fallback.
#[must_use]
pub fn extract(opts: &ExtractorOptions) -> (String, String) {
    let canonical = opts
        .doc
        .select("link[rel=canonical]")
        .first()
        .attr("href")
        .map(|href| href.trim().to_string())
        .filter(|href| parse_url(href).is_some());

    let url = canonical
        .or_else(|| extract_from_meta(opts, CANONICAL_META_TAGS, true).filter(|u| parse_url(u).is_some()))
        .unwrap_or_else(|| opts.url.to_string());

    let domain = get_domain_url(&url);
    (url, domain)
}
