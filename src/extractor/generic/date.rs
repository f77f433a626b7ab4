use crate::cleaners::clean_date_published;
use crate::options::ExtractorOptions;
use crate::patterns::DATE_IN_URL;

use super::{extract_from_meta, extract_from_selectors};

const DATE_PUBLISHED_META_TAGS: &[&str] = &[
    "article:published_time",
    "displaydate",
    "dc.date",
    "dc.date.issued",
    "rbpubdate",
    "publish_date",
    "pub_date",
    "pagedate",
    "pubdate",
    "revision_date",
    "doc_date",
    "date_created",
    "content_create_date",
    "lastmodified",
    "created",
    "date",
];

const DATE_PUBLISHED_SELECTORS: &[&str] = &[
    ".hentry .dtstamp.published",
    ".hentry .published",
    ".hentry .dtstamp.updated",
    ".hentry .updated",
    ".single .published",
    ".meta .published",
    ".meta .postDate",
    ".entry-date",
    ".byline .date",
    ".postmetadata .date",
    ".article_datetime",
    ".date-header",
    ".story-date",
    ".dateStamp",
    "#story .datetime",
    ".dateline",
    ".pubdate",
];

/// Publication date from meta tags, date markup, or the URL path.
///
/// Each source only counts when its value parses as a date.
#[must_use]
pub fn extract(opts: &ExtractorOptions) -> Option<String> {
    extract_from_meta(opts, DATE_PUBLISHED_META_TAGS, false)
        .and_then(|date| clean_date_published(&date))
        .or_else(|| {
            extract_from_selectors(opts.doc, DATE_PUBLISHED_SELECTORS, 1, true)
                .and_then(|date| clean_date_published(&date))
        })
        .or_else(|| date_from_url(opts.url))
}

fn date_from_url(url: &str) -> Option<String> {
    let caps = DATE_IN_URL.captures(url)?;
    clean_date_published(&format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]))
}
