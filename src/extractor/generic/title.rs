use crate::cleaners::clean_title;
use crate::options::ExtractorOptions;

use super::{extract_from_meta, extract_from_selectors};

/// Meta tags trusted over any markup.
const STRONG_TITLE_META_TAGS: &[&str] = &["tweetmeme-title", "dc.title", "rbtitle", "headline", "title"];

/// Meta tags consulted after the strong selectors.
const WEAK_TITLE_META_TAGS: &[&str] = &["og:title"];

const STRONG_TITLE_SELECTORS: &[&str] = &[
    ".hentry .entry-title",
    "h1#articleHeader",
    "h1.articleHeader",
    "h1.article",
    ".instapaper_title",
    "#meebo-title",
];

const WEAK_TITLE_SELECTORS: &[&str] = &[
    "article h1",
    "#entry-title",
    ".entry-title",
    "#entryTitle",
    "#entrytitle",
    ".entryTitle",
    ".entrytitle",
    "#articleTitle",
    ".articleTitle",
    "post post-title",
    "h1.title",
    "h2.article",
    "h1",
    "html head title",
    "title",
];

/// The page title: strong meta, strong selectors, weak meta, weak selectors.
#[must_use]
pub fn extract(opts: &ExtractorOptions) -> Option<String> {
    let clean = |title: String| clean_title(&title, opts.url, opts.doc);

    extract_from_meta(opts, STRONG_TITLE_META_TAGS, true)
        .or_else(|| extract_from_selectors(opts.doc, STRONG_TITLE_SELECTORS, 1, true))
        .or_else(|| extract_from_meta(opts, WEAK_TITLE_META_TAGS, true))
        .or_else(|| extract_from_selectors(opts.doc, WEAK_TITLE_SELECTORS, 1, true))
        .map(clean)
        .filter(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    fn title_of(html: &str) -> Option<String> {
        let doc = parse(html);
        extract(&ExtractorOptions::new(&doc, html, "https://www.example.com/story"))
    }

    #[test]
    fn test_strong_meta_wins() {
        let html = r#"<head><meta name="dc.title" value="From Meta"><meta name="og:title" value="OG"></head>
                      <body><h1 class="entry-title">From Markup</h1></body>"#;
        assert_eq!(title_of(html).as_deref(), Some("From Meta"));
    }

    #[test]
    fn test_strong_selector_beats_og_title() {
        let html = r#"<head><meta name="og:title" value="OG Title"></head>
                      <body><div class="hentry"><h2 class="entry-title">Entry Title</h2></div></body>"#;
        assert_eq!(title_of(html).as_deref(), Some("Entry Title"));
    }

    #[test]
    fn test_document_title_site_name_removed() {
        let html = "<head><title>Council approves budget | Example</title></head><body><p>x</p></body>";
        assert_eq!(title_of(html).as_deref(), Some("Council approves budget"));
    }

    #[test]
    fn test_no_title() {
        assert_eq!(title_of("<body><p>Nothing here</p></body>"), None);
    }
}
