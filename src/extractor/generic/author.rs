use crate::cleaners::clean_author;
use crate::options::ExtractorOptions;
use crate::patterns::BYLINE_RE;

use super::{extract_from_meta, extract_from_selectors};

/// Author names longer than this are prose, not bylines.
const AUTHOR_MAX_LENGTH: usize = 300;

const AUTHOR_META_TAGS: &[&str] = &[
    "byl",
    "clmst",
    "dc.author",
    "dcsext.author",
    "dc.creator",
    "rbauthors",
    "authors",
];

const AUTHOR_SELECTORS: &[&str] = &[
    ".entry .entry-author",
    ".author.vcard .fn",
    ".author .vcard .fn",
    ".byline.vcard .fn",
    ".byline .vcard .fn",
    ".byline .by .author",
    ".byline .by",
    ".byline .author",
    ".post-author.vcard",
    ".post-author .vcard",
    "a[rel=author]",
    "#by_author",
    ".by_author",
    "#entryAuthor",
    ".entryAuthor",
    ".byline a[href*=author]",
    "#author .authorname",
    ".author .authorname",
    "#author",
    ".author",
    ".articleauthor",
    ".ArticleAuthor",
    ".byline",
];

const BYLINE_SELECTORS: &[&str] = &["#byline", ".byline"];

/// The byline: author meta tags, then byline markup, then any lone
/// `.byline` whose text starts with "By".
#[must_use]
pub fn extract(opts: &ExtractorOptions) -> Option<String> {
    let short = |author: &String| author.chars().count() < AUTHOR_MAX_LENGTH;

    if let Some(author) = extract_from_meta(opts, AUTHOR_META_TAGS, true).filter(short) {
        return Some(clean_author(&author));
    }

    if let Some(author) = extract_from_selectors(opts.doc, AUTHOR_SELECTORS, 2, true).filter(short) {
        return Some(clean_author(&author));
    }

    for selector in BYLINE_SELECTORS {
        let nodes = opts.doc.select(selector);
        if nodes.length() != 1 {
            continue;
        }
        let text = nodes.text();
        if BYLINE_RE.is_match(&text) {
            return Some(clean_author(&text));
        }
    }

    None
}
