//! Compiled regex patterns and tag lists for content extraction.
//!
//! All patterns are compiled once at startup using `LazyLock` for efficiency.
//! Patterns are organized by their purpose in the extraction pipeline.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Node Weighting
// =============================================================================

/// Class/id hints that suggest article content (+25 weight).
pub static POSITIVE_SCORE_HINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(article|articlecontent|instapaper_body|blog|body|content|entry-content-asset|entry|hentry|main|Normal|page|pagination|permalink|post|story|text|[-_]copy|\Bcopy)",
    )
    .expect("POSITIVE_SCORE_HINTS regex")
});

/// Class/id hints that suggest boilerplate (-25 weight).
///
/// `comment\B` also catches compound names such as `commentbox`.
pub static NEGATIVE_SCORE_HINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(adbox|advert|author|bio|bookmark|bottom|byline|clear|com-|combx|comment|comment\B|contact|copy|credit|crumb|date|deck|excerpt|featured|foot|footer|footnote|graf|head|info|infotext|instapaper_ignore|jump|linebreak|link|masthead|media|meta|modal|outbrain|promo|pr_|related|respond|roundcontent|scroll|secondary|share|shopping|shoutbox|side|sidebar|sponsor|stamp|sub|summary|tags|tools|widget)",
    )
    .expect("NEGATIVE_SCORE_HINTS regex")
});

/// Class hints for photo containers (+10 weight).
pub static PHOTO_HINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(figure|photo|image|caption)").expect("PHOTO_HINTS regex")
});

/// Publisher-guideline asset marker (+25 weight, always kept).
pub static READABILITY_ASSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)entry-content-asset").expect("READABILITY_ASSET regex")
});

// =============================================================================
// Node Scoring Tags
// =============================================================================

/// Tags scored by the paragraph scorer.
pub const PARAGRAPH_SCORE_TAGS: &[&str] = &["p", "li", "span", "pre"];

/// Container tags that usually hold content (+3).
pub const CHILD_CONTENT_TAGS: &[&str] = &["td", "blockquote", "ol", "ul", "dl"];

/// Tags that usually hold chrome (-3).
pub const BAD_TAGS: &[&str] = &["address", "form"];

/// Structural content idioms; the parent selector gets +80 when the pair matches.
pub const HNEWS_CONTENT_SELECTORS: &[(&str, &str)] = &[
    (".hentry", ".entry-content"),
    ("entry", ".entry-content"),
    (".entry", ".entry_content"),
    (".post", ".postbody"),
    (".post", ".post_body"),
    (".post", ".post-body"),
];

/// Tags never picked as the top candidate.
pub const NON_TOP_CANDIDATE_TAGS: &[&str] = &[
    "br", "b", "i", "label", "hr", "area", "base", "basefont", "input", "img", "link", "meta",
];

/// Ends-of-sentence test used when merging short paragraph siblings.
pub static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.( |$)").expect("SENTENCE_END regex"));

// =============================================================================
// Unlikely Candidates
// =============================================================================

/// Class/id fragments that mark a node as unlikely article content.
pub static CANDIDATES_BLACKLIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(ad-break|adbox|advert|addthis|agegate|aux|blogger-labels|combx|comment|conversation|disqus|entry-unrelated|extra|foot|form|header|hidden|loader|login|menu|meta|nav|pager|pagination|predicta|presence_control_external|popup|printfriendly|related|remove|remark|rss|share|shoutbox|sidebar|sociable|sponsor|tools)",
    )
    .expect("CANDIDATES_BLACKLIST regex")
});

/// Class/id fragments that rescue a blacklisted node.
pub static CANDIDATES_WHITELIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(and|article|body|blogindex|column|content|entry-content-asset|format|hfeed|hentry|hatom|main|page|posts|shadow)",
    )
    .expect("CANDIDATES_WHITELIST regex")
});

/// Block-level children that stop a `div` from becoming a `p`.
pub const DIV_TO_P_BLOCK_TAGS: &str = "a, blockquote, dl, div, img, p, pre, table";

/// Block-level tags; a run of inline content after a `br` ends at one of these.
pub const BLOCK_LEVEL_TAGS: &[&str] = &[
    "article", "aside", "blockquote", "body", "br", "button", "canvas", "caption", "col",
    "colgroup", "dd", "div", "dl", "dt", "embed", "fieldset", "figcaption", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "li", "map", "object",
    "ol", "output", "p", "pre", "progress", "section", "table", "tbody", "textarea", "tfoot",
    "th", "thead", "tr", "ul", "video",
];

// =============================================================================
// Cleaning
// =============================================================================

/// Marker class for nodes the cleaners must leave alone.
pub const KEEP_CLASS: &str = "article-parser-keep";

/// Embedded players that survive junk-tag stripping.
pub const KEEP_SELECTORS: &[&str] = &[
    r#"iframe[src^="https://www.youtube.com"]"#,
    r#"iframe[src^="https://www.youtube-nocookie.com"]"#,
    r#"iframe[src^="http://www.youtube.com"]"#,
    r#"iframe[src^="https://player.vimeo"]"#,
    r#"iframe[src^="http://player.vimeo"]"#,
    r#"iframe[src^="https://www.redditmedia.com"]"#,
];

/// Tags removed from every cleaned region.
pub const STRIP_OUTPUT_TAGS: &[&str] = &[
    "title", "script", "noscript", "link", "style", "hr", "embed", "iframe", "object",
];

/// Attributes that survive attribute cleaning.
pub const WHITELIST_ATTRS: &[&str] = &[
    "src",
    "srcset",
    "sizes",
    "type",
    "href",
    "class",
    "id",
    "alt",
    "xlink:href",
    "width",
    "height",
];

/// Tags subject to conditional cleaning.
pub const CLEAN_CONDITIONALLY_TAGS: &str = "ul, ol, table, div, button, form";

/// Headers inspected by the header cleaner.
pub const HEADER_TAGS: &str = "h2, h3, h4, h5, h6";

/// Tags collapsed by the wrapping-tag cleaner.
pub const CLEAN_WRAPPING_TAGS: &[&str] = &["div", "span", "font", "center"];

/// Spacer and tracking images.
pub static SPACER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)transparent|spacer|blank").expect("SPACER_RE regex"));

// =============================================================================
// Field Cleaners
// =============================================================================

/// Byline prefix stripped from authors.
pub static CLEAN_AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(posted |written )?by\s*:?\s*(.*)").expect("CLEAN_AUTHOR_RE regex")
});

/// Separators between a title and its site name or breadcrumbs.
pub static TITLE_SPLITTERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(: | - | \| )").expect("TITLE_SPLITTERS_RE regex"));

/// Millisecond epoch timestamp.
pub static MS_DATE_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{13}$").expect("MS_DATE_STRING regex"));

/// Second epoch timestamp.
pub static SEC_DATE_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("SEC_DATE_STRING regex"));

/// Date embedded in an article URL path.
pub static DATE_IN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(\d{4})[-_/](\d{2})[-_/](\d{2})(?:/|$)").expect("DATE_IN_URL regex")
});

/// A bare URL inside text.
pub static HAS_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://").expect("HAS_URL regex"));

/// Any HTML tag.
pub static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("HTML_TAG regex"));

/// Byline text for the generic author extractor.
pub static BYLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[\n\s]*(by|posted by)").expect("BYLINE_RE regex"));

// =============================================================================
// Text
// =============================================================================

/// Runs of whitespace, including non-breaking spaces.
pub static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\u{a0}]{2,}").expect("WHITESPACE_RUN regex"));

/// `pre`, `code` and `textarea` blocks, where whitespace is significant.
pub static PRESERVE_WHITESPACE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(pre|code|textarea)\b.*?</(pre|code|textarea)>")
        .expect("PRESERVE_WHITESPACE_BLOCK regex")
});

/// Newlines stripped from comment fields.
pub static NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\r\n|\n|\r)").expect("NEWLINES regex"));

/// Right-to-left script characters (Hebrew, Arabic, Syriac, Thaana, NKo).
pub static RTL_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{0590}-\u{07FF}\u{FB1D}-\u{FDFD}\u{FE70}-\u{FEFC}]").expect("RTL_CHARS regex")
});

/// Left-to-right script characters.
pub static LTR_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z\u{00C0}-\u{02B8}\u{0300}-\u{0589}\u{0800}-\u{1FFF}\u{2C00}-\u{FB1C}]")
        .expect("LTR_CHARS regex")
});

// =============================================================================
// Resource Normalization
// =============================================================================

/// Attribute values that look like lazily-loaded image sources.
pub static LAZY_IMAGE_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(png|gif|jpe?g)").expect("LAZY_IMAGE_VALUE regex")
});

/// Attribute values that look like a srcset.
pub static LAZY_SRCSET_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(png|gif|jpe?g)(\?\S+)?(\s*\d+[wx])").expect("LAZY_SRCSET_VALUE regex")
});

/// Charset declaration inside a content-type value.
pub static ENCODING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)charset=\s*([\w-]+)").expect("ENCODING_RE regex"));

// =============================================================================
// URLs and Pagination
// =============================================================================

/// Page number in an href segment.
pub static PAGE_IN_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(page|paging|(p(a|g|ag)?(e|enum|ewanted|ing|ination)))?(=|/)([0-9]{1,3})")
        .expect("PAGE_IN_HREF_RE regex")
});

/// A purely alphabetic string.
pub static IS_ALPHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z]+$").expect("IS_ALPHA_RE regex"));

/// Any letter.
pub static HAS_ALPHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[a-z]").expect("HAS_ALPHA_RE regex"));

/// Link text that announces the next page.
pub static NEXT_LINK_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(next|weiter|continue|>([^|]|$)|»([^|]|$))").expect("NEXT_LINK_TEXT_RE regex")
});

/// Link text that announces a previous page.
pub static PREV_LINK_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(prev|earl|old|new|<|«)").expect("PREV_LINK_TEXT_RE regex"));

/// Links that lead away from the article.
pub static EXTRANEOUS_LINK_HINTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(print|archive|comment|discuss|e-mail|email|share|reply|all|login|sign|single|adx|entry-unrelated)",
    )
    .expect("EXTRANEOUS_LINK_HINTS_RE regex")
});

/// Pagination wording in a class, id or href.
pub static PAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)pag(e|ing|inat)").expect("PAGE_RE regex"));

// =============================================================================
// Lead Image
// =============================================================================

/// Image URL fragments that suggest a real photo.
pub static POSITIVE_LEAD_IMAGE_URL_HINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(upload|wp-content|large|photo|wp-image)")
        .expect("POSITIVE_LEAD_IMAGE_URL_HINTS regex")
});

/// Image URL fragments that suggest chrome.
pub static NEGATIVE_LEAD_IMAGE_URL_HINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(spacer|sprite|blank|throbber|gradient|tile|bg|background|icon|social|header|hdr|advert|spinner|loader|loading|default|rating|share|facebook|twitter|theme|promo|ads|wp-includes)",
    )
    .expect("NEGATIVE_LEAD_IMAGE_URL_HINTS regex")
});

/// GIF image URL.
pub static GIF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.gif(\?.*)?$").expect("GIF_RE regex"));

/// JPEG image URL.
pub static JPG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.jpe?g(\?.*)?$").expect("JPG_RE regex"));
