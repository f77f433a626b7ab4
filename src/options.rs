//! Configuration options for article extraction.
//!
//! [`ParseOptions`] configures a whole parse (fetching, pagination,
//! fallback). [`ExtractorOptions`] is the per-call input of the root
//! extractor and is copied with small changes for each field.
//! [`GenericContentOptions`] are the flags of the content scorer cascade.

use std::collections::BTreeMap;

use dom_query::Document;

use crate::selector::FieldRules;

/// Configuration for [`Parser`](crate::Parser).
///
/// # Example
///
/// ```rust
/// use rs_article_parser::ParseOptions;
///
/// let options = ParseOptions {
///     fetch_all_pages: false,
///     ..ParseOptions::default()
/// };
/// assert!(options.fallback);
/// ```
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Follow next-page links and merge their content.
    ///
    /// Default: `true`
    pub fetch_all_pages: bool,

    /// Use the generic extractor for fields a rule set cannot resolve.
    ///
    /// Default: `true`
    pub fallback: bool,

    /// Extra request headers sent with every fetch.
    ///
    /// Default: empty
    pub headers: Vec<(String, String)>,

    /// Additional named fields, merged into the result's `extended` map.
    ///
    /// Applied on top of any `extend` fields of the site's rule set.
    ///
    /// Default: empty
    pub extend: BTreeMap<String, FieldRules>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            fetch_all_pages: true,
            fallback: true,
            headers: Vec::new(),
            extend: BTreeMap::new(),
        }
    }
}

/// Per-call input of the root extractor and the field extractors.
///
/// Cheap to copy; field extractors receive a copy with the flags they need
/// (`extract_html` for content, `allow_concatenation` for author, and so
/// on) and with already-resolved fields filled in as context.
#[derive(Clone, Copy)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExtractorOptions<'a> {
    /// Parsed page.
    pub doc: &'a Document,

    /// Normalized page HTML, re-parsed by the generic content scorer.
    pub html: &'a str,

    /// Page URL, used as the base for relative links.
    pub url: &'a str,

    /// Names of the `meta` tags present on the page.
    pub meta_cache: &'a [String],

    /// Only extract `content` and `next_page_url` (follow-on pages).
    pub content_only: bool,

    /// Fall back to the generic extractor per field.
    pub fallback: bool,

    /// Return markup rather than text.
    pub extract_html: bool,

    /// Run the field's default cleaner on selected values.
    pub default_cleaner: bool,

    /// Join multiple matches into one comma-separated value.
    pub allow_concatenation: bool,

    /// Title resolved so far (or carried over from the first page).
    pub extracted_title: Option<&'a str>,

    /// Content resolved so far, for fields derived from it.
    pub content: Option<&'a str>,

    /// Excerpt resolved so far, for dek de-duplication.
    pub excerpt: Option<&'a str>,

    /// Pages already collected, so pagination never revisits them.
    pub previous_urls: &'a [String],
}

impl<'a> ExtractorOptions<'a> {
    /// Options for a first-page, full extraction with fallback on.
    #[must_use]
    pub fn new(doc: &'a Document, html: &'a str, url: &'a str) -> Self {
        Self {
            doc,
            html,
            url,
            meta_cache: &[],
            content_only: false,
            fallback: true,
            extract_html: false,
            default_cleaner: true,
            allow_concatenation: false,
            extracted_title: None,
            content: None,
            excerpt: None,
            previous_urls: &[],
        }
    }
}

impl std::fmt::Debug for ExtractorOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorOptions")
            .field("url", &self.url)
            .field("content_only", &self.content_only)
            .field("fallback", &self.fallback)
            .field("extract_html", &self.extract_html)
            .field("default_cleaner", &self.default_cleaner)
            .field("allow_concatenation", &self.allow_concatenation)
            .field("extracted_title", &self.extracted_title)
            .field("previous_urls", &self.previous_urls)
            .finish_non_exhaustive()
    }
}

/// Flags of the generic content scorer.
///
/// Extraction starts with every flag on. When the result is too short, the
/// flags are switched off one at a time in declaration order and the page
/// is scored again from a fresh parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct GenericContentOptions {
    /// Remove nodes whose class/id looks like chrome before scoring.
    pub strip_unlikely_candidates: bool,

    /// Add class/id weights to node scores.
    pub weight_nodes: bool,

    /// Run the conditional cleaner on the chosen region.
    pub clean_conditionally: bool,
}

impl Default for GenericContentOptions {
    fn default() -> Self {
        Self {
            strip_unlikely_candidates: true,
            weight_nodes: true,
            clean_conditionally: true,
        }
    }
}

impl GenericContentOptions {
    /// The cascade of option sets tried in order: all on, then each flag
    /// switched off cumulatively.
    #[must_use]
    pub fn cascade() -> [Self; 4] {
        let all = Self::default();
        let no_strip = Self {
            strip_unlikely_candidates: false,
            ..all
        };
        let no_weight = Self {
            weight_nodes: false,
            ..no_strip
        };
        let no_clean = Self {
            clean_conditionally: false,
            ..no_weight
        };
        [all, no_strip, no_weight, no_clean]
    }
}
