//! # rs-article-parser
//!
//! Readable article extraction from web pages.
//!
//! A page is matched against site-specific selection rules when the
//! registry knows its host; every field those rules cannot resolve falls
//! back to a generic extractor that scores the page for its main content,
//! title, byline, date, lead image and next-page link. Paginated articles
//! are followed and merged.
//!
//! ## Quick Start
//!
//! ```rust
//! let html = r#"<html><head><title>Tide tables | Coast News</title></head>
//! <body><article><h1>Tide tables</h1>
//! <p>High water arrives later each day, by about fifty minutes, as the moon moves along its orbit.</p>
//! <p>Harbour masters publish the tables a year ahead, and fishermen, sailors, and swimmers all rely on them.</p>
//! </article></body></html>"#;
//!
//! let article = rs_article_parser::extract_article("https://coast.example.com/tides", html, None)?;
//! assert_eq!(article.title.as_deref(), Some("Tide tables"));
//! assert!(article.word_count > 20);
//! # Ok::<(), rs_article_parser::Error>(())
//! ```
//!
//! ## Fetching
//!
//! [`Parser`] fetches pages through a [`Fetcher`]. With the default `http`
//! feature, [`HttpFetcher`] fetches over HTTP with `reqwest`.

use std::collections::BTreeMap;
use std::sync::Arc;

mod error;
mod patterns;

/// DOM helpers over `dom_query`.
pub mod dom;

/// Cleaners applied to selected field values.
pub mod cleaners;

/// Character encoding detection and decoding.
pub mod encoding;

/// Root, generic, comment and pagination extractors.
pub mod extractor;

/// Page fetching.
pub mod fetch;

/// Content preparation and cleaning passes.
pub mod html_processing;

/// Link density of DOM regions.
pub mod link_density;

/// Parse and extractor options.
pub mod options;

/// Hostname to rule-set lookup.
pub mod registry;

/// Page loading and normalization.
pub mod resource;

/// Extraction result types.
pub mod result;

/// Content scoring.
pub mod scoring;

/// Declarative selection rules and their engine.
pub mod selector;

/// Built-in site rule sets.
pub mod sites;

/// URL utilities for validation, resolution, and normalization.
pub mod url_utils;

pub use error::{Error, Result};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{FetchError, FetchedPage, Fetcher};
pub use options::ParseOptions;
pub use registry::ExtractorRegistry;
pub use result::{ArticleResult, Comment, ContentOnlyResult, ExtractionResult, TextDirection};
pub use selector::{ExtractionRuleSet, FieldRules, SelectedValue, SelectionRule, Selector};

use extractor::PageSource;
use options::ExtractorOptions;
use resource::{meta_names, Resource};
use selector::select_extended;

/// Fetches, extracts and paginates articles.
///
/// # Example
///
/// ```rust,no_run
/// use rs_article_parser::{HttpFetcher, Parser, ParseOptions};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let parser = Parser::new(HttpFetcher::new()?).with_options(ParseOptions {
///     fetch_all_pages: false,
///     ..ParseOptions::default()
/// });
/// let article = parser.parse("https://news.ycombinator.com/item?id=1").await?;
/// println!("{:?}", article.title);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Parser {
    fetcher: Arc<dyn Fetcher>,
    registry: ExtractorRegistry,
    options: ParseOptions,
}

impl Parser {
    /// A parser using `fetcher`, the built-in rule sets and default options.
    #[must_use]
    pub fn new(fetcher: impl Fetcher + 'static) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            registry: ExtractorRegistry::builtin(),
            options: ParseOptions::default(),
        }
    }

    /// Replace the rule-set registry.
    #[must_use]
    pub fn with_registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the parse options.
    #[must_use]
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Fetch `url` and extract its article.
    ///
    /// # Errors
    /// [`Error::InvalidUrl`] for a malformed URL, [`Error::Fetch`] when the
    /// first page cannot be fetched, and the resource errors for bodies
    /// that are not HTML.
    pub async fn parse(&self, url: &str) -> Result<ArticleResult> {
        self.parse_resource(url, None).await
    }

    /// Extract the article from already-fetched `html` served at `url`.
    ///
    /// Follow-on pages are still fetched when pagination is enabled.
    ///
    /// # Errors
    /// [`Error::InvalidUrl`] for a malformed URL and
    /// [`Error::EmptyDocument`] for HTML with nothing in it.
    pub async fn parse_html(&self, url: &str, html: &str) -> Result<ArticleResult> {
        self.parse_resource(url, Some(html)).await
    }

    async fn parse_resource(&self, url: &str, prepared: Option<&str>) -> Result<ArticleResult> {
        url::Url::parse(url)?;
        let html = Resource::create(url, prepared, self.fetcher.as_ref(), &self.options.headers).await?;
        let rule_set = self.registry.get_extractor(url);
        let article = extract_page(url, &html, rule_set, &self.options.extend, self.options.fallback);

        if !self.options.fetch_all_pages || article.next_page_url.is_none() {
            return Ok(article);
        }

        let source = PageSource {
            fetcher: self.fetcher.as_ref(),
            headers: &self.options.headers,
            rule_set,
            fallback: self.options.fallback,
        };
        Ok(extractor::collect_all_pages(article, url, source).await)
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Extract one page without fetching anything.
///
/// `rule_set` gives the site's rules; `None` runs the generic extractor.
/// Fields the rules cannot resolve fall back to it as well.
///
/// # Errors
/// [`Error::EmptyDocument`] when `html` parses to nothing.
pub fn extract_article(url: &str, html: &str, rule_set: Option<&ExtractionRuleSet>) -> Result<ArticleResult> {
    let html = Resource::prepare_html(html)?;
    Ok(extract_page(url, &html, rule_set, &BTreeMap::new(), true))
}

/// Full extraction of a prepared page, plus caller-supplied `extend`
/// fields.
fn extract_page(
    url: &str,
    html: &str,
    rule_set: Option<&ExtractionRuleSet>,
    extend: &BTreeMap<String, FieldRules>,
    fallback: bool,
) -> ArticleResult {
    let doc = dom::parse(html);
    let meta_cache = meta_names(&doc);
    let opts = ExtractorOptions {
        meta_cache: &meta_cache,
        fallback,
        ..ExtractorOptions::new(&doc, html, url)
    };

    let mut article = extractor::extract(rule_set, &opts).into_article().unwrap_or_default();
    article.extended.extend(select_extended(extend, &opts));
    article.total_pages = 1;
    article.pages_rendered = 1;
    article
}
