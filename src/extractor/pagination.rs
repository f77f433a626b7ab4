//! Multi-page collection.
//!
//! Follows `next_page_url` links from the first page, extracts each
//! follow-on page in content-only mode and appends its content under a
//! page heading. Pages never revisit a URL already collected.

use tracing::{debug, warn};

use super::{generic, root};
use crate::dom;
use crate::fetch::Fetcher;
use crate::options::ExtractorOptions;
use crate::resource::{meta_names, Resource};
use crate::result::{ArticleResult, ExtractionResult};
use crate::selector::ExtractionRuleSet;
use crate::url_utils::{remove_anchor, urls_match};

/// Most pages merged into one article, the first page included.
pub const MAX_PAGES: usize = 26;

/// Where the follow-on pages come from and how they are extracted.
#[derive(Clone, Copy)]
pub struct PageSource<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub headers: &'a [(String, String)],
    pub rule_set: Option<&'a ExtractionRuleSet>,
    pub fallback: bool,
}

/// Merge the pages after `article` into it.
///
/// `page_url` is the URL the first page was loaded from. A page that
/// cannot be fetched ends the collection; what was merged so far is kept.
/// `total_pages` and `pages_rendered` count the pages actually merged.
pub async fn collect_all_pages(mut article: ArticleResult, page_url: &str, source: PageSource<'_>) -> ArticleResult {
    let title = article.title.clone();
    let mut content = article.content.take().unwrap_or_default();
    let mut previous_urls = vec![remove_anchor(page_url)];
    let mut next = article.next_page_url.clone();
    let mut pages = 1;

    while let Some(next_url) = next.take() {
        if pages >= MAX_PAGES {
            debug!(pages, "Page limit reached");
            break;
        }
        if previous_urls.iter().any(|seen| urls_match(seen, &next_url)) {
            debug!(url = %next_url, "Next page already collected");
            break;
        }

        let html = match Resource::create(&next_url, None, source.fetcher, source.headers).await {
            Ok(html) => html,
            Err(err) => {
                warn!(url = %next_url, error = %err, "Stopping pagination, page could not be loaded");
                break;
            }
        };

        pages += 1;
        let page = extract_page(&html, &next_url, title.as_deref(), &previous_urls, source);
        previous_urls.push(remove_anchor(&next_url));
        debug!(page = pages, url = %next_url, "Merged page");

        content = format!(
            "{content}<hr><h4>Page {pages}</h4>{}",
            page.content().unwrap_or_default()
        );
        next = page.next_page_url().map(str::to_string);
    }

    article.word_count = generic::word_count(Some(&content));
    article.content = (!content.is_empty()).then_some(content);
    article.total_pages = pages;
    article.pages_rendered = pages;
    article
}

/// Content-only extraction of one follow-on page. The parsed document
/// lives only for the duration of this call.
fn extract_page(
    html: &str,
    url: &str,
    title: Option<&str>,
    previous_urls: &[String],
    source: PageSource<'_>,
) -> ExtractionResult {
    let doc = dom::parse(html);
    let meta_cache = meta_names(&doc);
    let opts = ExtractorOptions {
        meta_cache: &meta_cache,
        content_only: true,
        fallback: source.fallback,
        extracted_title: title,
        previous_urls,
        ..ExtractorOptions::new(&doc, html, url)
    };
    root::extract(source.rule_set, &opts)
}
