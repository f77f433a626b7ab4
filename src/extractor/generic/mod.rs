//! Field extractors that work on any page, without site rules.
//!
//! Each one returns the field's value or `None`. [`extract`] runs all of
//! them and is what a page without a rule set gets; the root extractor also
//! calls them one field at a time when a rule set has no admissible rule.

mod author;
mod comment;
mod content;
mod date;
mod lead_image;
mod next_page;
mod text;
mod title;
mod url;

pub use author::extract as author;
pub use comment::extract as comments;
pub use content::extract as content;
pub use date::extract as date_published;
pub use lead_image::extract as lead_image_url;
pub use next_page::extract as next_page_url;
pub use text::{direction, excerpt, word_count};
pub use title::extract as title;
pub use url::extract as url_and_domain;

use dom_query::{Document, NodeRef, Selection};

use crate::dom::{self, strip_tags};
use crate::options::ExtractorOptions;
use crate::resource::meta_value;
use crate::result::ArticleResult;

/// Without site rules there is no dek.
#[must_use]
pub fn dek(_opts: &ExtractorOptions) -> Option<String> {
    None
}

/// Run every generic field extractor over one page.
#[must_use]
pub fn extract(opts: &ExtractorOptions) -> ArticleResult {
    let title = title(opts);
    let date_published = date_published(opts);
    let author = author(opts);
    let content = content(&ExtractorOptions {
        extracted_title: title.as_deref(),
        ..*opts
    });

    let with_content = ExtractorOptions {
        extracted_title: title.as_deref(),
        content: content.as_deref(),
        ..*opts
    };
    let lead_image_url = lead_image_url(&with_content);
    let next_page_url = next_page_url(opts);
    let excerpt = excerpt(&with_content);
    let dek = dek(&ExtractorOptions {
        excerpt: excerpt.as_deref(),
        ..with_content
    });
    let word_count = word_count(content.as_deref());
    let direction = direction(title.as_deref(), content.as_deref());
    let (url, domain) = url_and_domain(opts);

    ArticleResult {
        title,
        content,
        author,
        date_published,
        lead_image_url,
        dek,
        next_page_url,
        url,
        domain,
        excerpt,
        word_count,
        direction,
        ..ArticleResult::default()
    }
}

// ============================================================
// SHARED LOOKUPS
// ============================================================

/// The first usable `meta` value among `names`.
///
/// Names missing from the page's meta cache are skipped; an empty cache
/// means the page was not pre-scanned and every name is looked up.
pub(crate) fn extract_from_meta(
    opts: &ExtractorOptions,
    names: &[&str],
    clean_tags: bool,
) -> Option<String> {
    let present: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| opts.meta_cache.is_empty() || opts.meta_cache.iter().any(|n| n == name))
        .collect();
    let value = meta_value(opts.doc, &present)?;
    Some(if clean_tags { strip_tags(&value) } else { value })
}

/// The text (or markup) of the first selector matching exactly one node
/// with at most `max_children` children, outside any comment block.
pub(crate) fn extract_from_selectors(
    doc: &Document,
    selectors: &[&str],
    max_children: usize,
    text_only: bool,
) -> Option<String> {
    for selector in selectors {
        let nodes = doc.select(selector);
        if nodes.length() != 1 || !is_good_node(&nodes, max_children) {
            continue;
        }
        let content = if text_only {
            nodes.text().trim().to_string()
        } else {
            nodes.html().to_string()
        };
        if !content.is_empty() {
            return Some(content);
        }
    }
    None
}

fn is_good_node(node: &Selection, max_children: usize) -> bool {
    node.children().length() <= max_children && !within_comment(node)
}

/// Whether any ancestor's class or id mentions "comment".
fn within_comment(node: &Selection) -> bool {
    let mut current = node.nodes().first().and_then(NodeRef::parent);
    while let Some(parent) = current {
        if parent.is_element() && dom::class_and_id(&Selection::from(parent)).contains("comment") {
            return true;
        }
        current = parent.parent();
    }
    false
}
