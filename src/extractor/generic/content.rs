//! Generic article body extraction.
//!
//! The page is scored, the best region chosen and cleaned. If the region
//! holds too little text the scorer runs again on a fresh parse with the
//! next, more permissive [`GenericContentOptions`] set.

use dom_query::{NodeRef, Selection};
use tracing::debug;

use crate::cleaners::{clean_content, ContentCleanOptions};
use crate::dom::{self, normalize_spaces};
use crate::html_processing::{convert_to_paragraphs, document_base_href, strip_unlikely_candidates};
use crate::options::{ExtractorOptions, GenericContentOptions};
use crate::scoring::{find_top_candidate, merge_siblings, score_content, ScoreTable};

/// Regions with fewer characters of text trigger the next cascade step.
const MIN_CONTENT_LENGTH: usize = 100;

/// The cleaned article body as HTML.
///
/// Returns the last attempt when no option set yields enough text, and
/// `None` only when nothing could be selected at all.
#[must_use]
pub fn extract(opts: &ExtractorOptions) -> Option<String> {
    let mut last = None;
    for (attempt, options) in GenericContentOptions::cascade().into_iter().enumerate() {
        if attempt > 0 {
            debug!(url = opts.url, ?options, "content too short, rescoring");
        }
        let Some((html, length)) = extract_with(opts, options) else {
            continue;
        };
        if length >= MIN_CONTENT_LENGTH {
            return Some(html);
        }
        last = Some(html);
    }
    last
}

/// One pass of the cascade: the cleaned region's markup and text length.
fn extract_with(opts: &ExtractorOptions, options: GenericContentOptions) -> Option<(String, usize)> {
    let doc = dom::parse(opts.html);

    if options.strip_unlikely_candidates {
        strip_unlikely_candidates(&doc);
    }
    convert_to_paragraphs(&doc);

    let mut table = ScoreTable::new();
    score_content(&doc, &mut table, options.weight_nodes);

    let candidate = find_top_candidate(&doc, &table)?;
    let top_score = table.get(&candidate).unwrap_or_default();
    let region: NodeRef = merge_siblings(candidate, top_score, &table);

    let base_href = document_base_href(&doc);
    let region = Selection::from(region);
    clean_content(
        &region,
        &mut table,
        &ContentCleanOptions {
            title: opts.extracted_title.unwrap_or_default(),
            url: opts.url,
            base_href: base_href.as_deref(),
            clean_conditionally: options.clean_conditionally,
            default_cleaner: true,
        },
    );

    let length = region.text().trim().chars().count();
    Some((normalize_spaces(&region.html()), length))
}
