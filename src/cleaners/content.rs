use dom_query::Selection;

use crate::html_processing::{
    clean_attributes, clean_h_ones, clean_headers, clean_images, clean_tags, make_links_absolute,
    mark_to_keep, remove_empty, rewrite_top_level, strip_junk_tags,
};
use crate::scoring::ScoreTable;

/// Settings for [`clean_content`].
#[derive(Debug, Clone, Copy)]
pub struct ContentCleanOptions<'a> {
    /// Resolved title; headers repeating it are removed.
    pub title: &'a str,
    /// Page URL for link resolution and same-host embeds.
    pub url: &'a str,
    /// The page's `<base href>`, if any.
    pub base_href: Option<&'a str>,
    /// Run the conditional cleaner.
    pub clean_conditionally: bool,
    /// Run the aggressive passes (image and conditional cleaning).
    pub default_cleaner: bool,
}

/// Clean an article region in place.
///
/// `table` holds the scores of the pass that chose the region; the
/// conditional cleaner reuses them and scores whatever is missing.
pub fn clean_content(region: &Selection, table: &mut ScoreTable, opts: &ContentCleanOptions) {
    rewrite_top_level(region);

    if opts.default_cleaner {
        clean_images(region);
    }

    make_links_absolute(region, opts.url, opts.base_href);
    mark_to_keep(region, opts.url);
    strip_junk_tags(region);
    clean_h_ones(region);
    clean_headers(region, opts.title);

    if opts.default_cleaner && opts.clean_conditionally {
        clean_tags(region, table);
    }

    remove_empty(region);
    clean_attributes(region);
}
