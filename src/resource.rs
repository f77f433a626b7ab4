//! Page resources.
//!
//! Turns a fetched (or caller-supplied) page into normalized HTML that every
//! extraction pass re-parses from: decoded to UTF-8, meta tags unified,
//! lazy images resolved, scripts and forms removed.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{self, Selection};
use crate::encoding::decode_body;
use crate::error::{Error, Result};
use crate::fetch::{FetchedPage, Fetcher};
use crate::patterns::{LAZY_IMAGE_VALUE, LAZY_SRCSET_VALUE};

/// HTML comments, dropped before parsing.
#[allow(clippy::expect_used)]
static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("HTML_COMMENT regex"));

/// Tags removed from every page before extraction.
const TAGS_TO_REMOVE: &str = "script, style, form";

/// Entry points for loading a page.
pub struct Resource;

impl Resource {
    /// Load `url`, or use `prepared` as its body when given.
    ///
    /// A prepared body is treated as `text/html`.
    ///
    /// # Errors
    /// Returns [`Error::Fetch`] when the fetch fails, and the errors of
    /// [`Resource::generate_html`] for unusable bodies.
    pub async fn create(
        url: &str,
        prepared: Option<&str>,
        fetcher: &dyn Fetcher,
        headers: &[(String, String)],
    ) -> Result<String> {
        let page = match prepared {
            Some(body) => FetchedPage::html(body),
            None => fetcher.fetch(url, headers).await?,
        };
        Self::generate_html(&page)
    }

    /// Validate, decode and normalize a fetched page.
    ///
    /// # Errors
    /// [`Error::NotText`] when the content type is missing or mentions
    /// neither `html` nor `text`; [`Error::EmptyDocument`] when the parse
    /// has nothing in its head or body.
    pub fn generate_html(page: &FetchedPage) -> Result<String> {
        let content_type = page.content_type();
        match content_type {
            Some(ct) if ct.contains("html") || ct.contains("text") => {}
            _ => {
                return Err(Error::NotText {
                    content_type: content_type.map(str::to_string),
                })
            }
        }

        let decoded = decode_body(&page.body, content_type);
        Self::prepare_html(&decoded)
    }

    /// Normalize already-decoded HTML.
    ///
    /// # Errors
    /// [`Error::EmptyDocument`] when the parse has nothing in its head or body.
    pub fn prepare_html(html: &str) -> Result<String> {
        let without_comments = HTML_COMMENT.replace_all(html, "");
        let doc = dom::parse(&without_comments);

        if doc.select("head > *").length() == 0 && doc.select("body > *").length() == 0 {
            return Err(Error::EmptyDocument);
        }

        normalize_meta_tags(&doc);
        convert_lazy_loaded_images(&doc);
        doc.select(TAGS_TO_REMOVE).remove();

        Ok(doc.html().to_string())
    }
}

/// `content` becomes `value` and `property` becomes `name`, so every meta
/// lookup reads `meta[name=...]` and its `value`.
pub fn normalize_meta_tags(doc: &dom::Document) {
    for (from, to) in [("content", "value"), ("property", "name")] {
        for meta in doc.select(&format!("meta[{from}]")).iter() {
            if let Some(value) = meta.attr(from) {
                let value = value.to_string();
                meta.set_attr(to, &value);
            }
            meta.remove_attr(from);
        }
    }
}

fn is_link(value: &str) -> bool {
    let value = value.trim_start();
    value.starts_with("http://") || value.starts_with("https://")
}

/// Promote image URLs found in `data-*` style attributes to `src`/`srcset`.
pub fn convert_lazy_loaded_images(doc: &dom::Document) {
    for img in doc.select("img").iter() {
        for (name, value) in dom::get_all_attributes(&img) {
            if !is_link(&value) {
                continue;
            }
            if name != "srcset" && LAZY_SRCSET_VALUE.is_match(&value) {
                img.set_attr("srcset", &value);
            } else if name != "src" && name != "srcset" && LAZY_IMAGE_VALUE.is_match(&value) {
                img.set_attr("src", &value);
            }
        }
    }
}

/// Every distinct `meta[name]` on the page, in document order.
///
/// Computed once per page and handed to the field extractors so that meta
/// lookups skip names the page does not carry.
#[must_use]
pub fn meta_names(doc: &dom::Document) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for meta in doc.select("meta[name]").iter() {
        if let Some(name) = meta.attr("name") {
            let name = name.to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// First `meta[name=...]` value among `names`, in the order given.
///
/// Reads the `value` attribute written by [`normalize_meta_tags`].
#[must_use]
pub fn meta_value(doc: &dom::Document, names: &[&str]) -> Option<String> {
    for name in names {
        let found = doc.select(&format!(r#"meta[name="{name}"]"#));
        // Conflicting values for the same name are ignored.
        let values: Vec<String> = found
            .iter()
            .filter_map(|meta: Selection| meta.attr("value").map(|v| v.trim().to_string()))
            .filter(|v| !v.is_empty())
            .collect();
        if let Some(first) = values.first() {
            if values.iter().all(|v| v == first) {
                return Some(first.clone());
            }
        }
    }
    None
}
