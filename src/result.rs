//! Result types for extraction output.
//!
//! A first-page extraction yields an [`ArticleResult`]; a follow-on page
//! during pagination yields a [`ContentOnlyResult`]. Both serialize to JSON
//! with `serde`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::selector::SelectedValue;

/// Dominant writing direction of an article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

impl TextDirection {
    /// `"ltr"` or `"rtl"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

/// One comment and its replies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Vote score as displayed by the site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,

    /// Posting date, ISO-8601 when it could be parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Comment body.
    pub text: String,

    /// Replies; empty when none were found.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Comment>,
}

/// The merged article record of a first-page extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleResult {
    /// Headline.
    pub title: Option<String>,

    /// Cleaned article body as HTML.
    pub content: Option<String>,

    /// Byline, comma-joined when several authors were found.
    pub author: Option<String>,

    /// Publication date as `YYYY-MM-DDTHH:MM:SS.sssZ`.
    pub date_published: Option<String>,

    /// Absolute URL of the lead image.
    pub lead_image_url: Option<String>,

    /// Subheading.
    pub dek: Option<String>,

    /// URL of the next page of a paginated article.
    pub next_page_url: Option<String>,

    /// Canonical page URL.
    pub url: String,

    /// Host of [`url`](Self::url).
    pub domain: String,

    /// Short plain-text summary.
    pub excerpt: Option<String>,

    /// Whitespace-separated words in the content.
    pub word_count: usize,

    /// Writing direction of the content.
    pub direction: TextDirection,

    /// Pages merged into `content`.
    pub total_pages: usize,

    /// Pages actually rendered into `content`.
    pub pages_rendered: usize,

    /// Comment tree, when the site's rules describe comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,

    /// Site-declared extra fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extended: BTreeMap<String, SelectedValue>,
}

/// What a follow-on page contributes during pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentOnlyResult {
    /// Canonical page URL.
    pub url: String,

    /// Host of [`url`](Self::url).
    pub domain: String,

    /// Cleaned page body as HTML.
    pub content: Option<String>,

    /// URL of the page after this one.
    pub next_page_url: Option<String>,
}

/// Output of one root extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    /// First-page extraction.
    Full(Box<ArticleResult>),
    /// Follow-on page extraction.
    ContentOnly(ContentOnlyResult),
}

impl ExtractionResult {
    /// Extracted content, whichever branch ran.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Full(article) => article.content.as_deref(),
            Self::ContentOnly(page) => page.content.as_deref(),
        }
    }

    /// Next-page link, whichever branch ran.
    #[must_use]
    pub fn next_page_url(&self) -> Option<&str> {
        match self {
            Self::Full(article) => article.next_page_url.as_deref(),
            Self::ContentOnly(page) => page.next_page_url.as_deref(),
        }
    }

    /// The full article, if this was a full extraction.
    #[must_use]
    pub fn into_article(self) -> Option<ArticleResult> {
        match self {
            Self::Full(article) => Some(*article),
            Self::ContentOnly(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_children_omitted_when_empty() {
        let comment = Comment {
            author: Some("pg".into()),
            text: "First".into(),
            ..Comment::default()
        };
        let Ok(json) = serde_json::to_value(&comment) else {
            panic!("comment did not serialize");
        };
        assert!(json.get("children").is_none());
        assert!(json.get("score").is_none());
        assert_eq!(json["author"], "pg");
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        let Ok(json) = serde_json::to_string(&TextDirection::Rtl) else {
            panic!("direction did not serialize");
        };
        assert_eq!(json, "\"rtl\"");
        assert_eq!(TextDirection::default().as_str(), "ltr");
    }

    #[test]
    fn test_extraction_result_accessors() {
        let page = ExtractionResult::ContentOnly(ContentOnlyResult {
            content: Some("<p>x</p>".into()),
            next_page_url: Some("https://example.com/2".into()),
            ..ContentOnlyResult::default()
        });
        assert_eq!(page.content(), Some("<p>x</p>"));
        assert_eq!(page.next_page_url(), Some("https://example.com/2"));
        assert!(page.into_article().is_none());
    }
}
