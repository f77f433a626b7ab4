//! Declarative selection rules and the engine that evaluates them.
//!
//! A site's [`ExtractionRuleSet`] maps each [`Field`] to an ordered list of
//! [`SelectionRule`]s. [`select`] walks that list, takes the first rule
//! whose [`Selector`] is admissible for its variant, and turns the matches
//! into a [`SelectedValue`]. When nothing is admissible the result is
//! [`SelectionResult::Error`], which callers use to decide on fallback.
//!
//! # Example
//!
//! ```rust
//! use rs_article_parser::dom;
//! use rs_article_parser::options::ExtractorOptions;
//! use rs_article_parser::selector::{select, Field, FieldRules, SelectedValue, SelectionRule};
//!
//! let doc = dom::parse(r#"<h1 class="headline">Hello</h1><h1>Other</h1>"#);
//! let opts = ExtractorOptions::new(&doc, "", "https://example.com/a");
//! let rules = FieldRules::new(vec![SelectionRule::exactly_one("h1.headline")]);
//!
//! let value = select(&Field::Title, &rules, &opts, None).into_value();
//! assert_eq!(value, Some(SelectedValue::Single("Hello".to_string())));
//! ```

mod engine;
mod migration;
mod rules;

pub use engine::{choose_selection, select, select_concatenating, select_extended};
pub use migration::{migrate_selections, LegacySelection};
pub use rules::{
    ChildLevelRules, CommentRules, ExtractionRuleSet, FieldRules, InsertTransform, NodeTransform,
    SelectionEntry, SelectionRule, Selector, Transform, ValueTransform,
};

use serde::{Deserialize, Serialize};

/// A named field of the article record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Author,
    DatePublished,
    Dek,
    LeadImageUrl,
    Content,
    NextPageUrl,
    Excerpt,
    UrlAndDomain,
    /// A sub-field of a comment (`author`, `text`, ...).
    Comment,
    /// A site-declared `extend` field.
    Extended(String),
}

impl Field {
    /// The field's key in rule sets and results.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::DatePublished => "date_published",
            Self::Dek => "dek",
            Self::LeadImageUrl => "lead_image_url",
            Self::Content => "content",
            Self::NextPageUrl => "next_page_url",
            Self::Excerpt => "excerpt",
            Self::UrlAndDomain => "url_and_domain",
            Self::Comment => "comment",
            Self::Extended(name) => name,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A successfully selected value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectedValue {
    /// One string: text, markup or an attribute value.
    Single(String),
    /// One entry per match (`multiArray`).
    Multiple(Vec<String>),
}

impl SelectedValue {
    /// The value as one string, joining multiple entries with `separator`.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        match self {
            Self::Single(value) => value.clone(),
            Self::Multiple(values) => values.join(separator),
        }
    }

    /// The single value, or the first entry.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(values) => values.first().map(String::as_str),
        }
    }

    /// Whether there is nothing but whitespace in the value.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Single(value) => value.trim().is_empty(),
            Self::Multiple(values) => values.iter().all(|v| v.trim().is_empty()),
        }
    }
}

/// Outcome of [`select`].
///
/// `Content(None)` is a success with no usable value (the cleaner rejected
/// it, for example) and must not trigger fallback. `Error` means no rule
/// was admissible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionResult {
    Content(Option<SelectedValue>),
    Error,
}

impl SelectionResult {
    /// Whether no rule was admissible.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// The selected value, if any.
    #[must_use]
    pub fn into_value(self) -> Option<SelectedValue> {
        match self {
            Self::Content(value) => value,
            Self::Error => None,
        }
    }
}
