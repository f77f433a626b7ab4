//! Error types for rs-article-parser.
//!
//! Only structurally invalid input surfaces here. A selection that matches
//! nothing is a [`SelectionResult::Error`](crate::selector::SelectionResult)
//! value, and a failed follow-on page simply ends pagination.

use crate::fetch::FetchError;

/// Error type for parse and extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The resource's content type is neither HTML nor text.
    #[error("Content does not appear to be text (content-type: {content_type:?})")]
    NotText {
        /// The offending `content-type` header, if any was sent.
        content_type: Option<String>,
    },

    /// The parsed document has no head or body children.
    #[error("No children, likely a bad parse")]
    EmptyDocument,

    /// The first page could not be fetched.
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The page URL is not a valid absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A legacy selection array carried a transform element.
    #[error("Unmigrated transformed selection: {0}")]
    UnmigratedSelection(String),

    /// A rule set declared selections for a field derived from the content.
    #[error("Field is derived from the content and cannot be selected: {0}")]
    DerivedField(String),

    /// A JSON rule set failed to deserialize.
    #[error("Invalid rule set: {0}")]
    Rules(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error means the input itself was malformed.
    #[must_use]
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::NotText { .. } | Self::EmptyDocument)
    }
}

/// Result type alias for parse operations.
pub type Result<T> = std::result::Result<T, Error>;
