//! Field cleaners.
//!
//! Each field has an optional default cleaner that post-processes the value
//! a selection produced. String cleaners take and return text; DOM cleaners
//! (`content`, `comment`) rework a fragment in place before it is
//! serialized.

mod author;
mod comment;
mod content;
mod date;
mod dek;
mod lead_image;
mod title;

pub use author::clean_author;
pub use comment::clean_comment;
pub use content::{clean_content, ContentCleanOptions};
pub use date::{clean_date_published, parse_date};
pub use dek::clean_dek;
pub use lead_image::clean_image;
pub use title::{clean_title, resolve_split_title};

use crate::options::ExtractorOptions;
use crate::selector::Field;

/// The first `words` whitespace-separated words of `content`.
#[must_use]
pub fn excerpt_content(content: &str, words: usize) -> String {
    content
        .split_whitespace()
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run the string cleaner registered for `field`, if any.
///
/// Fields without a string cleaner pass through unchanged. `None` means
/// the cleaner rejected the value.
#[must_use]
pub fn clean_field(field: &Field, value: &str, opts: &ExtractorOptions) -> Option<String> {
    match field {
        Field::Author => Some(clean_author(value)),
        Field::Title => Some(clean_title(value, opts.url, opts.doc)),
        Field::DatePublished => clean_date_published(value),
        Field::Dek => clean_dek(value, opts.excerpt),
        Field::LeadImageUrl => clean_image(value),
        _ => Some(value.to_string()),
    }
}

/// Whether `field` has a string cleaner.
#[must_use]
pub fn has_string_cleaner(field: &Field) -> bool {
    matches!(
        field,
        Field::Author | Field::Title | Field::DatePublished | Field::Dek | Field::LeadImageUrl
    )
}
