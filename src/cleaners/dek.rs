use crate::dom::{normalize_spaces, strip_tags};
use crate::patterns::HAS_URL;

use super::excerpt_content;

/// Validate and clean a dek (subheading).
///
/// Rejects decks that are implausibly short or long, that merely repeat the
/// excerpt's opening, or that contain a plain-text link.
#[must_use]
pub fn clean_dek(dek: &str, excerpt: Option<&str>) -> Option<String> {
    let length = dek.chars().count();
    if !(5..=1000).contains(&length) {
        return None;
    }

    if let Some(excerpt) = excerpt {
        if excerpt_content(excerpt, 10) == excerpt_content(dek, 10) {
            return None;
        }
    }

    let text = strip_tags(dek);
    if HAS_URL.is_match(&text) {
        return None;
    }

    Some(normalize_spaces(text.trim()))
}
