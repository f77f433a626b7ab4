use dom_query::{NodeRef, Selection};

use crate::html_processing::clean_wrapping_tags;

/// Unwrap the wrapper chain around a comment body.
///
/// Returns the innermost meaningful node, or `None` when the comment turned
/// out to be empty.
#[must_use]
pub fn clean_comment<'a>(fragment: &Selection<'a>) -> Option<NodeRef<'a>> {
    let root = fragment.nodes().first().copied()?;
    clean_wrapping_tags(root)
}
