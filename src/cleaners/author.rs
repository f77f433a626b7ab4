use crate::dom::normalize_spaces;
use crate::patterns::CLEAN_AUTHOR_RE;

/// Strip a `By`/`Posted by`/`Written by` prefix and normalize spaces.
#[must_use]
pub fn clean_author(author: &str) -> String {
    let stripped = CLEAN_AUTHOR_RE.replace(author, "$2");
    normalize_spaces(stripped.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_author() {
        assert_eq!(clean_author("By Jane Doe"), "Jane Doe");
        assert_eq!(clean_author("  posted by:   Jane   Doe "), "Jane Doe");
        assert_eq!(clean_author("Written by John"), "John");
        assert_eq!(clean_author("Jane Doe"), "Jane Doe");
    }
}
