//! Link Density
//!
//! Ratio of anchor text to total text in a node. Menus, tag clouds and
//! "related stories" blocks are rich in links; prose is not.

use dom_query::Selection;

use crate::dom;

/// Collect the total trimmed text length of all anchors below `element`.
fn collect_link_length(element: &Selection) -> usize {
    element
        .select("a")
        .iter()
        .map(|link| {
            let text = dom::text_content(&link);
            text.trim().chars().count()
        })
        .sum()
}

/// Link text length divided by the node's total text length.
///
/// A node whose text is empty but whose links are not (image links with
/// titles, for instance) is all link, so the density is 1.
#[must_use]
pub fn link_density(element: &Selection) -> f64 {
    let text = dom::text_content(element);
    let total = text.trim().chars().count();
    let link_length = collect_link_length(element);

    if total > 0 {
        link_length as f64 / total as f64
    } else if link_length > 0 {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    #[test]
    fn test_no_links() {
        let doc = parse("<div><p>Plain prose with no anchors at all.</p></div>");
        assert_eq!(link_density(&doc.select("div")), 0.0);
    }

    #[test]
    fn test_half_links() {
        let doc = parse(r#"<div>abcd<a href="/x">efgh</a></div>"#);
        assert!((link_density(&doc.select("div")) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_all_links() {
        let doc = parse(r#"<ul><li><a href="/a">One</a></li><li><a href="/b">Two</a></li></ul>"#);
        assert!((link_density(&doc.select("ul")) - 1.0).abs() < f64::EPSILON);
    }
}
