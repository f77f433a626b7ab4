use dom_query::{Document, NodeRef, Selection};

use crate::dom::{self, normalize_spaces, select_within};
use crate::options::ExtractorOptions;
use crate::result::Comment;

const TOP_LEVEL_SELECTOR: &str = ".commentarea > div > .comment";
const CHILD_SELECTOR: &str = "> .child > div > .comment";

/// Threaded comments in the common `.commentarea` layout.
///
/// Returns `None` when the page has no such comments.
#[must_use]
pub fn extract(opts: &ExtractorOptions) -> Option<Vec<Comment>> {
    let doc = dom::parse(opts.html);
    let comments: Vec<Comment> = select_within(&doc, None, TOP_LEVEL_SELECTOR)
        .iter()
        .map(|node| build_comment(&doc, node))
        .collect();
    (!comments.is_empty()).then_some(comments)
}

fn build_comment<'a>(doc: &'a Document, node: &NodeRef<'a>) -> Comment {
    let first_text = |selector: &str| {
        select_within(doc, Some(node), selector)
            .first()
            .map(|found| Selection::from(*found).text().trim().to_string())
            .filter(|text| !text.is_empty())
    };

    Comment {
        author: first_text(".author"),
        score: first_text(".score.unvoted"),
        date: None,
        text: normalize_spaces(&first_text(".usertext-body").unwrap_or_default()),
        children: select_within(doc, Some(node), CHILD_SELECTOR)
            .iter()
            .map(|child| build_comment(doc, child))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threaded_comments() {
        let html = r#"<div class="commentarea"><div>
            <div class="comment"><span class="author">alice</span><span class="score unvoted">12 points</span>
              <div class="usertext-body">Top   level</div>
              <div class="child"><div>
                <div class="comment"><span class="author">bob</span><div class="usertext-body">Reply</div></div>
              </div></div>
            </div>
            <div class="comment"><span class="author">carol</span><div class="usertext-body">Second</div></div>
        </div></div>"#;
        let doc = dom::parse(html);
        let Some(comments) = extract(&ExtractorOptions::new(&doc, html, "https://example.com/")) else {
            panic!("no comments");
        };

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].author.as_deref(), Some("alice"));
        assert_eq!(comments[0].score.as_deref(), Some("12 points"));
        assert_eq!(comments[0].text, "Top level");
        assert_eq!(comments[0].children.len(), 1);
        assert_eq!(comments[0].children[0].author.as_deref(), Some("bob"));
        assert_eq!(comments[1].text, "Second");
        assert!(comments[1].children.is_empty());
    }

    #[test]
    fn test_no_comment_area() {
        let html = "<p>No discussion here</p>";
        let doc = dom::parse(html);
        assert!(extract(&ExtractorOptions::new(&doc, html, "https://example.com/")).is_none());
    }
}
