//! news.ycombinator.com
//!
//! Comment threads are flat table rows; each row's `.ind` cell carries the
//! reply depth in its `indent` attribute.

use dom_query::Selection;
use tracing::warn;

use crate::result::Comment;
use crate::selector::{ChildLevelRules, CommentRules, ExtractionRuleSet, FieldRules, InsertTransform, LegacySelection};

#[must_use]
pub fn rules() -> ExtractionRuleSet {
    ExtractionRuleSet {
        title: Some(legacy([["#pagespace", "title"].into()])),
        author: Some(legacy([".fatitem .hnuser".into()])),
        date_published: Some(legacy([[".fatitem .age", "title"].into()])),
        dek: Some(FieldRules::default()),
        lead_image_url: Some(FieldRules::default()),
        content: Some(
            legacy([[".fatitem tr:nth-of-type(4) td:nth-of-type(2)"].into()]).with_clean(&[".athing", ".subtext"]),
        ),
        comment: Some(CommentRules {
            top_level: legacy([[".comment-tree .comtr tr"].into()]),
            child_level: Some(ChildLevelRules {
                insert_transform: Some(InsertTransform::new(insert_by_indent)),
                ..ChildLevelRules::default()
            }),
            author: Some(legacy([[".hnuser"].into()])),
            score: None,
            date: Some(legacy([[".age", "title"].into()])),
            text: legacy([[".comment .commtext"].into()]).with_clean(&[".reply"]),
        }),
        ..ExtractionRuleSet::new("news.ycombinator.com")
    }
}

fn legacy<const N: usize>(selections: [LegacySelection; N]) -> FieldRules {
    FieldRules::legacy(selections)
}

/// Place `comment` under the most recent comment one level up.
fn insert_by_indent(node: &Selection, comment: Comment, comments: &mut Vec<Comment>) {
    let indent = node
        .select(".ind")
        .first()
        .attr("indent")
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    if indent == 0 {
        comments.push(comment);
        return;
    }

    match find_comment_parent(comments, indent).and_then(|path| comment_at_mut(comments, &path)) {
        Some(parent) => parent.children.push(comment),
        None => {
            warn!(indent, "No parent for indented comment, keeping it at the top level");
            comments.push(comment);
        }
    }
}

/// Path to the latest comment at depth `indent - 1`, searched depth-first
/// from the newest top-level comment.
fn find_comment_parent(comments: &[Comment], indent: usize) -> Option<Vec<usize>> {
    let mut stack: Vec<(Vec<usize>, usize)> = (0..comments.len()).map(|i| (vec![i], 0)).collect();

    while let Some((path, depth)) = stack.pop() {
        if depth + 1 == indent {
            return Some(path);
        }
        let children = comment_at(comments, &path).map_or(0, |c| c.children.len());
        stack.extend((0..children).map(|i| {
            let mut child = path.clone();
            child.push(i);
            (child, depth + 1)
        }));
    }
    None
}

fn comment_at<'c>(comments: &'c [Comment], path: &[usize]) -> Option<&'c Comment> {
    let (first, rest) = path.split_first()?;
    let mut comment = comments.get(*first)?;
    for index in rest {
        comment = comment.children.get(*index)?;
    }
    Some(comment)
}

fn comment_at_mut<'c>(comments: &'c mut [Comment], path: &[usize]) -> Option<&'c mut Comment> {
    let (first, rest) = path.split_first()?;
    let mut comment = comments.get_mut(*first)?;
    for index in rest {
        comment = comment.children.get_mut(*index)?;
    }
    Some(comment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;

    fn named(author: &str) -> Comment {
        Comment {
            author: Some(author.to_string()),
            text: format!("{author} says"),
            ..Comment::default()
        }
    }

    fn insert(html_indent: usize, author: &str, comments: &mut Vec<Comment>) {
        let doc = dom::parse(&format!(
            r#"<table><tr class="row"><td class="ind" indent="{html_indent}"></td><td>x</td></tr></table>"#
        ));
        insert_by_indent(&doc.select("tr.row"), named(author), comments);
    }

    #[test]
    fn test_indent_nesting() {
        let mut comments = Vec::new();
        insert(0, "a", &mut comments);
        insert(1, "b", &mut comments);
        insert(2, "c", &mut comments);
        insert(1, "d", &mut comments);
        insert(0, "e", &mut comments);

        assert_eq!(comments.len(), 2);
        let a = &comments[0];
        assert_eq!(a.children.len(), 2);
        assert_eq!(a.children[0].author.as_deref(), Some("b"));
        assert_eq!(a.children[0].children[0].author.as_deref(), Some("c"));
        assert_eq!(a.children[1].author.as_deref(), Some("d"));
        assert_eq!(comments[1].author.as_deref(), Some("e"));
    }

    #[test]
    fn test_orphan_reply_goes_to_top_level() {
        let mut comments = Vec::new();
        insert(2, "orphan", &mut comments);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author.as_deref(), Some("orphan"));
    }

    #[test]
    fn test_rules_validate() {
        assert!(rules().validate().is_ok());
    }
}
