//! Comment tree construction.
//!
//! Top-level comment nodes are found with the rule set's `top_level`
//! selection and replies with `child_level`, relative to each comment
//! node. Sites whose threads are flat rows with an indentation marker
//! supply an [`InsertTransform`](crate::selector::InsertTransform) that
//! places each comment itself.

use dom_query::{NodeRef, Selection};
use tracing::warn;

use crate::cleaners::clean_date_published;
use crate::dom::{self, normalize_spaces, strip_newlines};
use crate::options::ExtractorOptions;
use crate::result::Comment;
use crate::selector::{
    choose_selection, select_concatenating, ChildLevelRules, CommentRules, Field, FieldRules,
};

/// Build the comment tree described by `rules`.
///
/// Runs on a fresh parse of the page so that node hooks never touch the
/// document the other fields were read from. Returns `None` when no
/// top-level selection is admissible.
#[must_use]
pub fn extract(rules: &CommentRules, opts: &ExtractorOptions) -> Option<Vec<Comment>> {
    let doc = dom::parse(opts.html);
    let opts = ExtractorOptions {
        doc: &doc,
        extract_html: true,
        allow_concatenation: false,
        ..*opts
    };

    let typed = match rules.top_level.resolved_rules(false) {
        Ok(typed) => typed,
        Err(err) => {
            warn!(error = %err, "Ignoring comment selections that cannot be migrated");
            return None;
        }
    };
    let (_, top_level) = choose_selection(&doc, &typed, None)?;

    let builder = CommentBuilder {
        rules,
        child_rules: rules.child_level.as_ref().map(ChildLevelRules::rules),
        opts,
    };
    let mut comments = Vec::new();
    builder.build_group(&top_level, &[], &mut comments);
    Some(comments)
}

struct CommentBuilder<'r, 'a> {
    rules: &'r CommentRules,
    child_rules: Option<FieldRules>,
    opts: ExtractorOptions<'a>,
}

impl<'a> CommentBuilder<'_, 'a> {
    /// Build one level of comments. Without an insert hook each comment is
    /// appended to the group at `path` in the tree; with one, the hook
    /// places it.
    fn build_group(&self, nodes: &[NodeRef<'a>], path: &[usize], comments: &mut Vec<Comment>) {
        let hooks = self.rules.child_level.as_ref();

        for node in nodes {
            let sel = Selection::from(*node);
            if let Some(hook) = hooks.and_then(|h| h.node_transform.as_ref()) {
                hook.call(&sel, comments);
            }

            let Some(comment) = self.read_comment(node) else {
                continue;
            };

            let child_path = match hooks.and_then(|h| h.insert_transform.as_ref()) {
                Some(hook) => {
                    hook.call(&sel, comment, comments);
                    Vec::new()
                }
                None => {
                    let group = group_at(comments, path);
                    group.push(comment);
                    let mut child_path = path.to_vec();
                    child_path.push(group.len() - 1);
                    child_path
                }
            };

            self.build_children(node, &child_path, comments);
        }
    }

    fn build_children(&self, node: &NodeRef<'a>, path: &[usize], comments: &mut Vec<Comment>) {
        let Some(child_rules) = &self.child_rules else {
            return;
        };
        let Ok(typed) = child_rules.resolved_rules(false) else {
            return;
        };
        if let Some((_, replies)) = choose_selection(self.opts.doc, &typed, Some(node)) {
            self.build_group(&replies, path, comments);
        }
    }

    /// The comment at `node`, or `None` when it has no text.
    fn read_comment(&self, node: &NodeRef<'a>) -> Option<Comment> {
        let text = self.field(&self.rules.text, node, true)?;
        let text_only = |rules: &Option<FieldRules>| rules.as_ref().and_then(|r| self.field(r, node, false));

        Some(Comment {
            author: text_only(&self.rules.author),
            score: text_only(&self.rules.score),
            date: text_only(&self.rules.date).and_then(|date| clean_date_published(&date)),
            text,
            children: Vec::new(),
        })
    }

    fn field(&self, rules: &FieldRules, node: &NodeRef<'a>, extract_html: bool) -> Option<String> {
        let opts = ExtractorOptions {
            extract_html,
            ..self.opts
        };
        let value = select_concatenating(&Field::Comment, rules, &opts, Some(node)).into_value()?;
        let value = strip_newlines(&normalize_spaces(&value.join(",")));
        (!value.is_empty()).then_some(value)
    }
}

/// The reply list at `path`, stopping early at any index that no longer
/// exists.
fn group_at<'c>(comments: &'c mut Vec<Comment>, path: &[usize]) -> &'c mut Vec<Comment> {
    let mut group = comments;
    for index in path {
        if *index >= group.len() {
            break;
        }
        group = &mut group[*index].children;
    }
    group
}
