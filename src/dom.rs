//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate used by the scorer, the cleaners
//! and the selection engine: tag and attribute access, node conversion,
//! relative queries, and isolated fragment documents.

use std::collections::HashSet;

use crate::patterns::{HTML_TAG, NEWLINES, PRESERVE_WHITESPACE_BLOCK, WHITESPACE_RUN};

// Re-export core types for external use
pub use dom_query::{Document, NodeId, NodeRef, Selection};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

/// Attribute used to anchor child-combinator queries to a root node.
const SCOPE_MARKER: &str = "data-article-parser-scope";

// === Parsing ===

/// Parse HTML string into document
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

// === Tag/Node Information ===

/// Get tag name (lowercase) of the first node in the selection
#[must_use]
pub fn tag_name(sel: &Selection) -> Option<String> {
    sel.nodes().first().and_then(node_tag)
}

/// Get tag name (lowercase) of a node
#[must_use]
pub fn node_tag(node: &NodeRef) -> Option<String> {
    if !node.is_element() {
        return None;
    }
    node.node_name().map(|t| t.to_ascii_lowercase())
}

/// Whether the node is an element with one of the given tag names
#[must_use]
pub fn is_tag(node: &NodeRef, tags: &[&str]) -> bool {
    node_tag(node).is_some_and(|t| tags.contains(&t.as_str()))
}

// === Attribute Operations ===

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Get all attributes as key-value pairs
///
/// Returns empty vector if node has no attributes or if selection is empty.
#[must_use]
pub fn get_all_attributes(sel: &Selection) -> Vec<(String, String)> {
    sel.nodes()
        .first()
        .map(|node| {
            node.attrs()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// `class` and `id` joined by a space, the string the hint regexes test
#[must_use]
pub fn class_and_id(sel: &Selection) -> String {
    let class = sel.attr("class").unwrap_or_default();
    let id = sel.attr("id").unwrap_or_default();
    format!("{class} {id}")
}

/// Remove a single class name, dropping the attribute when it ends up empty
pub fn remove_class(sel: &Selection, class: &str) {
    for node in sel.nodes() {
        let one = Selection::from(*node);
        let Some(current) = one.attr("class") else {
            continue;
        };
        let kept: Vec<&str> = current.split_whitespace().filter(|c| *c != class).collect();
        if kept.is_empty() {
            one.remove_attr("class");
        } else {
            one.set_attr("class", &kept.join(" "));
        }
    }
}

/// Add a class name unless already present
pub fn add_class(sel: &Selection, class: &str) {
    for node in sel.nodes() {
        let one = Selection::from(*node);
        match one.attr("class") {
            Some(current) if current.split_whitespace().any(|c| c == class) => {}
            Some(current) if !current.trim().is_empty() => {
                one.set_attr("class", &format!("{} {class}", current.trim()));
            }
            _ => one.set_attr("class", class),
        }
    }
}

// === Text Content ===

/// Get all text content of node and descendants
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Get outer HTML content
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> StrTendril {
    sel.html()
}

/// Number of characters in the node's text
#[must_use]
pub fn text_length(sel: &Selection) -> usize {
    sel.text().chars().count()
}

/// Collapse whitespace runs into single spaces, leaving `pre`, `code` and
/// `textarea` blocks untouched, then trim.
#[must_use]
pub fn normalize_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for block in PRESERVE_WHITESPACE_BLOCK.find_iter(text) {
        out.push_str(&WHITESPACE_RUN.replace_all(&text[last..block.start()], " "));
        out.push_str(block.as_str());
        last = block.end();
    }
    out.push_str(&WHITESPACE_RUN.replace_all(&text[last..], " "));
    out.trim().to_string()
}

/// Remove `\r` and `\n` characters
#[must_use]
pub fn strip_newlines(text: &str) -> String {
    NEWLINES.replace_all(text, "").into_owned()
}

/// Text of an HTML snippet; the input itself when it has no text
#[must_use]
pub fn strip_tags(html: &str) -> String {
    if !HTML_TAG.is_match(html) {
        return html.to_string();
    }
    let doc = parse(&format!("<span>{html}</span>"));
    let text = doc.select("body").text().to_string();
    if text.is_empty() {
        html.to_string()
    } else {
        text
    }
}

// === Tree Navigation ===

/// Get previous element sibling (skipping text nodes)
#[must_use]
pub fn previous_element_sibling<'a>(sel: &Selection<'a>) -> Option<Selection<'a>> {
    sel.nodes().first().and_then(|node| {
        let mut sibling = node.prev_sibling();
        while let Some(s) = sibling {
            if s.is_element() {
                return Some(Selection::from(s));
            }
            sibling = s.prev_sibling();
        }
        None
    })
}

/// Direct element children of a node
#[must_use]
pub fn element_children<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    node.children().into_iter().filter(NodeRef::is_element).collect()
}

/// Direct children that are elements or non-blank text
#[must_use]
pub fn meaningful_children<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    node.children()
        .into_iter()
        .filter(|child| child.is_element() || (child.is_text() && !child.text().trim().is_empty()))
        .collect()
}

/// Whether `node` is still attached below `root`
#[must_use]
pub fn is_attached_below(node: &NodeRef, root: &NodeRef) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.id == root.id {
            return true;
        }
        current = parent.parent();
    }
    false
}

// === Querying ===

/// Query relative to `root`, or the whole document when `root` is `None`.
///
/// A selector starting with `>` is anchored to `root` itself, so
/// `> .child > div` only matches grandchildren of `root`.
#[must_use]
pub fn select_within<'a>(
    doc: &'a Document,
    root: Option<&NodeRef<'a>>,
    selector: &str,
) -> Vec<NodeRef<'a>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Vec::new();
    }
    let Some(root) = root else {
        return doc.select(selector).nodes().to_vec();
    };
    let root_sel = Selection::from(*root);
    if !selector.starts_with('>') {
        return root_sel.select(selector).nodes().to_vec();
    }

    let Some(parent) = root.parent() else {
        return root_sel.select(selector.trim_start_matches('>').trim()).nodes().to_vec();
    };
    root_sel.set_attr(SCOPE_MARKER, "");
    let anchored = format!("[{SCOPE_MARKER}] {selector}");
    let matches = Selection::from(parent).select(&anchored).nodes().to_vec();
    root_sel.remove_attr(SCOPE_MARKER);
    matches
}

/// Keep the first occurrence of every node, preserving order
#[must_use]
pub fn dedupe_nodes<'a>(nodes: Vec<NodeRef<'a>>) -> Vec<NodeRef<'a>> {
    let mut seen: HashSet<NodeId> = HashSet::with_capacity(nodes.len());
    nodes.into_iter().filter(|node| seen.insert(node.id)).collect()
}

// === Tree Manipulation ===

/// Replace a node with one of another tag, keeping attributes and children.
///
/// `noscript` contents are raw text to the parser, so they are re-parsed as
/// markup rather than carried over as a text child.
pub fn convert_node_to(sel: &Selection, tag: &str) {
    let Some(current) = tag_name(sel) else {
        return;
    };
    if current == tag {
        return;
    }
    if current != "noscript" {
        sel.rename(tag);
        return;
    }
    let attrs = get_all_attributes(sel)
        .into_iter()
        .map(|(name, value)| format!(" {name}=\"{}\"", value.replace('"', "&quot;")))
        .collect::<String>();
    let inner = sel.text().to_string();
    sel.replace_with_html(format!("<{tag}{attrs}>{inner}</{tag}>"));
}

// === Isolated Fragments ===

/// Copy the given nodes, in order, into a fresh document under one `div`.
///
/// Nodes are copied as trees rather than re-parsed, so table parts keep
/// their tags. Mutations on the copy never reach the source document.
#[must_use]
pub fn isolate(nodes: &[NodeRef]) -> Document {
    let doc = parse("<div></div>");
    {
        let wrapper = fragment_root(&doc);
        for node in nodes {
            let fragment = node.to_fragment();
            let copied = fragment.root().first_element_child().and_then(|html| html.first_child());
            if let Some(copied) = copied {
                wrapper.append_selection(&Selection::from(copied));
            }
        }
    }
    doc
}

/// The wrapper `div` of a document built by [`isolate`]
#[must_use]
pub fn fragment_root(doc: &Document) -> Selection<'_> {
    doc.select("body > div").first()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name_lowercase() {
        let doc = parse(r#"<DIV id="main">content</DIV>"#);
        assert_eq!(tag_name(&doc.select("div")), Some("div".to_string()));
    }

    #[test]
    fn test_normalize_spaces_keeps_pre() {
        let input = "<p>a   b</p>\n\n<pre>x    y</pre>  end";
        assert_eq!(normalize_spaces(input), "<p>a b</p> <pre>x    y</pre> end");
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>Bold</b> text"), "Bold text");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn test_convert_node_to_keeps_attributes() {
        let doc = parse(r#"<div><span class="x">hello</span></div>"#);
        convert_node_to(&doc.select("span"), "p");
        let p = doc.select("p.x");
        assert!(p.exists());
        assert_eq!(p.text().to_string(), "hello");
    }

    #[test]
    fn test_select_within_child_combinator() {
        let doc = parse(
            r#"<div id="a" class="comment"><div class="child"><div><div class="comment" id="b"></div></div></div></div>
               <div class="child"><div><div class="comment" id="c"></div></div></div>"#,
        );
        let root = doc.select("#a").nodes()[0];
        let found = select_within(&doc, Some(&root), "> .child > div > .comment");
        assert_eq!(found.len(), 1);
        assert_eq!(Selection::from(found[0]).attr("id").map(|s| s.to_string()), Some("b".into()));
        assert!(!doc.select("[data-article-parser-scope]").exists());
    }

    #[test]
    fn test_isolate_does_not_touch_source() {
        let doc = parse(r#"<article><p class="lead">One</p><p>Two</p></article>"#);
        let nodes = doc.select("p").nodes().to_vec();
        let copy = isolate(&nodes);
        let wrapper = fragment_root(&copy);
        assert_eq!(element_children(&wrapper.nodes()[0]).len(), 2);
        copy.select(".lead").remove();
        assert!(doc.select(".lead").exists());
    }

    #[test]
    fn test_isolate_keeps_table_parts() {
        let doc = parse(r#"<table><tr class="row"><td>Keep</td><td class="junk">Drop</td></tr></table>"#);
        let nodes = doc.select("tr.row").nodes().to_vec();
        let copy = isolate(&nodes);
        let wrapper = fragment_root(&copy);
        assert_eq!(copy.select("div > tr.row").length(), 1);
        copy.select(".junk").remove();
        assert_eq!(wrapper.text().trim(), "Keep");
        assert!(doc.select("td.junk").exists());
    }

    #[test]
    fn test_add_and_remove_class() {
        let doc = parse(r#"<div class="a">x</div>"#);
        let div = doc.select("div");
        add_class(&div, "keep");
        assert!(div.has_class("keep"));
        remove_class(&div, "keep");
        assert_eq!(div.attr("class").map(|s| s.to_string()), Some("a".into()));
    }
}
