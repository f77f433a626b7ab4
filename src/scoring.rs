//! Node Scoring
//!
//! Heuristic relevance scores for DOM nodes. Paragraph-like nodes are scored
//! on their prose (commas, length); containers on their tag and class/id
//! hints. Scores propagate upward so that the container holding the most
//! prose ends up with the highest score.
//!
//! Scores live in a [`ScoreTable`] keyed by `NodeId`, owned by one
//! extraction attempt on one parsed document. Nothing is written to the DOM.

use std::collections::HashMap;

use dom_query::{Document, NodeId, NodeRef, Selection};

use crate::dom::{self, convert_node_to, node_tag};
use crate::link_density::link_density;
use crate::patterns::{
    BAD_TAGS, CHILD_CONTENT_TAGS, HNEWS_CONTENT_SELECTORS, NEGATIVE_SCORE_HINTS,
    NON_TOP_CANDIDATE_TAGS, PARAGRAPH_SCORE_TAGS, PHOTO_HINTS, POSITIVE_SCORE_HINTS,
    READABILITY_ASSET, SENTENCE_END,
};

/// Bonus for the parent of a known content idiom (`.hentry .entry-content`).
const HNEWS_BONUS: f64 = 80.0;

/// Per-node scores for one extraction attempt.
#[derive(Debug, Default, Clone)]
pub struct ScoreTable {
    scores: HashMap<NodeId, f64>,
}

impl ScoreTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored score of a node.
    #[must_use]
    pub fn get(&self, node: &NodeRef) -> Option<f64> {
        self.scores.get(&node.id).copied()
    }

    /// Stored non-zero score; a zero score counts as unscored.
    fn scored(&self, node: &NodeRef) -> Option<f64> {
        self.get(node).filter(|score| *score != 0.0)
    }

    /// Overwrite the score of a node.
    pub fn set(&mut self, node: &NodeRef, score: f64) {
        self.scores.insert(node.id, score);
    }

    /// Whether a node has been scored.
    #[must_use]
    pub fn contains(&self, node: &NodeRef) -> bool {
        self.scores.contains_key(&node.id)
    }

    /// Number of scored nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether nothing has been scored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The stored score, or a freshly computed one when the node is
    /// unscored or scored zero.
    ///
    /// A fresh score is the node's own tag score (plus its class/id weight
    /// when `weight_nodes`), and a quarter of it is credited to the parent.
    /// The node itself is not stored; callers that want it stored call
    /// [`set`](Self::set). Parents that were never scored are initialised
    /// the same way on the way up.
    pub fn get_or_init(&mut self, node: &NodeRef, weight_nodes: bool) -> f64 {
        if let Some(score) = self.scored(node) {
            return score;
        }

        // Walk up through unscored ancestors, collecting their base scores.
        let own = base_score(node, weight_nodes);
        let mut child_base = own;
        let mut current = element_parent(node);
        while let Some(parent) = current {
            if let Some(existing) = self.scored(&parent) {
                self.set(&parent, existing + child_base * 0.25);
                break;
            }
            let parent_base = base_score(&parent, weight_nodes);
            self.set(&parent, parent_base + child_base * 0.25);
            child_base = parent_base;
            current = element_parent(&parent);
        }
        own
    }

    /// Add `amount` to a node's score, initialising it first if needed.
    pub fn add_score(&mut self, node: &NodeRef, amount: f64, weight_nodes: bool) {
        let score = self.get_or_init(node, weight_nodes);
        self.set(node, score + amount);
    }
}

fn element_parent<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.parent().filter(NodeRef::is_element)
}

fn base_score(node: &NodeRef, weight_nodes: bool) -> f64 {
    let sel = Selection::from(*node);
    let mut score = score_node(&sel);
    if weight_nodes {
        score += f64::from(get_weight(&sel));
    }
    score
}

// === Node Scores ===

/// Number of commas in a piece of text.
#[must_use]
pub fn score_commas(text: &str) -> usize {
    text.matches(',').count()
}

/// Length bonus for paragraph text, between 0 and 3.
///
/// `p` and `pre` need more than 100 characters before earning anything.
#[must_use]
pub fn score_length(text_length: usize, tag: &str) -> f64 {
    let chunks = text_length as f64 / 50.0;
    if chunks <= 0.0 {
        return 0.0;
    }
    let bonus = if tag == "p" || tag == "pre" {
        chunks - 2.0
    } else {
        chunks - 1.25
    };
    bonus.clamp(0.0, 3.0)
}

/// Score a paragraph-like node by its prose.
///
/// Fragments under 25 characters score 0. Otherwise the score starts at 1
/// and grows with commas and length; a trailing colon costs a point since
/// such paragraphs usually introduce something else.
#[must_use]
pub fn score_paragraph(node: &Selection) -> f64 {
    let text = node.text();
    let text = text.trim();
    let text_length = text.chars().count();

    if text_length < 25 {
        return 0.0;
    }

    let tag = dom::tag_name(node).unwrap_or_default();
    let mut score = 1.0;
    score += score_commas(text) as f64;
    score += score_length(text_length, &tag);
    if text.ends_with(':') {
        score -= 1.0;
    }
    score
}

/// Tag-based score of a node.
#[must_use]
pub fn score_node(node: &Selection) -> f64 {
    let Some(tag) = dom::tag_name(node) else {
        return 0.0;
    };
    let tag = tag.as_str();

    if PARAGRAPH_SCORE_TAGS.contains(&tag) {
        score_paragraph(node)
    } else if tag == "div" {
        5.0
    } else if CHILD_CONTENT_TAGS.contains(&tag) {
        3.0
    } else if BAD_TAGS.contains(&tag) {
        -3.0
    } else if tag == "th" {
        -5.0
    } else {
        0.0
    }
}

/// Class/id weight of a node.
///
/// The id is checked first; classes only count when the id said nothing.
/// Photo containers and publisher content assets are rewarded regardless.
#[must_use]
pub fn get_weight(node: &Selection) -> i32 {
    let mut score = 0;

    if let Some(id) = node.attr("id").filter(|id| !id.is_empty()) {
        if POSITIVE_SCORE_HINTS.is_match(&id) {
            score += 25;
        }
        if NEGATIVE_SCORE_HINTS.is_match(&id) {
            score -= 25;
        }
    }

    if let Some(classes) = node.attr("class").filter(|c| !c.is_empty()) {
        if score == 0 {
            if POSITIVE_SCORE_HINTS.is_match(&classes) {
                score += 25;
            }
            if NEGATIVE_SCORE_HINTS.is_match(&classes) {
                score -= 25;
            }
        }
        if PHOTO_HINTS.is_match(&classes) {
            score += 10;
        }
        if READABILITY_ASSET.is_match(&classes) {
            score += 25;
        }
    }

    score
}

// === Document Scoring ===

/// Add to a node's score, turning a `span` into a `div` first. Nodes with no
/// parent (the document root) are left alone.
fn add_score_to(table: &mut ScoreTable, node: &NodeRef, amount: f64, weight_nodes: bool) {
    if node.parent().is_none() || !node.is_element() {
        return;
    }
    if node_tag(node).as_deref() == Some("span") {
        convert_node_to(&Selection::from(*node), "div");
    }
    table.add_score(node, amount, weight_nodes);
}

fn score_paragraphs(doc: &Document, table: &mut ScoreTable, weight_nodes: bool) {
    let paragraphs: Vec<NodeRef> = doc.select("p, pre").nodes().to_vec();
    for node in paragraphs {
        if table.contains(&node) {
            continue;
        }
        let score = table.get_or_init(&node, weight_nodes);
        table.set(&node, score);

        let raw = score_node(&Selection::from(node));
        if let Some(parent) = node.parent() {
            add_score_to(table, &parent, raw, weight_nodes);
            if let Some(grandparent) = parent.parent() {
                add_score_to(table, &grandparent, raw / 2.0, weight_nodes);
            }
        }
    }
}

/// Score every paragraph of a document and propagate to ancestors.
///
/// Known content idioms first give their parent a flat bonus. Paragraphs
/// then credit their full score to the parent and half to the grandparent.
/// The paragraph pass runs twice; the second pass only reaches paragraphs
/// the first one did not score.
pub fn score_content(doc: &Document, table: &mut ScoreTable, weight_nodes: bool) {
    for (parent_selector, child_selector) in HNEWS_CONTENT_SELECTORS {
        let matches: Vec<NodeRef> = doc
            .select(&format!("{parent_selector} {child_selector}"))
            .nodes()
            .to_vec();
        for node in matches {
            let Some(parent) = element_parent(&node) else {
                continue;
            };
            if Selection::from(parent).is(parent_selector) {
                table.add_score(&parent, HNEWS_BONUS, weight_nodes);
            }
        }
    }

    score_paragraphs(doc, table, weight_nodes);
    score_paragraphs(doc, table, weight_nodes);
}

// === Candidates ===

/// The highest-scoring node, ignoring inline and void tags; `body` when
/// nothing was scored.
#[must_use]
pub fn find_top_candidate<'a>(doc: &'a Document, table: &ScoreTable) -> Option<NodeRef<'a>> {
    let mut top: Option<(NodeRef<'a>, f64)> = None;
    for node in doc.select("*").nodes() {
        let Some(score) = table.get(node) else {
            continue;
        };
        if dom::is_tag(node, NON_TOP_CANDIDATE_TAGS) {
            continue;
        }
        if top.as_ref().is_none_or(|(_, best)| score > *best) {
            top = Some((*node, score));
        }
    }

    top.map(|(node, _)| node)
        .or_else(|| doc.select("body").nodes().first().copied())
        .or_else(|| doc.select("*").nodes().first().copied())
}

fn sibling_qualifies(
    sibling: &NodeRef,
    sibling_score: f64,
    candidate_class: Option<&str>,
    top_score: f64,
    threshold: f64,
) -> bool {
    let sel = Selection::from(*sibling);
    let density = link_density(&sel);

    let mut bonus = 0.0;
    if density < 0.05 {
        bonus += 20.0;
    }
    if density >= 0.5 {
        bonus -= 20.0;
    }
    if sel.attr("class").as_deref() == candidate_class {
        bonus += top_score * 0.2;
    }
    if sibling_score + bonus >= threshold {
        return true;
    }

    if node_tag(sibling).as_deref() == Some("p") {
        let text = sel.text();
        let length = text.chars().count();
        if length > 80 && density < 0.25 {
            return true;
        }
        if length <= 80 && density == 0.0 && SENTENCE_END.is_match(&text) {
            return true;
        }
    }
    false
}

/// Pull in siblings of the top candidate that look like more of the same
/// article (split articles, figures next to the text).
///
/// Returns the candidate itself when no sibling qualifies. Otherwise the
/// candidate's parent is reduced to the qualifying children and turned
/// into a plain `div`, which becomes the content region.
pub fn merge_siblings<'a>(
    candidate: NodeRef<'a>,
    top_score: f64,
    table: &ScoreTable,
) -> NodeRef<'a> {
    let Some(parent) = element_parent(&candidate) else {
        return candidate;
    };

    let threshold = f64::max(10.0, top_score * 0.25);
    let candidate_class = Selection::from(candidate).attr("class").map(|c| c.to_string());

    let mut keep: Vec<NodeId> = Vec::new();
    for sibling in dom::element_children(&parent) {
        if dom::is_tag(&sibling, NON_TOP_CANDIDATE_TAGS) {
            continue;
        }
        let Some(sibling_score) = table.get(&sibling).filter(|s| *s != 0.0) else {
            continue;
        };
        if sibling.id == candidate.id
            || sibling_qualifies(
                &sibling,
                sibling_score,
                candidate_class.as_deref(),
                top_score,
                threshold,
            )
        {
            keep.push(sibling.id);
        }
    }

    if keep.len() <= 1 {
        return candidate;
    }

    for child in parent.children() {
        if !keep.contains(&child.id) {
            Selection::from(child).remove();
        }
    }
    let wrapper = Selection::from(parent);
    for (name, _) in dom::get_all_attributes(&wrapper) {
        wrapper.remove_attr(&name);
    }
    convert_node_to(&wrapper, "div");
    parent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    const LONG_P: &str = "This paragraph has plenty of prose, with commas, clauses, and enough length to count as real article content for the scorer.";

    #[test]
    fn test_score_paragraph_short_text_is_zero() {
        let doc = parse("<p>Too short.</p>");
        assert_eq!(score_paragraph(&doc.select("p")), 0.0);
    }

    #[test]
    fn test_score_paragraph_counts_commas_and_length() {
        let doc = parse(&format!("<p>{LONG_P}</p>"));
        let len = LONG_P.chars().count() as f64;
        let expected = 1.0 + 3.0 + (len / 50.0 - 2.0).clamp(0.0, 3.0);
        assert!((score_paragraph(&doc.select("p")) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_score_paragraph_trailing_colon() {
        let doc = parse("<p>Here are the reasons why this matters:</p>");
        assert_eq!(score_paragraph(&doc.select("p")), 0.0);
    }

    #[test]
    fn test_score_node_by_tag() {
        let doc = parse("<div></div><form></form><table><tr><th>h</th><td>d</td></tr></table>");
        assert_eq!(score_node(&doc.select("div")), 5.0);
        assert_eq!(score_node(&doc.select("form")), -3.0);
        assert_eq!(score_node(&doc.select("th")), -5.0);
        assert_eq!(score_node(&doc.select("td")), 3.0);
        assert_eq!(score_node(&doc.select("table")), 0.0);
    }

    #[test]
    fn test_get_weight() {
        let doc = parse(
            r#"<div id="article-body"></div><div class="sidebar"></div><div id="x" class="photo"></div>"#,
        );
        assert_eq!(get_weight(&doc.select("#article-body")), 25);
        assert_eq!(get_weight(&doc.select(".sidebar")), -25);
        assert_eq!(get_weight(&doc.select(".photo")), 10);
    }

    #[test]
    fn test_score_content_propagates_to_parent_and_grandparent() {
        let doc = parse(&format!(
            r#"<div id="outer"><div id="inner"><p>{LONG_P}</p><p>{LONG_P}</p></div></div>"#
        ));
        let mut table = ScoreTable::new();
        score_content(&doc, &mut table, false);

        let inner = doc.select("#inner").nodes()[0];
        let outer = doc.select("#outer").nodes()[0];
        let inner_score = table.get(&inner).unwrap_or_default();
        let outer_score = table.get(&outer).unwrap_or_default();
        assert!(inner_score > outer_score);
        assert!(outer_score > 0.0);
    }

    #[test]
    fn test_hnews_bonus() {
        let doc = parse(r#"<div class="hentry"><div class="entry-content"><p>x</p></div></div>"#);
        let mut table = ScoreTable::new();
        score_content(&doc, &mut table, false);
        let hentry = doc.select(".hentry").nodes()[0];
        assert!(table.get(&hentry).unwrap_or_default() >= HNEWS_BONUS);
    }

    #[test]
    fn test_span_parent_becomes_div() {
        let doc = parse(&format!(r#"<div><span id="s"><p>{LONG_P}</p></span></div>"#));
        let mut table = ScoreTable::new();
        score_content(&doc, &mut table, false);
        assert!(doc.select("div#s").exists());
    }

    #[test]
    fn test_top_candidate_skips_void_tags() {
        let doc = parse(&format!(r#"<div id="a"><p>{LONG_P}</p></div><img src="x.png">"#));
        let mut table = ScoreTable::new();
        score_content(&doc, &mut table, false);
        let img = doc.select("img").nodes()[0];
        table.set(&img, 10_000.0);
        let top = find_top_candidate(&doc, &table).map(|n| Selection::from(n).attr("id").map(|s| s.to_string()));
        assert_eq!(top, Some(Some("a".to_string())));
    }

    #[test]
    fn test_merge_siblings_keeps_scored_prose_siblings() {
        let doc = parse(&format!(
            r#"<body><div id="main"><p>{LONG_P}</p><p>{LONG_P}</p></div><p id="tail">{LONG_P}</p><div id="nav"><a href="/">Home</a></div></body>"#
        ));
        let mut table = ScoreTable::new();
        score_content(&doc, &mut table, false);
        let Some(top) = find_top_candidate(&doc, &table) else {
            panic!("expected a top candidate");
        };
        let top_score = table.get(&top).unwrap_or_default();
        let region = merge_siblings(top, top_score, &table);
        let region = Selection::from(region);
        assert!(region.select("#main").exists());
        assert!(region.select("#tail").exists());
        assert!(!region.select("#nav").exists());
    }
}
