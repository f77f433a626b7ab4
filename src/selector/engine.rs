//! Rule evaluation.
//!
//! Matching never touches the page: the nodes of the winning rule are
//! copied into an isolated fragment, and links, `clean` selectors,
//! transforms and the field's DOM cleaner all run on that copy.

use std::collections::BTreeMap;

use dom_query::{Document, NodeRef, Selection};
use tracing::warn;

use super::rules::{FieldRules, SelectionRule, Selector, Transform};
use super::{Field, SelectedValue, SelectionResult};
use crate::cleaners::{clean_comment, clean_content, clean_field, has_string_cleaner, ContentCleanOptions};
use crate::dom::{self, convert_node_to, dedupe_nodes, element_children, meaningful_children, select_within};
use crate::html_processing::{document_base_href, make_links_absolute};
use crate::options::ExtractorOptions;
use crate::scoring::ScoreTable;

/// Evaluate `rules` for `field`.
///
/// Rules are tried in order and the first admissible one wins; later
/// rules are never consulted, even if they would also match. `root`
/// scopes matching to a subtree (comment nodes, for instance).
#[must_use]
pub fn select<'a>(
    field: &Field,
    rules: &FieldRules,
    opts: &ExtractorOptions<'a>,
    root: Option<&NodeRef<'a>>,
) -> SelectionResult {
    if let Some(literal) = &rules.literal {
        return SelectionResult::Content(Some(SelectedValue::Single(literal.clone())));
    }

    let typed = match rules.resolved_rules(opts.extract_html) {
        Ok(typed) => typed,
        Err(err) => {
            warn!(field = %field, error = %err, "Ignoring selections that cannot be migrated");
            return SelectionResult::Error;
        }
    };

    let Some((rule, matches)) = choose_selection(opts.doc, &typed, root) else {
        return SelectionResult::Error;
    };

    SelectionResult::Content(extract_value(field, rules, rule, &matches, opts))
}

/// Like [`select`], with multiple values joined by `,`.
#[must_use]
pub fn select_concatenating<'a>(
    field: &Field,
    rules: &FieldRules,
    opts: &ExtractorOptions<'a>,
    root: Option<&NodeRef<'a>>,
) -> SelectionResult {
    match select(field, rules, opts, root) {
        SelectionResult::Content(Some(SelectedValue::Multiple(values))) => {
            SelectionResult::Content(Some(SelectedValue::Single(values.join(","))))
        }
        other => other,
    }
}

/// Resolve a site's `extend` fields, keeping only non-empty values.
#[must_use]
pub fn select_extended(
    extend: &BTreeMap<String, FieldRules>,
    opts: &ExtractorOptions,
) -> BTreeMap<String, SelectedValue> {
    extend
        .iter()
        .filter_map(|(name, rules)| {
            let value = select(&Field::Extended(name.clone()), rules, opts, None).into_value()?;
            (!value.is_blank()).then(|| (name.clone(), value))
        })
        .collect()
}

/// The first admissible rule and its match set.
#[must_use]
pub fn choose_selection<'a, 'r>(
    doc: &'a Document,
    rules: &'r [SelectionRule],
    root: Option<&NodeRef<'a>>,
) -> Option<(&'r SelectionRule, Vec<NodeRef<'a>>)> {
    rules.iter().find_map(|rule| {
        let matches = find_matches(doc, rule.selector(), root)?;
        rule.admits(matches.len()).then_some((rule, matches))
    })
}

fn find_matches<'a>(
    doc: &'a Document,
    selector: &Selector,
    root: Option<&NodeRef<'a>>,
) -> Option<Vec<NodeRef<'a>>> {
    let matches = match selector {
        Selector::Css(css) => select_within(doc, root, css),
        Selector::MatchAll(selectors) => {
            let mut union = Vec::new();
            for css in selectors {
                let found = select_within(doc, root, css);
                if found.is_empty() {
                    return None;
                }
                union.extend(found);
            }
            dedupe_nodes(union)
        }
        Selector::MatchAttr { selector, attr, .. } => select_within(doc, root, selector)
            .into_iter()
            .filter(|node| {
                Selection::from(*node)
                    .attr(attr)
                    .is_some_and(|value| !value.trim().is_empty())
            })
            .collect(),
    };
    (!matches.is_empty()).then_some(matches)
}

fn extract_value(
    field: &Field,
    rules: &FieldRules,
    rule: &SelectionRule,
    matches: &[NodeRef],
    opts: &ExtractorOptions,
) -> Option<SelectedValue> {
    let nodes = match rule {
        SelectionRule::ExactlyOne { .. } | SelectionRule::First { .. } => &matches[..1.min(matches.len())],
        _ => matches,
    };

    let fragment = dom::isolate(nodes);
    let wrapper = dom::fragment_root(&fragment);
    let base_href = document_base_href(opts.doc);
    make_links_absolute(&wrapper, opts.url, base_href.as_deref());
    if !rules.clean.is_empty() {
        wrapper.select(&rules.clean.join(", ")).remove();
    }
    apply_transforms(&wrapper, &rules.transforms);

    let value = if rule.return_html() || opts.extract_html {
        html_value(field, rules, rule, &wrapper, base_href.as_deref(), opts)?
    } else {
        let value = text_value(rule, &wrapper)?;
        if rules.default_cleaner && opts.default_cleaner && has_string_cleaner(field) {
            clean_value(field, value, opts)?
        } else {
            value
        }
    };

    let value = match value {
        SelectedValue::Multiple(values) if opts.allow_concatenation => SelectedValue::Single(values.join(", ")),
        other => other,
    };

    match value {
        SelectedValue::Single(ref single) if single.trim().is_empty() => None,
        SelectedValue::Multiple(ref values) if values.is_empty() => None,
        other => Some(other),
    }
}

/// Rename or rewrite every node matching a transform key, in key order.
fn apply_transforms(wrapper: &Selection, transforms: &[(String, Transform)]) {
    for (selector, transform) in transforms {
        for node in wrapper.select(selector).nodes().to_vec() {
            let sel = Selection::from(node);
            match transform {
                Transform::Rename(tag) => convert_node_to(&sel, tag),
                Transform::Function(rewrite) => {
                    if let Some(tag) = rewrite(&sel) {
                        convert_node_to(&sel, &tag);
                    }
                }
            }
        }
    }
}

fn html_value(
    field: &Field,
    rules: &FieldRules,
    rule: &SelectionRule,
    wrapper: &Selection,
    base_href: Option<&str>,
    opts: &ExtractorOptions,
) -> Option<SelectedValue> {
    let root = match field {
        Field::Content => {
            let mut scores = ScoreTable::new();
            let clean_opts = ContentCleanOptions {
                title: opts.extracted_title.unwrap_or_default(),
                url: opts.url,
                base_href,
                clean_conditionally: true,
                default_cleaner: rules.default_cleaner && opts.default_cleaner,
            };
            clean_content(wrapper, &mut scores, &clean_opts);
            wrapper.nodes().first().copied()?
        }
        Field::Comment => clean_comment(wrapper)?,
        _ => wrapper.nodes().first().copied()?,
    };

    let children = || element_children(&root).into_iter().map(|child| Selection::from(child).html().to_string());
    let value = match rule {
        SelectionRule::MultiArray { .. } => SelectedValue::Multiple(children().collect()),
        SelectionRule::Concatenate { join_pattern, .. } => {
            SelectedValue::Single(children().collect::<Vec<_>>().join(join_pattern))
        }
        _ => SelectedValue::Single(single_html(&root)),
    };
    Some(value)
}

/// The lone element child's markup, or the whole root's.
fn single_html(root: &NodeRef) -> String {
    match meaningful_children(root).as_slice() {
        [only] if only.is_element() => Selection::from(*only).html().to_string(),
        _ => Selection::from(*root).html().to_string(),
    }
}

fn text_value(rule: &SelectionRule, wrapper: &Selection) -> Option<SelectedValue> {
    let root = wrapper.nodes().first().copied()?;

    let values: Vec<String> = element_children(&root)
        .into_iter()
        .filter_map(|node| {
            let sel = Selection::from(node);
            match rule.selector() {
                Selector::MatchAttr { attr, transform, .. } => {
                    let value = sel.attr(attr)?;
                    let value = value.trim();
                    Some(transform.as_ref().map_or_else(|| value.to_string(), |t| t.apply(value)))
                }
                _ => Some(sel.text().trim().to_string()),
            }
        })
        .collect();

    let value = match rule {
        SelectionRule::MultiArray { .. } => SelectedValue::Multiple(values),
        SelectionRule::Concatenate { join_pattern, .. } => SelectedValue::Single(values.join(join_pattern)),
        SelectionRule::MultiGrouped { .. } => match rule.selector() {
            Selector::MatchAttr { .. } => SelectedValue::Single(values.join(" ")),
            _ => SelectedValue::Single(dom::normalize_spaces(wrapper.text().trim())),
        },
        _ => SelectedValue::Single(values.into_iter().next()?),
    };
    Some(value)
}

fn clean_value(field: &Field, value: SelectedValue, opts: &ExtractorOptions) -> Option<SelectedValue> {
    match value {
        SelectedValue::Single(single) => clean_field(field, &single, opts).map(SelectedValue::Single),
        SelectedValue::Multiple(values) => Some(SelectedValue::Multiple(
            values
                .iter()
                .filter_map(|value| clean_field(field, value, opts))
                .collect(),
        )),
    }
}
