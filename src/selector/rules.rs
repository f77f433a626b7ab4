//! Rule-set data types.
//!
//! Everything here deserializes from the JSON shape of a site rule set.
//! Function transforms and comment hooks can only be attached from Rust.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use dom_query::Selection;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::migration::{migrate_selections, LegacySelection};
use super::Field;
use crate::error::{Error, Result};
use crate::result::Comment;

// === Selectors ===

/// Rewrites an attribute value read by [`Selector::MatchAttr`].
#[derive(Clone)]
pub struct ValueTransform(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl ValueTransform {
    pub fn new(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn apply(&self, value: &str) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for ValueTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueTransform(..)")
    }
}

impl PartialEq for ValueTransform {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// The matching predicate of a rule.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSelector")]
pub enum Selector {
    /// A CSS selector.
    Css(String),
    /// Every selector must match at least once; the union is the match set.
    MatchAll(Vec<String>),
    /// Nodes whose `attr` is non-blank; yields the attribute value.
    MatchAttr {
        selector: String,
        attr: String,
        transform: Option<ValueTransform>,
    },
}

impl Selector {
    pub fn match_all<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MatchAll(selectors.into_iter().map(Into::into).collect())
    }

    pub fn match_attr(selector: impl Into<String>, attr: impl Into<String>) -> Self {
        Self::MatchAttr {
            selector: selector.into(),
            attr: attr.into(),
            transform: None,
        }
    }

    /// Attach a value transform to a `MatchAttr` selector; other selectors
    /// are returned unchanged.
    #[must_use]
    pub fn with_transform(self, transform: ValueTransform) -> Self {
        match self {
            Self::MatchAttr { selector, attr, .. } => Self::MatchAttr {
                selector,
                attr,
                transform: Some(transform),
            },
            other => other,
        }
    }
}

impl From<&str> for Selector {
    fn from(selector: &str) -> Self {
        Self::Css(selector.to_string())
    }
}

impl From<String> for Selector {
    fn from(selector: String) -> Self {
        Self::Css(selector)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelector {
    Css(String),
    Typed(TypedSelector),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum TypedSelector {
    MatchAll { selectors: Vec<String> },
    MatchAttr { selector: String, attr: String },
}

impl From<RawSelector> for Selector {
    fn from(raw: RawSelector) -> Self {
        match raw {
            RawSelector::Css(selector) => Self::Css(selector),
            RawSelector::Typed(TypedSelector::MatchAll { selectors }) => Self::MatchAll(selectors),
            RawSelector::Typed(TypedSelector::MatchAttr { selector, attr }) => {
                Self::match_attr(selector, attr)
            }
        }
    }
}

// === Selection rules ===

fn default_join_pattern() -> String {
    ", ".to_string()
}

/// One way of locating and extracting a field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SelectionRule {
    /// Admissible only with exactly one match.
    ExactlyOne {
        selector: Selector,
        #[serde(default)]
        return_html: bool,
    },
    /// The first of one or more matches.
    First {
        selector: Selector,
        #[serde(default)]
        return_html: bool,
    },
    /// All matches under one wrapper.
    MultiGrouped {
        selector: Selector,
        #[serde(default)]
        return_html: bool,
    },
    /// All matches as a list.
    MultiArray {
        selector: Selector,
        #[serde(default)]
        return_html: bool,
    },
    /// All matches joined with `join_pattern`.
    #[serde(alias = "concatinate")]
    Concatenate {
        selector: Selector,
        #[serde(default)]
        return_html: bool,
        #[serde(default = "default_join_pattern")]
        join_pattern: String,
    },
}

impl SelectionRule {
    pub fn exactly_one(selector: impl Into<Selector>) -> Self {
        Self::ExactlyOne {
            selector: selector.into(),
            return_html: false,
        }
    }

    pub fn first(selector: impl Into<Selector>) -> Self {
        Self::First {
            selector: selector.into(),
            return_html: false,
        }
    }

    pub fn multi_grouped(selector: impl Into<Selector>) -> Self {
        Self::MultiGrouped {
            selector: selector.into(),
            return_html: false,
        }
    }

    pub fn multi_array(selector: impl Into<Selector>) -> Self {
        Self::MultiArray {
            selector: selector.into(),
            return_html: false,
        }
    }

    pub fn concatenate(selector: impl Into<Selector>, join_pattern: impl Into<String>) -> Self {
        Self::Concatenate {
            selector: selector.into(),
            return_html: false,
            join_pattern: join_pattern.into(),
        }
    }

    /// The same rule, extracting markup instead of text.
    #[must_use]
    pub fn html(self) -> Self {
        self.with_return_html(true)
    }

    #[must_use]
    pub fn with_return_html(mut self, value: bool) -> Self {
        match &mut self {
            Self::ExactlyOne { return_html, .. }
            | Self::First { return_html, .. }
            | Self::MultiGrouped { return_html, .. }
            | Self::MultiArray { return_html, .. }
            | Self::Concatenate { return_html, .. } => *return_html = value,
        }
        self
    }

    #[must_use]
    pub fn selector(&self) -> &Selector {
        match self {
            Self::ExactlyOne { selector, .. }
            | Self::First { selector, .. }
            | Self::MultiGrouped { selector, .. }
            | Self::MultiArray { selector, .. }
            | Self::Concatenate { selector, .. } => selector,
        }
    }

    #[must_use]
    pub fn return_html(&self) -> bool {
        match self {
            Self::ExactlyOne { return_html, .. }
            | Self::First { return_html, .. }
            | Self::MultiGrouped { return_html, .. }
            | Self::MultiArray { return_html, .. }
            | Self::Concatenate { return_html, .. } => *return_html,
        }
    }

    /// Whether `count` matches satisfy this variant.
    #[must_use]
    pub fn admits(&self, count: usize) -> bool {
        match self {
            Self::ExactlyOne { .. } => count == 1,
            _ => count >= 1,
        }
    }
}

/// A typed rule, or a legacy entry migrated at selection time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SelectionEntry {
    Rule(SelectionRule),
    Legacy(LegacySelection),
}

impl From<SelectionRule> for SelectionEntry {
    fn from(rule: SelectionRule) -> Self {
        Self::Rule(rule)
    }
}

impl From<LegacySelection> for SelectionEntry {
    fn from(legacy: LegacySelection) -> Self {
        Self::Legacy(legacy)
    }
}

// === Transforms ===

type NodeRewrite = dyn Fn(&Selection) -> Option<String> + Send + Sync;

/// A node rewrite applied to every match of a transform key.
#[derive(Clone)]
pub enum Transform {
    /// Rename the node to this tag.
    Rename(String),
    /// Rewrite the node in place; a returned tag name renames it.
    Function(Arc<NodeRewrite>),
}

impl Transform {
    pub fn rename(tag: impl Into<String>) -> Self {
        Self::Rename(tag.into())
    }

    pub fn function(f: impl Fn(&Selection) -> Option<String> + Send + Sync + 'static) -> Self {
        Self::Function(Arc::new(f))
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename(tag) => f.debug_tuple("Rename").field(tag).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for Transform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::Rename)
    }
}

/// Deserialize a transform map keeping its declared order.
fn ordered_transforms<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, Transform)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedTransforms;

    impl<'de> Visitor<'de> for OrderedTransforms {
        type Value = Vec<(String, Transform)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of selector to tag name")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
            let mut transforms = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, Transform>()? {
                transforms.push(entry);
            }
            Ok(transforms)
        }
    }

    deserializer.deserialize_map(OrderedTransforms)
}

// === Field rules ===

/// Everything a rule set says about one field.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawFieldRules")]
pub struct FieldRules {
    /// Tried in order; the first admissible one wins.
    pub selectors: Vec<SelectionEntry>,

    /// Applied in order to the matched fragment.
    pub transforms: Vec<(String, Transform)>,

    /// Removed from the matched fragment.
    pub clean: Vec<String>,

    /// Run the field's default cleaner.
    pub default_cleaner: bool,

    /// Legacy string selections migrate to `multiArray`.
    pub allow_multiple: bool,

    /// A fixed value that bypasses selection.
    pub literal: Option<String>,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            selectors: Vec::new(),
            transforms: Vec::new(),
            clean: Vec::new(),
            default_cleaner: true,
            allow_multiple: false,
            literal: None,
        }
    }
}

impl FieldRules {
    pub fn new(rules: impl IntoIterator<Item = SelectionRule>) -> Self {
        Self {
            selectors: rules.into_iter().map(SelectionEntry::Rule).collect(),
            ..Self::default()
        }
    }

    pub fn legacy(selections: impl IntoIterator<Item = LegacySelection>) -> Self {
        Self {
            selectors: selections.into_iter().map(SelectionEntry::Legacy).collect(),
            ..Self::default()
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            literal: Some(value.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_clean(mut self, selectors: &[&str]) -> Self {
        self.clean.extend(selectors.iter().map(ToString::to_string));
        self
    }

    #[must_use]
    pub fn with_transform(mut self, selector: impl Into<String>, transform: Transform) -> Self {
        self.transforms.push((selector.into(), transform));
        self
    }

    #[must_use]
    pub fn with_default_cleaner(mut self, enabled: bool) -> Self {
        self.default_cleaner = enabled;
        self
    }

    #[must_use]
    pub fn with_allow_multiple(mut self, enabled: bool) -> Self {
        self.allow_multiple = enabled;
        self
    }

    /// The typed rules, migrating legacy entries for the given mode.
    pub fn resolved_rules(&self, extract_html: bool) -> Result<Vec<SelectionRule>> {
        let mut rules = Vec::with_capacity(self.selectors.len());
        let mut legacy = Vec::new();
        for entry in &self.selectors {
            match entry {
                SelectionEntry::Rule(rule) => {
                    rules.append(&mut migrate_selections(&legacy, self.allow_multiple, extract_html)?);
                    legacy.clear();
                    rules.push(rule.clone());
                }
                SelectionEntry::Legacy(selection) => legacy.push(selection.clone()),
            }
        }
        rules.append(&mut migrate_selections(&legacy, self.allow_multiple, extract_html)?);
        Ok(rules)
    }
}

fn enabled() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFieldRules {
    Literal(String),
    Rules(RulesBody),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RulesBody {
    #[serde(default)]
    selectors: Vec<SelectionEntry>,
    #[serde(default, deserialize_with = "ordered_transforms")]
    transforms: Vec<(String, Transform)>,
    #[serde(default)]
    clean: Vec<String>,
    #[serde(default = "enabled")]
    default_cleaner: bool,
    #[serde(default)]
    allow_multiple: bool,
}

impl From<RawFieldRules> for FieldRules {
    fn from(raw: RawFieldRules) -> Self {
        match raw {
            RawFieldRules::Literal(value) => Self::literal(value),
            RawFieldRules::Rules(body) => Self {
                selectors: body.selectors,
                transforms: body.transforms,
                clean: body.clean,
                default_cleaner: body.default_cleaner,
                allow_multiple: body.allow_multiple,
                literal: None,
            },
        }
    }
}

// === Comments ===

type NodeHook = dyn Fn(&Selection, &[Comment]) + Send + Sync;
type InsertHook = dyn Fn(&Selection, Comment, &mut Vec<Comment>) + Send + Sync;

/// Runs on each comment node before its fields are read.
#[derive(Clone)]
pub struct NodeTransform(Arc<NodeHook>);

impl NodeTransform {
    pub fn new(f: impl Fn(&Selection, &[Comment]) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, node: &Selection, comments: &[Comment]) {
        (self.0)(node, comments);
    }
}

impl fmt::Debug for NodeTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeTransform(..)")
    }
}

/// Places a built comment into the top-level list itself, replacing the
/// default append.
#[derive(Clone)]
pub struct InsertTransform(Arc<InsertHook>);

impl InsertTransform {
    pub fn new(f: impl Fn(&Selection, Comment, &mut Vec<Comment>) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, node: &Selection, comment: Comment, comments: &mut Vec<Comment>) {
        (self.0)(node, comment, comments);
    }
}

impl fmt::Debug for InsertTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InsertTransform(..)")
    }
}

/// Reply selection and the placement hooks.
///
/// The hooks apply to every comment, top-level ones included.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChildLevelRules {
    /// Reply nodes, relative to the parent comment node.
    #[serde(default)]
    pub selectors: Vec<SelectionEntry>,

    #[serde(skip)]
    pub node_transform: Option<NodeTransform>,

    #[serde(skip)]
    pub insert_transform: Option<InsertTransform>,
}

/// How a site's comments are found and read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRules {
    pub top_level: FieldRules,
    #[serde(default)]
    pub child_level: Option<ChildLevelRules>,
    #[serde(default)]
    pub author: Option<FieldRules>,
    #[serde(default)]
    pub score: Option<FieldRules>,
    #[serde(default)]
    pub date: Option<FieldRules>,
    pub text: FieldRules,
}

// === Rule sets ===

/// Rule-set keys for fields derived from the content, never selected.
const DERIVED_FIELDS: [&str; 3] = ["word_count", "wordCount", "direction"];

/// A site's rules, keyed by field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionRuleSet {
    pub domain: String,
    #[serde(default, alias = "supportedDomains")]
    pub supported_domains: Vec<String>,
    #[serde(default)]
    pub title: Option<FieldRules>,
    #[serde(default)]
    pub author: Option<FieldRules>,
    #[serde(default)]
    pub date_published: Option<FieldRules>,
    #[serde(default)]
    pub dek: Option<FieldRules>,
    #[serde(default)]
    pub lead_image_url: Option<FieldRules>,
    #[serde(default)]
    pub content: Option<FieldRules>,
    #[serde(default)]
    pub next_page_url: Option<FieldRules>,
    #[serde(default)]
    pub excerpt: Option<FieldRules>,
    #[serde(default)]
    pub comment: Option<CommentRules>,
    #[serde(default)]
    pub extend: BTreeMap<String, FieldRules>,
}

impl ExtractionRuleSet {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }

    /// Parse a rule set from its JSON form.
    ///
    /// Word count and direction always come from the extracted content, so
    /// a rule set that declares selections for them is rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(key) = DERIVED_FIELDS.iter().find(|key| value.get(**key).is_some()) {
            return Err(Error::DerivedField((*key).to_string()));
        }
        let rules: Self = serde_json::from_value(value)?;
        rules.validate()?;
        Ok(rules)
    }

    /// The rules for `field`, if the site declares any.
    #[must_use]
    pub fn field_rules(&self, field: &Field) -> Option<&FieldRules> {
        match field {
            Field::Title => self.title.as_ref(),
            Field::Author => self.author.as_ref(),
            Field::DatePublished => self.date_published.as_ref(),
            Field::Dek => self.dek.as_ref(),
            Field::LeadImageUrl => self.lead_image_url.as_ref(),
            Field::Content => self.content.as_ref(),
            Field::NextPageUrl => self.next_page_url.as_ref(),
            Field::Excerpt => self.excerpt.as_ref(),
            Field::Extended(name) => self.extend.get(name),
            Field::UrlAndDomain | Field::Comment => None,
        }
    }

    /// Check that every legacy selection can be migrated.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            Field::Title,
            Field::Author,
            Field::DatePublished,
            Field::Dek,
            Field::LeadImageUrl,
            Field::Content,
            Field::NextPageUrl,
            Field::Excerpt,
        ];
        for field in &fields {
            if let Some(rules) = self.field_rules(field) {
                rules.resolved_rules(*field == Field::Content)?;
            }
        }
        for rules in self.extend.values() {
            rules.resolved_rules(false)?;
        }

        if let Some(comment) = &self.comment {
            comment.top_level.resolved_rules(false)?;
            comment.text.resolved_rules(true)?;
            for rules in [&comment.author, &comment.score, &comment.date].into_iter().flatten() {
                rules.resolved_rules(false)?;
            }
            if let Some(child) = &comment.child_level {
                child.rules().resolved_rules(false)?;
            }
        }
        Ok(())
    }
}

impl ChildLevelRules {
    /// The reply selection as field rules.
    #[must_use]
    pub fn rules(&self) -> FieldRules {
        FieldRules {
            selectors: self.selectors.clone(),
            ..FieldRules::default()
        }
    }
}
