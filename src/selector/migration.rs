//! Migration of the flat legacy selection format.
//!
//! Older rule sets list selections as bare strings or as
//! `[selector, attr]` arrays; their meaning depends on whether the field
//! extracts markup and whether it allows several values.

use serde::Deserialize;

use super::rules::{SelectionRule, Selector};
use crate::error::{Error, Result};

/// A selection in the legacy flat format.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LegacySelection {
    /// `"selector"`
    Selector(String),
    /// `["selector", "attr"]`, `["selector"]`, or in markup mode a list of
    /// selectors that must all match.
    Array(Vec<String>),
}

impl From<&str> for LegacySelection {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl<const N: usize> From<[&str; N]> for LegacySelection {
    fn from(parts: [&str; N]) -> Self {
        Self::Array(parts.iter().map(ToString::to_string).collect())
    }
}

/// Convert legacy selections to typed rules.
///
/// | legacy | markup mode | `allow_multiple` | otherwise |
/// |---|---|---|---|
/// | `"s"` | (same) | `multiArray` | `exactlyOne` |
/// | `[s, ...]` | `multiGrouped(matchAll)` | | |
/// | `[s, attr]` | | `multiArray(matchAttr)` | `exactlyOne(matchAttr)` |
/// | `[s]` | | `multiArray` | `first` |
///
/// Arrays of three or more entries outside markup mode carried a value
/// transform in the old format and cannot be migrated.
pub fn migrate_selections(
    selections: &[LegacySelection],
    allow_multiple: bool,
    extract_html: bool,
) -> Result<Vec<SelectionRule>> {
    selections
        .iter()
        .map(|selection| migrate_one(selection, allow_multiple, extract_html))
        .collect()
}

fn migrate_one(
    selection: &LegacySelection,
    allow_multiple: bool,
    extract_html: bool,
) -> Result<SelectionRule> {
    let parts = match selection {
        LegacySelection::Selector(selector) => {
            let rule = if allow_multiple {
                SelectionRule::multi_array(selector.as_str())
            } else {
                SelectionRule::exactly_one(selector.as_str())
            };
            return Ok(rule.with_return_html(extract_html));
        }
        LegacySelection::Array(parts) => parts,
    };

    if extract_html && !parts.is_empty() {
        return Ok(SelectionRule::multi_grouped(Selector::match_all(parts.iter().cloned())).html());
    }

    match parts.as_slice() {
        [selector, attr] if !attr.trim().is_empty() => {
            let selector = Selector::match_attr(selector.as_str(), attr.as_str());
            Ok(if allow_multiple {
                SelectionRule::multi_array(selector)
            } else {
                SelectionRule::exactly_one(selector)
            })
        }
        [selector] | [selector, _] => Ok(if allow_multiple {
            SelectionRule::multi_array(selector.as_str())
        } else {
            SelectionRule::first(selector.as_str())
        }),
        _ => Err(Error::UnmigratedSelection(format!("{parts:?}"))),
    }
}
