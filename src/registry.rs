//! Hostname to rule-set lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::selector::ExtractionRuleSet;
use crate::sites;
use crate::url_utils::{base_domain, parse_url};

/// Site rule sets keyed by hostname.
///
/// A rule set is reachable through its `domain` and every entry of its
/// `supported_domains`.
///
/// # Example
///
/// ```rust
/// use rs_article_parser::registry::ExtractorRegistry;
///
/// let registry = ExtractorRegistry::builtin();
/// let rules = registry.get_extractor("https://old.reddit.com/r/rust/comments/1/x/");
/// assert_eq!(rules.map(|r| r.domain.as_str()), Some("www.reddit.com"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<ExtractionRuleSet>>,
}

impl ExtractorRegistry {
    /// An empty registry; every page gets the generic extractor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The rule sets shipped with the crate.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(sites::hacker_news::rules());
        registry.register(sites::reddit::rules());
        registry
    }

    /// Add `rules`, replacing any rule set already registered for the same
    /// hostnames.
    pub fn register(&mut self, rules: ExtractionRuleSet) {
        let rules = Arc::new(rules);
        for host in std::iter::once(&rules.domain).chain(&rules.supported_domains) {
            self.extractors.insert(host.to_ascii_lowercase(), Arc::clone(&rules));
        }
    }

    /// The rule set for `url`: an exact hostname match first, then its
    /// base domain.
    #[must_use]
    pub fn get_extractor(&self, url: &str) -> Option<&ExtractionRuleSet> {
        let parsed = parse_url(url)?;
        let host = parsed.host_str()?.to_ascii_lowercase();
        self.extractors
            .get(&host)
            .or_else(|| self.extractors.get(&base_domain(&host)))
            .map(AsRef::as_ref)
    }

    /// Number of registered hostnames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Whether no rule set is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}
