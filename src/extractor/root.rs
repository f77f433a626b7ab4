//! Field-by-field orchestration.
//!
//! Every field is first resolved with the site's rules. A field whose rules
//! are missing or have no admissible selection falls back to its generic
//! extractor, one field at a time, unless fallback is off.

use tracing::debug;

use super::{comments, generic};
use crate::options::ExtractorOptions;
use crate::result::{ArticleResult, ContentOnlyResult, ExtractionResult};
use crate::selector::{select, select_extended, ExtractionRuleSet, Field, SelectionResult};

/// Extract one page.
///
/// Without a rule set the generic extractor handles the whole page. In
/// content-only mode (follow-on pages) only `content` and
/// `next_page_url` are resolved.
#[must_use]
pub fn extract(rule_set: Option<&ExtractionRuleSet>, opts: &ExtractorOptions) -> ExtractionResult {
    let Some(rules) = rule_set else {
        if opts.content_only {
            return content_only(opts, generic_content(opts), generic::next_page_url(opts));
        }
        return ExtractionResult::Full(Box::new(generic::extract(opts)));
    };

    if opts.content_only {
        let content = extract_content(rules, opts, opts.extracted_title);
        let next_page_url = extract_field(rules, &Field::NextPageUrl, opts, generic::next_page_url);
        return content_only(opts, content, next_page_url);
    }

    let (url, domain) = url_and_domain(opts);

    let title = extract_field(rules, &Field::Title, opts, generic::title);
    let date_published = extract_field(rules, &Field::DatePublished, opts, generic::date_published);
    let author = extract_field(
        rules,
        &Field::Author,
        &ExtractorOptions {
            allow_concatenation: true,
            ..*opts
        },
        generic::author,
    );
    let next_page_url = extract_field(rules, &Field::NextPageUrl, opts, generic::next_page_url);
    let content = extract_content(rules, opts, title.as_deref());
    let comments = extract_comments(rules, opts);

    let with_content = ExtractorOptions {
        extracted_title: title.as_deref(),
        content: content.as_deref(),
        ..*opts
    };
    let lead_image_url = extract_field(rules, &Field::LeadImageUrl, &with_content, generic::lead_image_url);
    let excerpt = extract_field(rules, &Field::Excerpt, &with_content, generic::excerpt);
    let dek = extract_field(
        rules,
        &Field::Dek,
        &ExtractorOptions {
            excerpt: excerpt.as_deref(),
            ..with_content
        },
        generic::dek,
    );
    let word_count = generic::word_count(content.as_deref());
    let direction = generic::direction(title.as_deref(), content.as_deref());

    let extended = select_extended(&rules.extend, opts);

    ExtractionResult::Full(Box::new(ArticleResult {
        title,
        content,
        author,
        date_published,
        lead_image_url,
        dek,
        next_page_url,
        url,
        domain,
        excerpt,
        word_count,
        direction,
        total_pages: 1,
        pages_rendered: 1,
        comments,
        extended,
    }))
}

/// Resolve `field` with the site's rules, falling back to `generic` when
/// no rule applies.
fn extract_field(
    rules: &ExtractionRuleSet,
    field: &Field,
    opts: &ExtractorOptions,
    generic: impl FnOnce(&ExtractorOptions) -> Option<String>,
) -> Option<String> {
    let result = rules
        .field_rules(field)
        .map_or(SelectionResult::Error, |field_rules| select(field, field_rules, opts, None));

    match result {
        SelectionResult::Content(value) => value.map(|v| v.join(", ")),
        SelectionResult::Error if opts.fallback => {
            debug!(field = %field, domain = %rules.domain, "no site rule applies, using generic extractor");
            generic(opts)
        }
        SelectionResult::Error => None,
    }
}

fn extract_content(rules: &ExtractionRuleSet, opts: &ExtractorOptions, title: Option<&str>) -> Option<String> {
    let opts = ExtractorOptions {
        extract_html: true,
        extracted_title: title,
        ..*opts
    };
    extract_field(rules, &Field::Content, &opts, generic_content)
}

/// The generic content scorer always works on text-mode options.
fn generic_content(opts: &ExtractorOptions) -> Option<String> {
    generic::content(&ExtractorOptions {
        extract_html: false,
        ..*opts
    })
}

fn extract_comments(rules: &ExtractionRuleSet, opts: &ExtractorOptions) -> Option<Vec<crate::result::Comment>> {
    let comment_rules = rules.comment.as_ref()?;
    match comments::extract(comment_rules, opts) {
        Some(found) => Some(found),
        None if opts.fallback => {
            debug!(domain = %rules.domain, "no comment rule applies, using generic extractor");
            generic::comments(opts)
        }
        None => None,
    }
}

/// Url and domain come only from the generic extractor, so they stay
/// empty when fallback is off.
fn url_and_domain(opts: &ExtractorOptions) -> (String, String) {
    if opts.fallback {
        generic::url_and_domain(opts)
    } else {
        (String::new(), String::new())
    }
}

fn content_only(opts: &ExtractorOptions, content: Option<String>, next_page_url: Option<String>) -> ExtractionResult {
    let (url, domain) = url_and_domain(opts);
    ExtractionResult::ContentOnly(ContentOnlyResult {
        url,
        domain,
        content,
        next_page_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;
    use crate::selector::{FieldRules, SelectionRule, Selector};

    const URL: &str = "https://blog.example.com/2021/06/01/tides";

    const PAGE: &str = r#"<html><head><title>Tides explained | Example Blog</title>
        <meta name="og:image" value="https://blog.example.com/img/tide.jpg"></head>
        <body><h1 class="post-title">Why the tide turns</h1>
        <span class="writer">Maya</span><span class="writer">Ola</span><span class="blank"> </span>
        <div class="post-body"><p>The moon pulls on the oceans, and the water, always moving, follows it around the planet twice a day.</p>
        <p>Where coastlines funnel that water, the range between high and low tide can be enormous, reaching many metres.</p></div>
        </body></html>"#;

    fn rule_set() -> ExtractionRuleSet {
        ExtractionRuleSet {
            title: Some(FieldRules::new([SelectionRule::exactly_one("h1.post-title")])),
            author: Some(FieldRules::new([SelectionRule::multi_array(".writer")])),
            content: Some(FieldRules::new([SelectionRule::exactly_one(".post-body")])),
            ..ExtractionRuleSet::new("blog.example.com")
        }
    }

    fn run(rules: Option<&ExtractionRuleSet>, opts: impl FnOnce(ExtractorOptions) -> ExtractorOptions) -> ExtractionResult {
        let doc = parse(PAGE);
        extract(rules, &opts(ExtractorOptions::new(&doc, PAGE, URL)))
    }

    #[test]
    fn test_site_rules_with_generic_fallback_per_field() {
        let rules = rule_set();
        let Some(article) = run(Some(&rules), |o| o).into_article() else {
            panic!("expected a full result");
        };
        assert_eq!(article.title.as_deref(), Some("Why the tide turns"));
        assert_eq!(article.author.as_deref(), Some("Maya, Ola"));
        assert_eq!(article.lead_image_url.as_deref(), Some("https://blog.example.com/img/tide.jpg"));
        assert_eq!(article.date_published.as_deref(), Some("2021-06-01T00:00:00.000Z"));
        assert!(article.content.as_deref().is_some_and(|c| c.contains("moon pulls")));
        assert_eq!(article.domain, "blog.example.com");
        assert!(article.word_count > 30);
        assert_eq!(article.total_pages, 1);
    }

    #[test]
    fn test_fallback_disabled_keeps_only_rule_values() {
        let rules = rule_set();
        let Some(article) = run(Some(&rules), |o| ExtractorOptions { fallback: false, ..o }).into_article() else {
            panic!("expected a full result");
        };
        assert_eq!(article.title.as_deref(), Some("Why the tide turns"));
        assert_eq!(article.lead_image_url, None);
        assert_eq!(article.date_published, None);
        assert_eq!(article.url, "");
    }

    #[test]
    fn test_miss_falls_back_but_empty_value_does_not() {
        let rules = ExtractionRuleSet {
            title: Some(FieldRules::new([SelectionRule::exactly_one("h1.missing")])),
            lead_image_url: Some(FieldRules::new([SelectionRule::first(".blank")])),
            ..ExtractionRuleSet::new("blog.example.com")
        };
        let Some(article) = run(Some(&rules), |o| o).into_article() else {
            panic!("expected a full result");
        };
        assert_eq!(article.title.as_deref(), Some("Why the tide turns"));
        assert_eq!(article.lead_image_url, None, "a matched but empty value is final");
    }

    #[test]
    fn test_content_only_mode() {
        let rules = rule_set();
        let result = run(Some(&rules), |o| ExtractorOptions {
            content_only: true,
            extracted_title: Some("Why the tide turns"),
            ..o
        });
        let ExtractionResult::ContentOnly(page) = result else {
            panic!("expected a content-only result");
        };
        assert!(page.content.is_some_and(|c| c.contains("coastlines")));
        assert_eq!(page.next_page_url, None);
        assert_eq!(page.domain, "blog.example.com");
    }

    #[test]
    fn test_content_only_without_fallback_has_no_url() {
        let rules = rule_set();
        let result = run(Some(&rules), |o| ExtractorOptions {
            content_only: true,
            fallback: false,
            ..o
        });
        let ExtractionResult::ContentOnly(page) = result else {
            panic!("expected a content-only result");
        };
        assert!(page.content.is_some());
        assert_eq!(page.url, "");
        assert_eq!(page.domain, "");
    }

    #[test]
    fn test_word_count_and_direction_follow_content() {
        let rules = rule_set();
        let Some(article) = run(Some(&rules), |o| o).into_article() else {
            panic!("expected a full result");
        };
        assert!(article.word_count > 30);
        assert_eq!(article.word_count, generic::word_count(article.content.as_deref()));
        assert_eq!(article.direction, crate::result::TextDirection::Ltr);
    }

    #[test]
    fn test_no_rule_set_is_fully_generic() {
        let Some(article) = run(None, |o| o).into_article() else {
            panic!("expected a full result");
        };
        assert_eq!(article.title.as_deref(), Some("Why the tide turns"));
        assert!(article.content.is_some());
    }

    #[test]
    fn test_extend_fields() {
        let mut rules = rule_set();
        rules.extend.insert(
            "writers".to_string(),
            FieldRules::new([SelectionRule::multi_array(".writer")]),
        );
        rules.extend.insert(
            "missing".to_string(),
            FieldRules::new([SelectionRule::first(Selector::match_attr("a", "data-x"))]),
        );
        let Some(article) = run(Some(&rules), |o| o).into_article() else {
            panic!("expected a full result");
        };
        assert_eq!(
            article.extended.get("writers"),
            Some(&crate::selector::SelectedValue::Multiple(vec!["Maya".into(), "Ola".into()]))
        );
        assert!(!article.extended.contains_key("missing"));
    }
}
