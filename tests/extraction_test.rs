use rs_article_parser::html_processing::clean_h_ones;
use rs_article_parser::{dom, extract_article, Error, ExtractionRuleSet, FieldRules, SelectionRule, TextDirection};

const URL: &str = "https://www.coastnews.example/2022/09/14/harbour-dredging";

const ARTICLE: &str = r#"<!DOCTYPE html>
<html><head>
  <title>Harbour dredging starts next month | Coast News</title>
  <meta property="og:image" content="https://www.coastnews.example/media/harbour.jpg">
  <meta name="byl" content="By Tom Fisher">
</head><body>
  <nav class="menu"><a href="/">Home</a> <a href="/local">Local</a> <a href="/sport">Sport</a></nav>
  <div class="story">
    <h1 class="story-title">Dredging of the old harbour starts next month</h1>
    <p>The harbour authority confirmed on Tuesday that dredging of the silted inner basin will begin in October,
       after two years of delays, consultations, and funding disputes with the regional council.</p>
    <p>Boat owners have been asked to move their moorings to the outer pontoons, which will remain open,
       while the work continues through the winter and into early spring.</p>
    <p>Local fishermen welcomed the news, saying that at low tide the basin had become almost unusable,
       and that several boats had been grounded over the summer.</p>
  </div>
  <div class="sidebar"><h3>Most read</h3><ul><li><a href="/a">Storm warning</a></li><li><a href="/b">Lifeboat day</a></li></ul></div>
</body></html>"#;

fn extract(rule_set: Option<&ExtractionRuleSet>) -> rs_article_parser::ArticleResult {
    match extract_article(URL, ARTICLE, rule_set) {
        Ok(article) => article,
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    }
}

#[test]
fn generic_extraction_of_a_news_page() {
    let article = extract(None);

    assert_eq!(article.title.as_deref(), Some("Dredging of the old harbour starts next month"));
    assert_eq!(article.author.as_deref(), Some("Tom Fisher"));
    assert_eq!(article.date_published.as_deref(), Some("2022-09-14T00:00:00.000Z"));
    assert_eq!(
        article.lead_image_url.as_deref(),
        Some("https://www.coastnews.example/media/harbour.jpg")
    );
    assert_eq!(article.domain, "www.coastnews.example");
    assert_eq!(article.direction, TextDirection::Ltr);
    assert_eq!(article.total_pages, 1);
    assert_eq!(article.pages_rendered, 1);

    let content = article.content.as_deref().unwrap_or_default();
    assert!(content.contains("inner basin"));
    assert!(content.contains("grounded over the summer"));
    assert!(!content.contains("Storm warning"));
    assert!(article.word_count > 70);
    assert!(article.excerpt.is_some_and(|e| e.starts_with("The harbour authority")));
}

#[test]
fn site_rule_for_title_with_generic_lead_image() {
    let rules = ExtractionRuleSet {
        title: Some(FieldRules::new([SelectionRule::exactly_one("nav.menu a:first-child")])),
        ..ExtractionRuleSet::new("www.coastnews.example")
    };
    let article = extract(Some(&rules));

    assert_eq!(article.title.as_deref(), Some("Home"));
    assert_eq!(
        article.lead_image_url.as_deref(),
        Some("https://www.coastnews.example/media/harbour.jpg")
    );
    assert!(article.content.is_some_and(|c| c.contains("inner basin")));
}

#[test]
fn rule_content_is_cleaned_and_counted() {
    let rules = ExtractionRuleSet {
        content: Some(FieldRules::new([SelectionRule::exactly_one("div.story")])),
        ..ExtractionRuleSet::new("www.coastnews.example")
    };
    let article = extract(Some(&rules));

    let content = article.content.unwrap_or_default();
    assert!(content.contains("outer pontoons"));
    assert!(!content.contains("<h1"), "a lone h1 is dropped from content");
    assert!(!content.contains("Most read"));
    assert!(article.word_count > 70);
}

#[test]
fn repeated_extraction_is_identical() {
    let first = extract(None);
    let second = extract(None);
    assert_eq!(first, second);
}

#[test]
fn h1_policy_boundary() {
    let two = dom::parse(r#"<div id="r"><h1>One</h1><p>Text</p><h1>Two</h1></div>"#);
    clean_h_ones(&two.select("#r"));
    assert_eq!(two.select("h1").length(), 0);
    assert_eq!(two.select("h2").length(), 0);

    let three = dom::parse(r#"<div id="r"><h1>One</h1><p>Text</p><h1>Two</h1><h1>Three</h1></div>"#);
    clean_h_ones(&three.select("#r"));
    assert_eq!(three.select("h1").length(), 0);
    assert_eq!(three.select("h2").length(), 3);
}

#[test]
fn empty_document_is_malformed_input() {
    match extract_article(URL, "", None) {
        Ok(article) => panic!("expected an error, got {article:?}"),
        Err(err) => assert!(err.is_malformed_input()),
    }
}

#[test]
fn page_without_content_still_returns_a_result() {
    let html = "<html><head><title>Gallery</title></head><body><img src='/a.png'></body></html>";
    match extract_article(URL, html, None) {
        Ok(article) => {
            assert_eq!(article.title.as_deref(), Some("Gallery"));
            assert!(article.word_count <= 5);
        }
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    }
}

#[test]
fn word_count_and_direction_cannot_be_selected() {
    for json in [
        r#"{ "domain": "www.coastnews.example", "word_count": { "selectors": [".wc"] } }"#,
        r#"{ "domain": "www.coastnews.example", "direction": { "selectors": [".dir"] } }"#,
    ] {
        match ExtractionRuleSet::from_json(json) {
            Ok(rules) => panic!("expected the rule set to be rejected, got {rules:?}"),
            Err(err) => assert!(matches!(err, Error::DerivedField(_))),
        }
    }

    let html = ARTICLE.replace(
        r#"<div class="story">"#,
        r#"<span class="wc">3</span><span class="dir">rtl</span><div class="story">"#,
    );
    let rules = ExtractionRuleSet {
        content: Some(FieldRules::new([SelectionRule::exactly_one("div.story")])),
        ..ExtractionRuleSet::new("www.coastnews.example")
    };
    match extract_article(URL, &html, Some(&rules)) {
        Ok(article) => {
            assert!(article.word_count > 70);
            assert_eq!(article.direction, TextDirection::Ltr);
        }
        Err(err) => panic!("expected Ok(_), got Err({err:?})"),
    }
}
