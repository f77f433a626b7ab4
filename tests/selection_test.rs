use rs_article_parser::dom;
use rs_article_parser::options::ExtractorOptions;
use rs_article_parser::selector::{
    select, Field, FieldRules, SelectedValue, SelectionResult, SelectionRule, Selector,
};
use rs_article_parser::ExtractionRuleSet;

const URL: &str = "https://www.example.com/story";

fn select_in(html: &str, rules: &FieldRules) -> SelectionResult {
    let doc = dom::parse(html);
    let opts = ExtractorOptions::new(&doc, html, URL);
    select(&Field::Extended("value".to_string()), rules, &opts, None)
}

fn single(value: &str) -> SelectionResult {
    SelectionResult::Content(Some(SelectedValue::Single(value.to_string())))
}

#[test]
fn earlier_admissible_rule_wins_over_later_match() {
    let rules = FieldRules::new([
        SelectionRule::first("p.lede"),
        SelectionRule::first("p"),
    ]);
    let html = r#"<p>Opening</p><p class="lede">Lede</p>"#;
    assert_eq!(select_in(html, &rules), single("Lede"));

    let html = r#"<p>Opening</p><p>Second</p>"#;
    assert_eq!(select_in(html, &rules), single("Opening"));
}

#[test]
fn match_all_needs_every_selector() {
    let rules = FieldRules::new([SelectionRule::multi_array(Selector::match_all(["p.a", "p.b"]))]);

    assert!(select_in(r#"<p class="a">A1</p><p class="a">A2</p>"#, &rules).is_error());

    let html = r#"<p class="a">A1</p><p class="b">B1</p><p class="a">A2</p>"#;
    match select_in(html, &rules) {
        SelectionResult::Content(Some(SelectedValue::Multiple(values))) => {
            assert_eq!(values.len(), 3);
            assert!(values.contains(&"B1".to_string()));
        }
        other => panic!("expected three values, got {other:?}"),
    }
}

#[test]
fn exactly_one_fails_on_zero_or_many() {
    let rules = FieldRules::new([
        SelectionRule::exactly_one("h1.headline"),
        SelectionRule::first("title"),
    ]);
    let head = "<head><title>Fallback title</title></head>";

    let none = format!("{head}<body><h1>Plain</h1></body>");
    assert_eq!(select_in(&none, &rules), single("Fallback title"));

    let two = format!(r#"{head}<body><h1 class="headline">A</h1><h1 class="headline">B</h1></body>"#);
    assert_eq!(select_in(&two, &rules), single("Fallback title"));

    let one = format!(r#"{head}<body><h1 class="headline">Only</h1></body>"#);
    assert_eq!(select_in(&one, &rules), single("Only"));
}

#[test]
fn empty_match_is_content_not_error() {
    let rules = FieldRules::new([SelectionRule::first(".blank")]);
    assert_eq!(
        select_in(r#"<span class="blank">  </span>"#, &rules),
        SelectionResult::Content(None)
    );
    assert!(select_in("<p>nothing</p>", &rules).is_error());
}

#[test]
fn match_attr_yields_attribute_value() {
    let rules = FieldRules::new([SelectionRule::exactly_one(Selector::match_attr("time", "datetime"))]);
    let html = r#"<time datetime="">bad</time><time datetime="2020-02-02">good</time>"#;
    assert_eq!(select_in(html, &rules), single("2020-02-02"));
}

#[test]
fn clean_selectors_strip_from_the_match_only() {
    let rules = FieldRules::new([SelectionRule::first(".byline")]).with_clean(&[".label"]);
    let html = r#"<p class="byline"><span class="label">Written by</span> Ada</p><span class="label">kept</span>"#;
    let doc = dom::parse(html);
    let opts = ExtractorOptions::new(&doc, html, URL);
    assert_eq!(
        select(&Field::Extended("byline".to_string()), &rules, &opts, None),
        single("Ada")
    );
    assert_eq!(doc.select(".label").length(), 2);
}

#[test]
fn legacy_json_rule_set_is_migrated() {
    let json = r#"{
        "domain": "www.example.com",
        "title": { "selectors": [["meta[name=\"og:title\"]", "value"], "h1"] },
        "content": { "selectors": [[".intro", ".body"]], "clean": [".ad"] }
    }"#;
    let rules = match ExtractionRuleSet::from_json(json) {
        Ok(rules) => rules,
        Err(err) => panic!("rule set rejected: {err}"),
    };

    let html = r#"<html><head><meta name="og:title" value="From meta"></head>
        <body><h1>From heading</h1></body></html>"#;
    let title = rules.title.as_ref().map(|r| select_in(html, r));
    assert_eq!(title, Some(single("From meta")));
}

#[test]
fn transformed_legacy_selection_is_rejected() {
    let json = r#"{ "domain": "www.example.com", "lead_image_url": { "selectors": [["img", "src", "fn"]] } }"#;
    match ExtractionRuleSet::from_json(json) {
        Ok(_) => panic!("expected the three-part selection to be rejected"),
        Err(err) => assert!(err.to_string().contains("Unmigrated")),
    }
}

#[test]
fn clean_applies_to_selected_table_rows() {
    let rules = FieldRules::new([SelectionRule::first("tr.row")]).with_clean(&[".junk"]);
    let table = r#"<table><tr class="row"><td>Keep me</td><td class="junk">DROP ME</td></tr></table>"#;
    assert_eq!(select_in(table, &rules), single("Keep me"));

    let div = r#"<div class="row"><span>Keep me</span><span class="junk">DROP ME</span></div>"#;
    let rules = FieldRules::new([SelectionRule::first("div.row")]).with_clean(&[".junk"]);
    assert_eq!(select_in(div, &rules), single("Keep me"));
}
