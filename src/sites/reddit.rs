//! www.reddit.com and old.reddit.com

use std::sync::LazyLock;

use dom_query::Selection;
use regex::Regex;

use crate::selector::{
    ChildLevelRules, CommentRules, ExtractionRuleSet, FieldRules, SelectionRule, Selector, Transform,
};

const POST: &str = r#"div[data-test-id="post-content"]"#;

#[allow(clippy::expect_used)]
static BACKGROUND_IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"background-image\s*:\s*url\((.*?)\)"#).expect("BACKGROUND_IMAGE_URL regex")
});

#[must_use]
pub fn rules() -> ExtractionRuleSet {
    let external_link = format!(r#"{POST} a[target="_blank"]:not([data-click-id="timestamp"])"#);
    let media = format!(r#"{POST} div[data-click-id="media"]"#);

    ExtractionRuleSet {
        supported_domains: vec!["old.reddit.com".to_string()],
        title: Some(FieldRules::new([SelectionRule::exactly_one(format!("{POST} h2"))])),
        author: Some(FieldRules::new([SelectionRule::first(format!(r#"{POST} a[href*="user/"]"#))])),
        date_published: Some(FieldRules::new([SelectionRule::exactly_one(format!(
            r#"{POST} a[data-click-id="timestamp"]"#
        ))])),
        lead_image_url: Some(FieldRules::new([SelectionRule::first(Selector::match_attr(
            r#"meta[name="og:image"]"#,
            "value",
        ))])),
        content: Some(
            FieldRules::new([
                SelectionRule::multi_grouped(format!("{POST} p")),
                SelectionRule::multi_grouped(Selector::match_all([external_link.clone(), media.clone()])),
                SelectionRule::multi_grouped(media),
                SelectionRule::multi_grouped(external_link),
                SelectionRule::multi_grouped(POST),
            ])
            .with_transform(r#"div[role="img"]"#, Transform::function(background_image_to_img))
            .with_clean(&[".icon"]),
        ),
        comment: Some(CommentRules {
            top_level: FieldRules::new([SelectionRule::multi_array(".commentarea > div > .comment")]),
            child_level: Some(ChildLevelRules {
                selectors: vec![SelectionRule::multi_array("> .child > div > .comment").into()],
                ..ChildLevelRules::default()
            }),
            author: Some(FieldRules::new([SelectionRule::first(".author").html()])),
            score: Some(FieldRules::new([SelectionRule::first(".score")])),
            date: Some(FieldRules::new([SelectionRule::first(Selector::match_attr("time", "datetime"))])),
            text: FieldRules::new([SelectionRule::first(".usertext-body").html()]),
        }),
        ..ExtractionRuleSet::new("www.reddit.com")
    }
}

/// Link previews draw their image as a CSS background; replace the wrapper
/// with its lone `img`, pointed at that background.
fn background_image_to_img(node: &Selection) -> Option<String> {
    let img = node.select("img");
    if img.length() != 1 {
        return None;
    }
    let style = node.attr("style")?;
    let src = BACKGROUND_IMAGE_URL.captures(&style)?.get(1)?.as_str().replace(['\'', '"'], "");

    img.set_attr("src", src.trim());
    node.replace_with_html(img.html());
    None
}
