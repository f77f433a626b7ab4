//! HTML Processing and Cleaning
//!
//! Structural passes over a document or a candidate region. The preparation
//! passes (`strip_unlikely_candidates`, `convert_to_paragraphs`) run on a
//! whole document before scoring; the cleaning passes take a region and only
//! touch the region and its descendants, so they work the same on a page
//! and on an isolated fragment.

use url::Url;

use crate::dom::{self, convert_node_to, is_tag, node_tag, Document, NodeRef, Selection};
use crate::link_density::link_density;
use crate::patterns::{
    BLOCK_LEVEL_TAGS, CANDIDATES_BLACKLIST, CANDIDATES_WHITELIST, CLEAN_CONDITIONALLY_TAGS,
    CLEAN_WRAPPING_TAGS, DIV_TO_P_BLOCK_TAGS, HEADER_TAGS, KEEP_CLASS, KEEP_SELECTORS,
    SPACER_RE, STRIP_OUTPUT_TAGS, WHITELIST_ATTRS,
};
use crate::scoring::{get_weight, score_commas, ScoreTable};
use crate::url_utils::{absolutize_srcset, create_absolute_url};

// === Document Preparation ===

/// Remove nodes whose class/id marks them as chrome.
///
/// Anchors are never removed: content is often linked from blocks that look
/// like navigation.
pub fn strip_unlikely_candidates(doc: &Document) {
    let nodes: Vec<NodeRef> = doc.select("*").nodes().to_vec();
    for node in nodes {
        if node_tag(&node).as_deref() == Some("a") {
            continue;
        }
        let sel = Selection::from(node);
        if sel.attr("class").is_none() && sel.attr("id").is_none() {
            continue;
        }
        let class_and_id = dom::class_and_id(&sel);
        if CANDIDATES_WHITELIST.is_match(&class_and_id) {
            continue;
        }
        if CANDIDATES_BLACKLIST.is_match(&class_and_id) {
            sel.remove();
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn next_element_sibling<'a>(node: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    let mut sibling = node.next_sibling();
    while let Some(s) = sibling {
        if s.is_element() {
            return Some(s);
        }
        sibling = s.next_sibling();
    }
    None
}

/// Replace a `br` and the inline run after it with one paragraph.
fn paragraphize(br: &NodeRef) {
    let mut html = String::from("<p>");
    let mut absorbed: Vec<NodeRef> = Vec::new();
    let mut sibling = br.next_sibling();
    while let Some(s) = sibling {
        if s.is_element() && is_tag(&s, BLOCK_LEVEL_TAGS) {
            break;
        }
        if s.is_element() {
            html.push_str(&Selection::from(s).html());
        } else if s.is_text() {
            html.push_str(&escape_text(&s.text()));
        }
        absorbed.push(s);
        sibling = s.next_sibling();
    }
    html.push_str("</p>");

    for node in absorbed {
        Selection::from(node).remove();
    }
    Selection::from(*br).replace_with_html(html);
}

/// Collapse runs of `<br>` into paragraph breaks.
///
/// All but the last `br` of a run are dropped, and the last one becomes a
/// `p` holding the inline content that follows it.
pub fn brs_to_ps(doc: &Document) {
    let brs: Vec<NodeRef> = doc.select("br").nodes().to_vec();
    let mut collapsing = false;
    for br in brs {
        let next_is_br = next_element_sibling(&br)
            .is_some_and(|next| node_tag(&next).as_deref() == Some("br"));
        if next_is_br {
            collapsing = true;
            Selection::from(br).remove();
        } else if collapsing {
            collapsing = false;
            paragraphize(&br);
        }
    }
}

/// Turn text-only containers into paragraphs so the scorer sees them.
///
/// `br` runs become paragraphs, `div`s without block children become `p`,
/// and `span`s outside any `p`, `div`, `li` or `figcaption` become `p`.
pub fn convert_to_paragraphs(doc: &Document) {
    brs_to_ps(doc);

    for div in doc.select("div").nodes().to_vec() {
        let sel = Selection::from(div);
        if !sel.children().is(DIV_TO_P_BLOCK_TAGS) {
            convert_node_to(&sel, "p");
        }
    }

    for span in doc.select("span").nodes().to_vec() {
        let mut ancestor = span.parent();
        let mut enclosed = false;
        while let Some(node) = ancestor {
            if is_tag(&node, &["p", "div", "li", "figcaption"]) {
                enclosed = true;
                break;
            }
            ancestor = node.parent();
        }
        if !enclosed {
            convert_node_to(&Selection::from(span), "p");
        }
    }
}

// === Region Cleaning ===

/// Descendants of `region` matching `selector`, in document order.
fn region_matches<'a>(region: &Selection<'a>, selector: &str) -> Vec<NodeRef<'a>> {
    region.select(selector).nodes().to_vec()
}

/// Rename `html` and `body` (the region itself included) to `div`.
pub fn rewrite_top_level(region: &Selection) {
    if let Some(root) = region.nodes().first() {
        if is_tag(root, &["html", "body"]) {
            convert_node_to(region, "div");
        }
    }
    for node in region_matches(region, "html, body") {
        convert_node_to(&Selection::from(node), "div");
    }
}

/// Drop tiny and spacer images; remove `height` from the rest.
pub fn clean_images(region: &Selection) {
    for img in region_matches(region, "img") {
        let sel = Selection::from(img);
        let height = sel
            .attr("height")
            .and_then(|h| leading_int(&h));
        let width = sel
            .attr("width")
            .and_then(|w| leading_int(&w))
            .filter(|w| *w != 0)
            .unwrap_or(20);

        if height.filter(|h| *h != 0).unwrap_or(20) < 10 || width < 10 {
            sel.remove();
            continue;
        }
        if height.is_some_and(|h| h != 0) {
            sel.remove_attr("height");
        }

        if sel.attr("src").is_some_and(|src| SPACER_RE.is_match(&src)) {
            sel.remove();
        }
    }
}

/// Integer prefix of an attribute value (`"300px"` is 300).
fn leading_int(value: &str) -> Option<i64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map_or(value.len(), |(i, _)| i);
    value[..end].parse().ok()
}

/// The `href` of the page's `<base>` tag, unless it is protocol-relative.
#[must_use]
pub fn document_base_href(doc: &Document) -> Option<String> {
    doc.select("base[href]")
        .attr("href")
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty() && !href.starts_with("//"))
}

/// Resolve `href`, `src` and `srcset` below `region` against the page URL.
///
/// `href` and `src` honour the page's `<base>`; `srcset` candidates always
/// resolve against the page URL itself.
pub fn make_links_absolute(region: &Selection, url: &str, base_href: Option<&str>) {
    let Ok(root) = Url::parse(url) else {
        return;
    };
    let base = base_href
        .and_then(|href| root.join(href).ok())
        .unwrap_or_else(|| root.clone());

    for attr in ["href", "src"] {
        let mut nodes = region_matches(region, &format!("[{attr}]"));
        if region.is(&format!("[{attr}]")) {
            nodes.extend(region.nodes().first().copied());
        }
        for node in nodes {
            let sel = Selection::from(node);
            let Some(value) = sel.attr(attr).filter(|v| !v.is_empty()) else {
                continue;
            };
            let absolute = create_absolute_url(&value, &base);
            sel.set_attr(attr, &absolute);
        }
    }

    for node in region_matches(region, "[srcset]") {
        let sel = Selection::from(node);
        let Some(srcset) = sel.attr("srcset").filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        let absolute = absolutize_srcset(&srcset, &root);
        if absolute.is_empty() {
            sel.remove_attr("srcset");
        } else {
            sel.set_attr("srcset", &absolute);
        }
    }
}

/// Tag embeds that must survive junk stripping with the keep class.
///
/// Known video players always qualify; so do iframes served from the page's
/// own host.
pub fn mark_to_keep(region: &Selection, url: &str) {
    let mut selectors: Vec<String> = KEEP_SELECTORS.iter().map(|s| (*s).to_string()).collect();
    if let Ok(parsed) = Url::parse(url) {
        if let Some(host) = parsed.host_str() {
            selectors.push(format!(r#"iframe[src^="{}://{host}"]"#, parsed.scheme()));
        }
    }
    for node in region_matches(region, &selectors.join(", ")) {
        dom::add_class(&Selection::from(node), KEEP_CLASS);
    }
}

/// Remove tags that never belong in output, unless marked to keep.
pub fn strip_junk_tags(region: &Selection) {
    for node in region_matches(region, &STRIP_OUTPUT_TAGS.join(", ")) {
        let sel = Selection::from(node);
        if !sel.has_class(KEEP_CLASS) {
            sel.remove();
        }
    }
}

/// Remove `h1`s when there are fewer than three, otherwise demote them to `h2`.
///
/// A couple of `h1`s in a body are almost always the title repeated; many
/// of them are the article's own section structure.
pub fn clean_h_ones(region: &Selection) {
    let h_ones = region_matches(region, "h1");
    if h_ones.len() < 3 {
        for node in h_ones {
            Selection::from(node).remove();
        }
    } else {
        for node in h_ones {
            convert_node_to(&Selection::from(node), "h2");
        }
    }
}

/// Remove headers that precede every paragraph, repeat the title, or carry
/// a negative class/id weight.
pub fn clean_headers(region: &Selection, title: &str) {
    for header in region_matches(region, HEADER_TAGS) {
        let sel = Selection::from(header);

        let mut has_previous_paragraph = false;
        let mut sibling = header.prev_sibling();
        while let Some(s) = sibling {
            if node_tag(&s).as_deref() == Some("p") {
                has_previous_paragraph = true;
                break;
            }
            sibling = s.prev_sibling();
        }

        if !has_previous_paragraph
            || dom::normalize_spaces(&sel.text()) == title
            || get_weight(&sel) < 0
        {
            sel.remove();
        }
    }
}

/// Whether a conditionally-cleaned node still looks like content.
fn does_contain_content(node: &Selection, weight: f64) -> bool {
    // Publisher-declared content assets are always kept.
    if node.has_class("entry-content-asset") {
        return true;
    }

    let content = dom::normalize_spaces(&node.text());
    if score_commas(&content) >= 10 {
        return true;
    }

    let p_count = node.select("p").length();
    let input_count = node.select("input").length();
    if input_count as f64 > p_count as f64 / 3.0 {
        return false;
    }

    let content_length = content.chars().count();
    let img_count = node.select("img").length();
    if content_length < 25 && img_count == 0 {
        return false;
    }

    let density = link_density(node);
    if weight < 25.0 && density > 0.2 && content_length > 75 {
        return false;
    }

    if weight >= 25.0 && density > 0.5 {
        // A link-heavy list introduced by "...:" is an enumeration, not a menu.
        let is_list = dom::tag_name(node).is_some_and(|t| t == "ul" || t == "ol");
        if is_list {
            let previous_ends_with_colon = dom::previous_element_sibling(node)
                .is_some_and(|prev| dom::normalize_spaces(&prev.text()).ends_with(':'));
            if previous_ends_with_colon {
                return true;
            }
        }
        return false;
    }

    let script_count = node.select("script").length();
    if script_count > 0 && content_length < 150 {
        return false;
    }

    true
}

/// Conditionally remove lists, tables, divs, buttons and forms that score
/// badly or do not look like content.
///
/// Unscored nodes are scored on the spot, with class/id weighting, and the
/// score is recorded.
pub fn clean_tags(region: &Selection, table: &mut ScoreTable) {
    let Some(root) = region.nodes().first().copied() else {
        return;
    };
    for node in region_matches(region, CLEAN_CONDITIONALLY_TAGS) {
        if !dom::is_attached_below(&node, &root) {
            continue;
        }
        let sel = Selection::from(node);
        if sel.has_class(KEEP_CLASS) || sel.select(&format!(".{KEEP_CLASS}")).exists() {
            continue;
        }

        let weight = match table.get(&node) {
            Some(score) if score != 0.0 => score,
            _ => {
                let score = table.get_or_init(&node, true);
                table.set(&node, score);
                score
            }
        };

        if weight < 0.0 || !does_contain_content(&sel, weight) {
            sel.remove();
        }
    }
}

/// Remove paragraphs with no text and no embedded media.
pub fn remove_empty(region: &Selection) {
    for p in region_matches(region, "p") {
        let sel = Selection::from(p);
        if !sel.select("iframe, img").exists() && sel.text().trim().is_empty() {
            sel.remove();
        }
    }
}

/// Strip every attribute outside the whitelist and drop the keep class.
pub fn clean_attributes(region: &Selection) {
    let mut nodes = region.nodes().to_vec();
    nodes.extend(region_matches(region, "*"));
    for node in nodes {
        let sel = Selection::from(node);
        for (name, _) in dom::get_all_attributes(&sel) {
            if !WHITELIST_ATTRS.iter().any(|allowed| allowed.eq_ignore_ascii_case(&name)) {
                sel.remove_attr(&name);
            }
        }
    }
    for node in region_matches(region, &format!(".{KEEP_CLASS}")) {
        dom::remove_class(&Selection::from(node), KEEP_CLASS);
    }
}

/// Unwrap single-child `div`/`span`/`font`/`center` wrappers.
///
/// Descends through wrappers that hold one child. A wrapper holding only
/// text becomes a `p`; an empty one is removed. Returns the innermost
/// meaningful node, or `None` when nothing is left.
pub fn clean_wrapping_tags<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let mut current = node;
    loop {
        if !is_tag(&current, CLEAN_WRAPPING_TAGS) {
            return Some(current);
        }
        let children = dom::meaningful_children(&current);
        if children.len() >= 2 {
            return Some(current);
        }
        match children.first() {
            None => {
                Selection::from(current).remove();
                return None;
            }
            Some(child) if child.is_text() => {
                convert_node_to(&Selection::from(current), "p");
                return Some(current);
            }
            Some(child) => current = *child,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    fn body(doc: &Document) -> Selection<'_> {
        doc.select("body")
    }

    #[test]
    fn test_strip_unlikely_candidates() {
        let doc = parse(
            r#"<div class="sidebar">Ads</div><div class="sidebar main-content">Keep</div><a class="share" href="/">Link</a>"#,
        );
        strip_unlikely_candidates(&doc);
        assert!(!doc.select("div.sidebar:not(.main-content)").exists());
        assert!(doc.select(".main-content").exists());
        assert!(doc.select("a.share").exists());
    }

    #[test]
    fn test_brs_to_ps() {
        let doc = parse("<div>First line<br><br>Second line <b>bold</b><p>Block</p></div>");
        brs_to_ps(&doc);
        assert!(!doc.select("br").exists());
        let p = doc.select("div > p").first();
        assert_eq!(p.text().to_string().trim(), "Second line bold");
    }

    #[test]
    fn test_convert_to_paragraphs() {
        let doc = parse(
            r#"<div id="text">Only inline <em>text</em></div><div id="block"><p>x</p></div><span id="loose">Loose</span>"#,
        );
        convert_to_paragraphs(&doc);
        assert!(doc.select("p#text").exists());
        assert!(doc.select("div#block").exists());
        assert!(doc.select("p#loose").exists());
    }

    #[test]
    fn test_clean_h_ones_two_removed() {
        let doc = parse("<div><h1>A</h1><p>x</p><h1>B</h1></div>");
        clean_h_ones(&body(&doc));
        assert_eq!(doc.select("h1, h2").length(), 0);
    }

    #[test]
    fn test_clean_h_ones_three_demoted() {
        let doc = parse("<div><h1>A</h1><h1>B</h1><h1>C</h1></div>");
        clean_h_ones(&body(&doc));
        assert_eq!(doc.select("h1").length(), 0);
        assert_eq!(doc.select("h2").length(), 3);
    }

    #[test]
    fn test_clean_headers() {
        let doc = parse(
            r#"<div><h2>Before</h2><p>Text</p><h2>The Title</h2><h3 class="sidebar">Junk</h3><h3>Section</h3></div>"#,
        );
        clean_headers(&body(&doc), "The Title");
        let remaining: Vec<String> = doc.select("h2, h3").iter().map(|h| h.text().to_string()).collect();
        assert_eq!(remaining, vec!["Section".to_string()]);
    }

    #[test]
    fn test_clean_images() {
        let doc = parse(
            r#"<div><img src="a.jpg" height="5"><img src="b.jpg" height="300" width="400"><img src="spacer.gif"></div>"#,
        );
        clean_images(&body(&doc));
        let imgs = doc.select("img");
        assert_eq!(imgs.length(), 1);
        assert!(!imgs.has_attr("height"));
        assert!(imgs.has_attr("width"));
    }

    #[test]
    fn test_clean_attributes() {
        let doc = parse(r#"<div><p style="color:red" align="center" class="article-parser-keep lead" id="p1">x</p></div>"#);
        clean_attributes(&body(&doc));
        let p = doc.select("p");
        assert!(!p.has_attr("style"));
        assert!(!p.has_attr("align"));
        assert_eq!(p.attr("class").map(|c| c.to_string()), Some("lead".to_string()));
        assert_eq!(p.attr("id").map(|c| c.to_string()), Some("p1".to_string()));
    }

    #[test]
    fn test_strip_junk_tags_keeps_marked_embeds() {
        let doc = parse(
            r#"<div><iframe src="https://www.youtube.com/embed/x"></iframe><iframe src="https://ads.example.net/x"></iframe><hr><p>x</p></div>"#,
        );
        let region = body(&doc);
        mark_to_keep(&region, "https://example.com/post");
        strip_junk_tags(&region);
        assert_eq!(doc.select("iframe").length(), 1);
        assert!(!doc.select("hr").exists());
    }

    #[test]
    fn test_make_links_absolute_uses_base() {
        let doc = parse(
            r#"<head><base href="/static/"></head><body><div><a href="page.html">x</a><img src="i.png" srcset="i.png 1x, i2.png 2x"></div></body>"#,
        );
        let base = document_base_href(&doc);
        make_links_absolute(&doc.select("body > div"), "https://example.com/news/a", base.as_deref());
        assert_eq!(
            doc.select("a").attr("href").map(|s| s.to_string()),
            Some("https://example.com/static/page.html".to_string())
        );
        assert_eq!(
            doc.select("img").attr("srcset").map(|s| s.to_string()),
            Some("https://example.com/news/i.png 1x, https://example.com/news/i2.png 2x".to_string())
        );
    }

    #[test]
    fn test_remove_empty() {
        let doc = parse(r#"<div><p> </p><p><img src="a.jpg"></p><p>x</p></div>"#);
        remove_empty(&body(&doc));
        assert_eq!(doc.select("p").length(), 2);
    }

    #[test]
    fn test_clean_wrapping_tags() {
        let doc = parse(r#"<div id="w"><span><div>Only text</div></span></div>"#);
        let root = doc.select("#w").nodes()[0];
        let inner = clean_wrapping_tags(root).map(|n| node_tag(&n));
        assert_eq!(inner, Some(Some("p".to_string())));
    }

    #[test]
    fn test_clean_wrapping_tags_empty_removed() {
        let doc = parse(r#"<section><div id="w"><span></span></div></section>"#);
        let root = doc.select("#w").nodes()[0];
        assert!(clean_wrapping_tags(root).is_none());
        assert!(!doc.select("span").exists());
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("300px"), Some(300));
        assert_eq!(leading_int("abc"), None);
    }
}
