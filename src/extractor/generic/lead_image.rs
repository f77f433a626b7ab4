//! Lead image selection.
//!
//! Social meta tags win. Otherwise every image in the extracted content is
//! scored on its URL, its surroundings and its size, and the best one with
//! a positive score is used.

use dom_query::{NodeRef, Selection};

use crate::cleaners::clean_image;
use crate::dom::{self, class_and_id};
use crate::options::ExtractorOptions;
use crate::patterns::{
    GIF_RE, JPG_RE, NEGATIVE_LEAD_IMAGE_URL_HINTS, PHOTO_HINTS, POSITIVE_LEAD_IMAGE_URL_HINTS,
};

use super::extract_from_meta;

const LEAD_IMAGE_URL_META_TAGS: &[&str] = &["og:image", "twitter:image", "image_src"];

const LEAD_IMAGE_URL_SELECTORS: &[&str] = &["link[rel=image_src]"];

/// Absolute URL of the article's main image.
#[must_use]
pub fn extract(opts: &ExtractorOptions) -> Option<String> {
    if let Some(url) = extract_from_meta(opts, LEAD_IMAGE_URL_META_TAGS, true).and_then(|u| clean_image(&u)) {
        return Some(url);
    }

    if let Some(url) = opts.content.and_then(best_content_image) {
        return Some(url);
    }

    for selector in LEAD_IMAGE_URL_SELECTORS {
        let node = opts.doc.select(selector).first();
        let src = node
            .attr("src")
            .or_else(|| node.attr("href"))
            .or_else(|| node.attr("value"));
        if let Some(url) = src.and_then(|s| clean_image(&s)) {
            return Some(url);
        }
    }

    None
}

fn best_content_image(content: &str) -> Option<String> {
    let doc = dom::parse(&format!("<div>{content}</div>"));
    let images = doc.select("img");
    let images = images.nodes();

    // Repeated sources keep their first position and their last score.
    let mut scores: Vec<(String, f64)> = Vec::new();
    for (index, img) in images.iter().enumerate() {
        let sel = Selection::from(*img);
        let Some(src) = sel.attr("src").map(|s| s.to_string()) else {
            continue;
        };

        let score = score_image_url(&src)
            + score_attr(&sel)
            + score_by_parents(img)
            + score_by_sibling(img)
            + score_by_dimensions(&sel, &src)
            + score_by_position(images.len(), index);

        match scores.iter_mut().find(|(seen, _)| *seen == src) {
            Some(entry) => entry.1 = score,
            None => scores.push((src, score)),
        }
    }

    let mut top: Option<(&str, f64)> = None;
    for (src, score) in &scores {
        if *score > top.map_or(0.0, |(_, best)| best) {
            top = Some((src, *score));
        }
    }
    top.and_then(|(src, _)| clean_image(src))
}

// ============================================================
// IMAGE SCORES
// ============================================================

fn score_image_url(url: &str) -> f64 {
    let mut score = 0.0;
    if POSITIVE_LEAD_IMAGE_URL_HINTS.is_match(url) {
        score += 20.0;
    }
    if NEGATIVE_LEAD_IMAGE_URL_HINTS.is_match(url) {
        score -= 20.0;
    }
    if GIF_RE.is_match(url) {
        score -= 10.0;
    }
    if JPG_RE.is_match(url) {
        score += 10.0;
    }
    score
}

fn score_attr(img: &Selection) -> f64 {
    if img.attr("alt").is_some() {
        5.0
    } else {
        0.0
    }
}

fn score_by_parents(img: &NodeRef) -> f64 {
    let mut score = 0.0;

    let mut ancestor = img.parent();
    while let Some(node) = ancestor {
        if dom::is_tag(&node, &["figure"]) {
            score += 25.0;
            break;
        }
        ancestor = node.parent();
    }

    let parent = img.parent().filter(NodeRef::is_element);
    let grandparent = parent.and_then(|p| p.parent()).filter(NodeRef::is_element);
    for node in [parent, grandparent].into_iter().flatten() {
        if PHOTO_HINTS.is_match(&class_and_id(&Selection::from(node))) {
            score += 15.0;
        }
    }
    score
}

fn score_by_sibling(img: &NodeRef) -> f64 {
    let mut sibling = img.next_sibling();
    while let Some(node) = sibling {
        if node.is_element() {
            break;
        }
        sibling = node.next_sibling();
    }
    let Some(sibling) = sibling else {
        return 0.0;
    };

    let mut score = 0.0;
    if dom::is_tag(&sibling, &["figcaption"]) {
        score += 25.0;
    }
    if PHOTO_HINTS.is_match(&class_and_id(&Selection::from(sibling))) {
        score += 15.0;
    }
    score
}

fn score_by_dimensions(img: &Selection, src: &str) -> f64 {
    let dimension = |name: &str| {
        img.attr(name)
            .and_then(|v| leading_number(&v))
            .filter(|v| *v != 0.0)
    };
    let width = dimension("width");
    let height = dimension("height");

    let mut score = 0.0;
    if width.is_some_and(|w| w <= 50.0) {
        score -= 50.0;
    }
    if height.is_some_and(|h| h <= 50.0) {
        score -= 50.0;
    }
    if let (Some(width), Some(height)) = (width, height) {
        if !src.contains("sprite") {
            let area = width * height;
            if area < 5000.0 {
                score -= 100.0;
            } else {
                score += (area / 1000.0).round();
            }
        }
    }
    score
}

/// Earlier images in the content score higher.
fn score_by_position(count: usize, index: usize) -> f64 {
    count as f64 / 2.0 - index as f64
}

/// The numeric prefix of a dimension such as `640px`.
fn leading_number(value: &str) -> Option<f64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map_or(value.len(), |(i, _)| i);
    value[..end].parse().ok()
}
