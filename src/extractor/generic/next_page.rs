//! Next-page link discovery for paginated articles.
//!
//! A `rel="next"` link is taken as is. Otherwise every same-host link whose
//! path carries a number is scored on its text, its classes, its ancestors
//! and its similarity to the article URL; the best link scoring at least
//! [`MIN_NEXT_PAGE_SCORE`] wins.

use std::sync::LazyLock;

use dom_query::{NodeRef, Selection};
use regex::Regex;

use crate::dom::class_and_id;
use crate::options::ExtractorOptions;
use crate::patterns::{
    EXTRANEOUS_LINK_HINTS_RE, NEGATIVE_SCORE_HINTS, NEXT_LINK_TEXT_RE, PAGE_IN_HREF_RE, PAGE_RE,
    POSITIVE_SCORE_HINTS, PREV_LINK_TEXT_RE,
};
use crate::url_utils::{article_base_url, create_absolute_url, parse_url, remove_anchor};

/// Lowest score accepted as the next page.
const MIN_NEXT_PAGE_SCORE: f64 = 50.0;

/// Link text longer than this is prose, not pagination.
const MAX_LINK_TEXT_LENGTH: usize = 25;

/// Ancestors inspected for pagination hints.
const PARENT_LEVELS: usize = 4;

#[allow(clippy::expect_used)]
static CAP_LINK_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(first|last|end)").expect("CAP_LINK_TEXT_RE regex"));

#[allow(clippy::expect_used)]
static DIGIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d").expect("DIGIT_RE regex"));

/// Absolute URL of the article's next page.
#[must_use]
pub fn extract(opts: &ExtractorOptions) -> Option<String> {
    let page = parse_url(opts.url)?;
    let article_url = remove_anchor(opts.url);

    if let Some(next) = rel_next(opts, &page, &article_url) {
        return Some(next);
    }

    let base_url = article_base_url(opts.url);
    let context = LinkContext {
        article_url: &article_url,
        base_url: &base_url,
        host: page.host_str().unwrap_or_default(),
        previous_urls: opts.previous_urls,
        is_wordpress: opts.doc.select(r#"meta[name=generator][value^=WordPress]"#).exists(),
    };

    let mut candidates: Vec<ScoredLink> = Vec::new();
    for link in opts.doc.select("a[href]").nodes() {
        let sel = Selection::from(*link);
        let Some(raw) = sel.attr("href") else {
            continue;
        };
        let href = remove_anchor(&create_absolute_url(&raw, &page));
        let text = sel.text().to_string();
        if !context.should_score(&href, &text) {
            continue;
        }

        let score = context.score(link, &sel, &href, &text);
        match candidates.iter_mut().find(|c| c.href == href) {
            Some(existing) => {
                existing.text = format!("{}|{text}", existing.text);
                existing.score = score;
            }
            None => candidates.push(ScoredLink { href, text, score }),
        }
    }

    let mut top: Option<&ScoredLink> = None;
    for candidate in &candidates {
        if top.is_none_or(|best| candidate.score > best.score) {
            top = Some(candidate);
        }
    }
    top.filter(|link| link.score >= MIN_NEXT_PAGE_SCORE)
        .map(|link| link.href.clone())
}

/// A `link` or `a` marked `rel="next"` that is not a page already seen.
fn rel_next(opts: &ExtractorOptions, page: &url::Url, article_url: &str) -> Option<String> {
    let href = opts.doc.select(r#"link[rel~="next"], a[rel~="next"]"#).first().attr("href")?;
    let href = remove_anchor(&create_absolute_url(&href, page));
    let seen = href == article_url || opts.previous_urls.iter().any(|url| remove_anchor(url) == href);
    (!href.is_empty() && !seen).then_some(href)
}

#[derive(Debug)]
struct ScoredLink {
    href: String,
    text: String,
    score: f64,
}

struct LinkContext<'a> {
    article_url: &'a str,
    base_url: &'a str,
    host: &'a str,
    previous_urls: &'a [String],
    is_wordpress: bool,
}

impl LinkContext<'_> {
    fn should_score(&self, href: &str, text: &str) -> bool {
        if href.is_empty() || href == self.article_url || href == self.base_url {
            return false;
        }
        if self.previous_urls.iter().any(|url| url == href) {
            return false;
        }
        if parse_url(href).and_then(|u| u.host_str().map(str::to_string)).as_deref() != Some(self.host) {
            return false;
        }
        let fragment = href.replacen(self.base_url, "", 1);
        if !DIGIT_RE.is_match(&fragment) {
            return false;
        }
        !EXTRANEOUS_LINK_HINTS_RE.is_match(text) && text.chars().count() <= MAX_LINK_TEXT_LENGTH
    }

    fn score(&self, link: &NodeRef, sel: &Selection, href: &str, text: &str) -> f64 {
        let link_data = format!("{text} {}", class_and_id(sel));
        let page_num = page_num_from_url(href);

        let mut score = score_base_url(href, self.base_url);
        score += score_next_link_text(&link_data);
        score += score_cap_links(&link_data);
        score += score_prev_link(&link_data);
        score += score_by_parents(link);
        score += score_extraneous_links(href);
        score += score_page_in_link(page_num, self.is_wordpress);
        score += score_link_text(text, page_num);
        score += score_similarity(score, self.article_url, href);
        score
    }
}

// ============================================================
// LINK SCORES
// ============================================================

/// The page number in `url`, when it is plausibly one.
fn page_num_from_url(url: &str) -> Option<u32> {
    let caps = PAGE_IN_HREF_RE.captures(url)?;
    let num: u32 = caps.get(6)?.as_str().parse().ok()?;
    (num < 100).then_some(num)
}

fn score_base_url(href: &str, base_url: &str) -> f64 {
    let matches = href
        .get(..base_url.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(base_url));
    if matches {
        0.0
    } else {
        -25.0
    }
}

fn score_next_link_text(link_data: &str) -> f64 {
    if NEXT_LINK_TEXT_RE.is_match(link_data) {
        50.0
    } else {
        0.0
    }
}

/// "First" and "last" links often carry a next-ish arrow too.
fn score_cap_links(link_data: &str) -> f64 {
    if CAP_LINK_TEXT_RE.is_match(link_data) && NEXT_LINK_TEXT_RE.is_match(link_data) {
        -65.0
    } else {
        0.0
    }
}

fn score_prev_link(link_data: &str) -> f64 {
    if PREV_LINK_TEXT_RE.is_match(link_data) {
        -200.0
    } else {
        0.0
    }
}

fn score_by_parents(link: &NodeRef) -> f64 {
    let mut score = 0.0;
    let mut positive_match = false;
    let mut negative_match = false;

    let mut parent = link.parent().filter(NodeRef::is_element);
    for _ in 0..PARENT_LEVELS {
        let Some(node) = parent else {
            break;
        };
        let parent_data = class_and_id(&Selection::from(node));
        if !positive_match && PAGE_RE.is_match(&parent_data) {
            positive_match = true;
            score += 25.0;
        }
        if !negative_match
            && NEGATIVE_SCORE_HINTS.is_match(&parent_data)
            && EXTRANEOUS_LINK_HINTS_RE.is_match(&parent_data)
            && !POSITIVE_SCORE_HINTS.is_match(&parent_data)
        {
            negative_match = true;
            score -= 25.0;
        }
        parent = node.parent().filter(NodeRef::is_element);
    }
    score
}

fn score_extraneous_links(href: &str) -> f64 {
    if EXTRANEOUS_LINK_HINTS_RE.is_match(href) {
        -25.0
    } else {
        0.0
    }
}

fn score_page_in_link(page_num: Option<u32>, is_wordpress: bool) -> f64 {
    if page_num.is_some() && !is_wordpress {
        50.0
    } else {
        0.0
    }
}

/// Bare page numbers: low numbers are probably earlier pages.
fn score_link_text(text: &str, page_num: Option<u32>) -> f64 {
    let Ok(link_num) = text.trim().parse::<u32>() else {
        return 0.0;
    };

    let mut score = if link_num < 2 {
        -30.0
    } else {
        f64::from(10_u32.saturating_sub(link_num))
    };
    if page_num.is_some_and(|page| page >= link_num) {
        score -= 50.0;
    }
    score
}

/// Links that differ too much from the article URL lose points; only
/// already-positive links are adjusted.
fn score_similarity(score: f64, article_url: &str, href: &str) -> f64 {
    if score <= 0.0 {
        return 0.0;
    }
    let ratio = similarity_ratio(article_url, href);
    let diff_percent = 1.0 - ratio;
    let diff_modifier = -(250.0 * (diff_percent - 0.2));
    score + diff_modifier
}

/// `2 * matches / total length`, matches counted by recursively taking the
/// longest common block.
fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (start_a, start_b, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..start_a], &b[..start_b])
        + matching_chars(&a[start_a + len..], &b[start_b + len..])
}

fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut lengths = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        let mut next = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                next[j + 1] = lengths[j] + 1;
                if next[j + 1] > best.2 {
                    best = (i + 1 - next[j + 1], j + 1 - next[j + 1], next[j + 1]);
                }
            }
        }
        lengths = next;
    }
    best
}
