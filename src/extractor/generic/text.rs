//! Fields derived from the extracted text: excerpt, word count, direction.

use crate::dom::{self, strip_tags};
use crate::options::ExtractorOptions;
use crate::patterns::{LTR_CHARS, RTL_CHARS, WHITESPACE_RUN};
use crate::result::TextDirection;

use super::extract_from_meta;

const EXCERPT_META_TAGS: &[&str] = &["og:description", "twitter:description"];

/// Longest excerpt, in characters, before it is cut at a word boundary.
const EXCERPT_MAX_LENGTH: usize = 200;

const ELLIPSIS: &str = "&hellip;";

/// A short plain-text summary: the page's description meta, or the start
/// of the content.
#[must_use]
pub fn excerpt(opts: &ExtractorOptions) -> Option<String> {
    if let Some(description) = extract_from_meta(opts, EXCERPT_META_TAGS, true) {
        return Some(clean_excerpt(&strip_tags(&description))).filter(|e| !e.is_empty());
    }

    let content = opts.content?;
    let text = content_text(content);
    Some(clean_excerpt(&text)).filter(|e| !e.is_empty())
}

fn clean_excerpt(text: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(text, " ");
    let collapsed = collapsed.replace('\n', " ");
    ellipsize(collapsed.trim(), EXCERPT_MAX_LENGTH)
}

/// Cut `text` at the last space or hyphen that keeps it under `max`
/// characters and mark the cut.
fn ellipsize(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut cut = None;
    for (count, (index, c)) in text.char_indices().enumerate() {
        if count >= max {
            break;
        }
        if c == ' ' || c == '-' {
            cut = Some(index);
        }
    }
    let cut = cut.unwrap_or_else(|| {
        text.char_indices()
            .nth(max.saturating_sub(1))
            .map_or(text.len(), |(index, _)| index)
    });
    format!("{}{ELLIPSIS}", text[..cut].trim_end())
}

/// Whitespace-separated words in the content's text.
#[must_use]
pub fn word_count(content: Option<&str>) -> usize {
    content.map_or(0, |content| content_text(content).split_whitespace().count())
}

/// Right-to-left when the title and content hold more right-to-left
/// script characters than left-to-right ones.
#[must_use]
pub fn direction(title: Option<&str>, content: Option<&str>) -> TextDirection {
    let mut text = title.unwrap_or_default().to_string();
    if let Some(content) = content {
        text.push(' ');
        text.push_str(&content_text(content));
    }

    let rtl = RTL_CHARS.find_iter(&text).count();
    let ltr = LTR_CHARS.find_iter(&text).count();
    if rtl > ltr {
        TextDirection::Rtl
    } else {
        TextDirection::Ltr
    }
}

fn content_text(content: &str) -> String {
    let doc = dom::parse(&format!("<div>{content}</div>"));
    dom::fragment_root(&doc).text().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_prefers_description() {
        let html = r#"<head><meta name="og:description" value="A  short   summary."></head>"#;
        let doc = dom::parse(html);
        let opts = ExtractorOptions {
            content: Some("<p>Body text</p>"),
            ..ExtractorOptions::new(&doc, html, "https://example.com/")
        };
        assert_eq!(excerpt(&opts).as_deref(), Some("A short summary."));
    }

    #[test]
    fn test_excerpt_from_content_is_ellipsized() {
        let doc = dom::parse("<p></p>");
        let body = format!("<p>{}</p>", "lorem ipsum ".repeat(40));
        let opts = ExtractorOptions {
            content: Some(&body),
            ..ExtractorOptions::new(&doc, "", "https://example.com/")
        };
        let Some(excerpt) = excerpt(&opts) else {
            panic!("no excerpt");
        };
        assert!(excerpt.ends_with("&hellip;"));
        assert!(excerpt.chars().count() <= EXCERPT_MAX_LENGTH + ELLIPSIS.len());
        assert!(excerpt.starts_with("lorem ipsum lorem"));
    }

    #[test]
    fn test_ellipsize_short_text_untouched() {
        assert_eq!(ellipsize("short text", 200), "short text");
        assert_eq!(ellipsize("one two three", 8), "one two&hellip;");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(Some("<div><p>One two</p>\n<p>three\nfour</p></div>")), 4);
        assert_eq!(word_count(None), 0);
    }

    #[test]
    fn test_direction() {
        assert_eq!(direction(Some("Hello"), Some("<p>world</p>")), TextDirection::Ltr);
        assert_eq!(direction(Some("שלום עולם"), Some("<p>טקסט בעברית</p>")), TextDirection::Rtl);
        assert_eq!(direction(None, None), TextDirection::Ltr);
    }
}
