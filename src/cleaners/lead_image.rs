use crate::url_utils::is_absolute_url;

/// Keep a lead image URL only if it is an absolute http(s) URL.
#[must_use]
pub fn clean_image(lead_image_url: &str) -> Option<String> {
    let trimmed = lead_image_url.trim();
    is_absolute_url(trimmed).0.then(|| trimmed.to_string())
}
