use scraper::Html;

use super::absolute_url;
use super::rules::{self, VIDEO_RULES};

const VIDEO_SOURCE_HINTS: &[&str] = &[".mp4", ".webm", ".mov", "youtube", "vimeo"];

/// First video reference on a more-info page.
///
/// Plain-text patterns win over `<video>`/`<iframe>` sources.
pub fn extract_video_url(text: &str, document: &Html) -> Option<String> {
    VIDEO_RULES
        .iter()
        .find_map(|video| {
            let m = rules::first_match(std::slice::from_ref(&video.rule), text, |_| true)?;
            video.canonical_url(&m.value)
        })
        .or_else(|| {
            document
                .select(selector!("video[src], iframe[src], video source[src]"))
                .filter_map(|el| el.value().attr("src"))
                .find(|src| VIDEO_SOURCE_HINTS.iter().any(|hint| src.contains(hint)))
                .and_then(absolute_url)
        })
}
