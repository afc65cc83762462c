//! Heuristic extraction of parts, tools, prices and videos from site markup.
//!
//! Nothing in here returns an error. A node or string that does not look like
//! a listing yields `None`.

mod part;
mod row;
pub mod rules;
mod video;

use scraper::ElementRef;

use crate::config::BASE_URL;

pub use part::{extract_part, extract_part_from_text};
pub use row::{extract_part_from_row, extract_tool_from_row};
pub use video::extract_video_url;

/// All text below `element`, whitespace-collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolves a site-relative link. Empty input has no URL.
pub fn absolute_url(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        None
    } else if href.starts_with("http") {
        Some(href.to_string())
    } else if href.starts_with("//") {
        Some(format!("https:{href}"))
    } else if href.starts_with('/') {
        Some(format!("{BASE_URL}{href}"))
    } else {
        Some(format!("{BASE_URL}/{href}"))
    }
}

/// Upper-cases the first letter of every alphabetic run, lower-cases the rest.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// True when any whole word of `text` is a page-control keyword.
pub(crate) fn is_ui_noise(text: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|w| rules::UI_NOISE.iter().any(|n| w.eq_ignore_ascii_case(n)))
}

pub(crate) fn remove_ignoring_case(text: &str, literal: &str) -> String {
    match regex::Regex::new(&format!("(?i){}", regex::escape(literal))) {
        Ok(re) => re.replace_all(text, "").into_owned(),
        Err(_) => text.to_string(),
    }
}

pub(crate) fn is_part_number(candidate: &str) -> bool {
    candidate.len() >= 4 && candidate.chars().any(|c| c.is_ascii_digit())
}
