use scraper::ElementRef;

use super::rules::{self, BRAND_RULES, NAME_NOISE, PART_NUMBER_RULES, PRICE_RULES};
use super::{
    absolute_url, collapse_whitespace, element_text, is_part_number, is_ui_noise,
    remove_ignoring_case, title_case,
};
use crate::models::PartInfo;

/// Builds a part from a listing node's text and its `href`, if any.
pub fn extract_part(element: ElementRef<'_>) -> Option<PartInfo> {
    extract_part_from_text(&element_text(element), element.value().attr("href"))
}

pub fn extract_part_from_text(text: &str, href: Option<&str>) -> Option<PartInfo> {
    let text = collapse_whitespace(text);
    if text.chars().count() < 3 || is_ui_noise(&text) {
        return None;
    }

    let price = rules::first_match(&PRICE_RULES, &text, |_| true).map(|m| format!("${}", m.value));
    let part_number = rules::first_match(&PART_NUMBER_RULES, &text, is_part_number).map(|m| m.value);
    let brand = rules::first_match(&BRAND_RULES, &text, |_| true).map(|m| title_case(m.value.trim()));

    let name = clean_name(&text, price.is_some(), part_number.as_deref(), brand.as_deref());

    let mut part = PartInfo::new(if name.is_empty() { text.clone() } else { name });
    if let Some(number) = part_number {
        part.part_number = number;
    }
    part.price = price;
    part.brand = brand;
    part.url = href.and_then(absolute_url);
    Some(part)
}

fn clean_name(text: &str, has_price: bool, part_number: Option<&str>, brand: Option<&str>) -> String {
    let mut name = text.to_string();
    if has_price {
        name = regex!(r"\$[0-9,]+\.?[0-9]*").replace_all(&name, "").into_owned();
    }
    for literal in part_number.into_iter().chain(brand) {
        name = remove_ignoring_case(&name, literal);
    }
    for noise in NAME_NOISE {
        name = name.replace(noise, "");
    }
    collapse_whitespace(&name)
        .trim_matches(|c| matches!(c, ':' | '-' | '.' | ','))
        .trim()
        .to_string()
}
