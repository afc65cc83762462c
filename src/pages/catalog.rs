//! Vehicle catalog pages and `navnode_fetch` fragments.

use std::collections::{BTreeSet, HashSet};

use scraper::Html;

use super::row_cells;
use crate::config::CATALOG_BASE;
use crate::extract::{
    absolute_url, element_text, extract_part, extract_part_from_row, extract_video_url,
};
use crate::models::{Engine, PartCategory, PartInfo};

pub const MIN_YEAR: i32 = 1950;
pub const MAX_YEAR: i32 = 2030;

/// A make, model or engine as it appears in a catalog path segment.
pub fn path_segment(value: &str) -> String {
    value.trim().to_lowercase().replace(' ', "+")
}

/// `/en/catalog/{make}[,{year}[,{model}]]` for the given depth.
pub fn catalog_url(make: Option<&str>, year: Option<i32>, model: Option<&str>) -> String {
    let mut segments = Vec::new();
    if let Some(make) = make {
        segments.push(path_segment(make));
        if let Some(year) = year {
            segments.push(year.to_string());
            if let Some(model) = model {
                segments.push(path_segment(model));
            }
        }
    }
    format!("{CATALOG_BASE}/{}", segments.join(","))
}

fn hrefs(document: &Html) -> impl Iterator<Item = &str> {
    document
        .select(selector!("a[href]"))
        .filter_map(|a| a.value().attr("href"))
}

pub fn parse_makes(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut makes = BTreeSet::new();

    for href in hrefs(&document) {
        if !href.contains("/catalog/") || href.matches('/').count() < 3 {
            continue;
        }
        let parts: Vec<&str> = href.trim_matches('/').split('/').collect();
        if parts.len() < 3 || parts[1] != "catalog" {
            continue;
        }
        let make = parts[2].split(',').next().unwrap_or_default();
        if make.len() > 1 {
            makes.insert(make.replace('+', " ").to_uppercase());
        }
    }

    makes.into_iter().collect()
}

/// Years linked from a make page, newest first.
pub fn parse_years(html: &str, make: &str) -> Vec<i32> {
    let document = Html::parse_document(html);
    let needle = format!("/{},", path_segment(make));
    let mut years = BTreeSet::new();

    for href in hrefs(&document).filter(|h| h.contains(&needle)) {
        let Some(year) = href.split(',').nth(1) else {
            continue;
        };
        if let Ok(year) = year.trim().parse::<i32>()
            && (MIN_YEAR..=MAX_YEAR).contains(&year)
        {
            years.insert(year);
        }
    }

    years.into_iter().rev().collect()
}

pub fn parse_models(html: &str, make: &str, year: i32) -> Vec<String> {
    let document = Html::parse_document(html);
    let needle = format!("/{},{year},", path_segment(make));
    let mut models = BTreeSet::new();

    for href in hrefs(&document).filter(|h| h.contains(&needle)) {
        if let Some(model) = href.split(',').nth(2)
            && model.len() > 1
        {
            models.insert(model.replace('+', " ").to_uppercase());
        }
    }

    models.into_iter().collect()
}

/// Engine links of a model page. The first link seen for a carcode wins.
pub fn parse_engines(html: &str, make: &str, year: i32, model: &str) -> Vec<Engine> {
    let document = Html::parse_document(html);
    let needle = format!("/{},{year},{},", path_segment(make), path_segment(model));
    let mut seen = HashSet::new();
    let mut engines = Vec::new();

    for href in hrefs(&document).filter(|h| h.contains(&needle)) {
        let parts: Vec<&str> = href.split(',').collect();
        if parts.len() < 5 {
            continue;
        }
        let (description, carcode) = (parts[3], parts[4]);
        if description.is_empty()
            || carcode.is_empty()
            || !carcode.chars().all(|c| c.is_ascii_digit())
        {
            continue;
        }
        if seen.insert(carcode.to_string()) {
            engines.push(Engine {
                description: description.replace('+', " "),
                carcode: carcode.to_string(),
                href: absolute_url(href),
            });
        }
    }

    engines
}

/// Category links of a `navchildren[]` fragment, deduplicated by name.
pub fn parse_categories(fragment: &str) -> Vec<PartCategory> {
    let document = Html::parse_fragment(fragment);
    let mut seen = HashSet::new();
    let mut categories = Vec::new();

    for link in document.select(selector!("a[href]")) {
        let name = element_text(link);
        if name.len() <= 2 || !seen.insert(name.clone()) {
            continue;
        }
        categories.push(PartCategory {
            group_name: name.to_lowercase().replace(' ', "+").replace('&', "%26"),
            href: link.value().attr("href").and_then(absolute_url),
            name,
        });
    }

    categories
}

/// Listings of a `navchildren[]` fragment for one category.
///
/// Elements whose class names a part, product or item are tried first; when
/// none of them yields a listing every link is tried instead.
pub fn parse_category_parts(fragment: &str) -> Vec<PartInfo> {
    let document = Html::parse_fragment(fragment);
    let classed = regex!(r"(?i)part|product|item");

    let mut parts = Vec::new();
    let mut seen = HashSet::new();
    let mut keep = |part: PartInfo, parts: &mut Vec<PartInfo>| {
        if seen.insert(part.name.clone()) {
            parts.push(part);
        }
    };

    for element in document.select(selector!("div, tr, a")) {
        let is_listing = element
            .value()
            .attr("class")
            .is_some_and(|class| classed.is_match(class));
        if is_listing && let Some(part) = extract_part(element) {
            keep(part, &mut parts);
        }
    }

    if parts.is_empty() {
        for link in document.select(selector!("a[href]")) {
            if let Some(part) = extract_part(link) {
                keep(part, &mut parts);
            }
        }
    }

    parts
}

/// Priced rows of a subcategory listing page.
pub fn parse_subcategory_parts(html: &str) -> Vec<PartInfo> {
    let document = Html::parse_document(html);
    document
        .select(selector!("table tr"))
        .filter(|row| {
            let text = element_text(*row);
            text.contains('$') && text.len() > 20 && row_cells(*row).len() >= 3
        })
        .filter_map(extract_part_from_row)
        .collect()
}

/// Video linked from a part's more-info page.
pub fn parse_more_info_video(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let text = element_text(document.root_element());
    extract_video_url(&text, &document)
}

/// Category named by the seventh comma-separated segment of a listing URL.
pub fn subcategory_name(url: &str) -> String {
    url.trim_matches('/')
        .split(',')
        .nth(6)
        .map_or_else(|| "Unknown".to_string(), |name| name.replace('+', " "))
}
