//! The tools section: category tree pages and tool listings.

use std::collections::HashSet;

use scraper::Html;

use super::row_cells;
use crate::config::TOOLS_BASE;
use crate::extract::{absolute_url, element_text, extract_tool_from_row};
use crate::models::{ToolCategory, ToolInfo};

const TOOLS_MARKER: &str = "/en/tools/";
const NAV_WORDS: &[&str] = &["toggle", "help", "cart", "search", "rockauto", "bigger"];

pub fn tools_url(path: &str) -> String {
    format!("{TOOLS_BASE}/{}", path.trim_matches('/'))
}

/// Depth of a comma-separated category path; the root is level 1.
pub fn path_level(path: &str) -> usize {
    if path.is_empty() {
        1
    } else {
        path.split(',').count()
    }
}

pub fn category_name(path: &str) -> String {
    path.rsplit(',')
        .next()
        .filter(|last| !last.is_empty())
        .map_or_else(|| "Unknown".to_string(), |last| last.replace('+', " "))
}

/// Child categories of `parent_path`: links exactly one level below it.
pub fn parse_tool_categories(html: &str, parent_path: &str) -> Vec<ToolCategory> {
    let document = Html::parse_document(html);
    let wanted_level = if parent_path.is_empty() {
        1
    } else {
        path_level(parent_path) + 1
    };

    let mut seen = HashSet::new();
    let mut categories = Vec::new();

    for link in document.select(selector!("a[href]")) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(start) = href.find(TOOLS_MARKER) else {
            continue;
        };
        let name = element_text(link);
        let lowered = name.to_lowercase();
        if name.len() <= 2 || NAV_WORDS.iter().any(|w| lowered.contains(w)) {
            continue;
        }

        let path = href[start + TOOLS_MARKER.len()..].trim_matches('/');
        if path.is_empty() || path_level(path) != wanted_level {
            continue;
        }
        if !seen.insert(name.clone()) {
            continue;
        }

        categories.push(ToolCategory {
            group_name: path.replace(' ', "+").replace('&', "%26"),
            href: absolute_url(href).unwrap_or_else(|| href.to_string()),
            level: wanted_level,
            name,
        });
    }

    categories
}

/// Priced rows of a tool listing page.
pub fn parse_tools(html: &str) -> Vec<ToolInfo> {
    let document = Html::parse_document(html);
    document
        .select(selector!("table tr"))
        .filter(|row| {
            let text = element_text(*row);
            text.contains('$') && text.len() > 20 && row_cells(*row).len() >= 3
        })
        .filter_map(extract_tool_from_row)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = r#"
        <a href="/en/tools/">RockAuto Tools</a>
        <a href="/en/tools/hand+tools">Hand Tools</a>
        <a href="/en/tools/hand+tools">Hand Tools</a>
        <a href="/en/tools/lifting+equipment">Lifting Equipment</a>
        <a href="/en/tools/hand+tools,wrenches">Wrenches</a>
        <a href="/en/tools/help">Tool Help</a>
        <a href="/en/catalog/honda">Honda</a>
    "#;

    #[test]
    fn root_lists_top_level_categories() {
        let categories = parse_tool_categories(ROOT, "");
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Hand Tools", "Lifting Equipment"]);
        assert!(categories.iter().all(|c| c.level == 1));
        assert_eq!(categories[0].href, "https://www.rockauto.com/en/tools/hand+tools");
    }

    #[test]
    fn subcategories_are_one_level_down() {
        let html = r#"
            <a href="/en/tools/hand+tools">Hand Tools</a>
            <a href="https://www.rockauto.com/en/tools/hand+tools,wrenches">Wrenches</a>
            <a href="/en/tools/hand+tools,sockets+&+drives">Sockets &amp; Drives</a>
            <a href="/en/tools/hand+tools,wrenches,combination">Combination</a>
        "#;
        let categories = parse_tool_categories(html, "hand+tools");
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].level, 2);
        assert_eq!(categories[1].group_name, "hand+tools,sockets+%26+drives");
    }

    #[test]
    fn tool_rows_use_tool_brands() {
        let html = r#"<table>
            <tr><td>GEARWRENCH</td><td>81230 Ratcheting Wrench Set</td><td>$64.99</td></tr>
            <tr><td>Tools</td><td>Browse</td><td>More</td></tr>
        </table>"#;
        let tools = parse_tools(html);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].brand.as_deref(), Some("GEARWRENCH"));
        assert_eq!(tools[0].price.as_deref(), Some("$64.99"));
    }

    #[test]
    fn path_helpers() {
        assert_eq!(path_level(""), 1);
        assert_eq!(path_level("hand+tools,wrenches"), 2);
        assert_eq!(category_name("hand+tools,torque+wrenches"), "torque wrenches");
        assert_eq!(category_name(""), "Unknown");
        assert_eq!(tools_url("hand+tools"), "https://www.rockauto.com/en/tools/hand+tools");
    }
}
