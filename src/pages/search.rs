//! The parts-search page: dropdowns, result tables, "what is it called".

use scraper::Html;

use super::row_cells;
use crate::extract::{element_text, extract_part_from_row};
use crate::models::{PartInfo, PartSearchOption, SearchDropdown, WhatIsPartCalledResult};

/// Options of one dropdown, or `None` when the page has no such `<select>`.
/// Options without text are skipped.
pub fn parse_dropdown(html: &str, dropdown: SearchDropdown) -> Option<Vec<PartSearchOption>> {
    let document = Html::parse_document(html);
    let select = document
        .select(selector!("select[id]"))
        .find(|s| s.value().attr("id") == Some(dropdown.select_id()))?;

    Some(
        select
            .select(selector!("option"))
            .filter_map(|option| {
                let text = element_text(option);
                (!text.is_empty()).then(|| PartSearchOption {
                    value: option.value().attr("value").unwrap_or_default().to_string(),
                    text,
                })
            })
            .collect(),
    )
}

pub fn parse_search_results(html: &str) -> Vec<PartInfo> {
    let document = Html::parse_document(html);
    document
        .select(selector!("table tr"))
        .filter_map(extract_part_from_row)
        .collect()
}

/// Main/sub category pairs from the result table. Header rows have no `td`.
pub fn parse_what_is_called(html: &str) -> Vec<WhatIsPartCalledResult> {
    let document = Html::parse_document(html);
    let mut results = Vec::new();

    for row in document.select(selector!("table tr")) {
        let cells = row_cells(row);
        if cells.len() < 2 || !cells.iter().any(|c| c.value().name() == "td") {
            continue;
        }
        let main_category = element_text(cells[0]);
        let subcategory = element_text(cells[1]);
        if main_category.is_empty() || subcategory.is_empty() || main_category.contains('/') {
            continue;
        }
        results.push(WhatIsPartCalledResult {
            full_path: format!("{main_category}/{subcategory}"),
            main_category,
            subcategory,
        });
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"<form>
        <input type="hidden" name="_nck" value="abc">
        <select id="manufacturer_partsearch_007">
            <option value="">- Any -</option>
            <option value="">   </option>
            <option value="1234">BOSCH</option>
            <option value="77">Wagner</option>
        </select>
        <select id="partgroup_partsearch_007"><option value="9">Brake &amp; Wheel Hub</option></select>
    </form>"#;

    #[test]
    fn dropdown_options_by_select_id() {
        let options = parse_dropdown(SEARCH_PAGE, SearchDropdown::Manufacturer).unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options[1].value, "1234");
        assert_eq!(options[2].text, "Wagner");

        let groups = parse_dropdown(SEARCH_PAGE, SearchDropdown::PartGroup).unwrap();
        assert_eq!(groups[0].text, "Brake & Wheel Hub");
    }

    #[test]
    fn missing_dropdown_is_none() {
        assert!(parse_dropdown(SEARCH_PAGE, SearchDropdown::PartType).is_none());
    }

    #[test]
    fn result_rows_become_parts() {
        let html = r#"<table>
            <tr><th>Manufacturer</th><th>Part Number</th><th>Price</th></tr>
            <tr><td>BOSCH</td><td>3330 Premium Oil Filter</td><td>$7.89</td></tr>
        </table>"#;
        let parts = parse_search_results(html);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].brand.as_deref(), Some("BOSCH"));
    }

    #[test]
    fn what_is_called_pairs() {
        let html = r#"<table>
            <tr><th>Main Category</th><th>Subcategory</th></tr>
            <tr><td>Brake &amp; Wheel Hub</td><td>Brake Pad</td></tr>
            <tr><td>Engine/Timing</td><td>Belt</td></tr>
            <tr><td>Cooling System</td><td></td></tr>
        </table>"#;
        let results = parse_what_is_called(html);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].full_path, "Brake & Wheel Hub/Brake Pad");
    }
}
