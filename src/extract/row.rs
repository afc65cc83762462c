use scraper::ElementRef;

use super::rules::{self, NAME_NOISE, ROW_BRAND_RULES, ROW_PART_NUMBER_RULES, ROW_PRICE_RULES, Rule};
use super::{absolute_url, collapse_whitespace, element_text, is_part_number, remove_ignoring_case};
use crate::models::{PartInfo, ToolInfo, UNKNOWN_PART_NUMBER};

const MIN_CELLS: usize = 3;
const MIN_NAME_LEN: usize = 6;

/// What one listing row yields before it becomes a part or a tool.
struct RowFields {
    name: Option<String>,
    part_number: Option<String>,
    price: Option<String>,
    brand: Option<String>,
    url: Option<String>,
    image_url: Option<String>,
    info_url: Option<String>,
}

/// Which links of a row point at the listing itself.
struct RowKind {
    link_marker: &'static str,
    brands: &'static [Rule],
}

pub fn extract_part_from_row(row: ElementRef<'_>) -> Option<PartInfo> {
    let kind = RowKind {
        link_marker: "catalog",
        brands: &ROW_BRAND_RULES,
    };
    let fields = scan_row(row, &kind)?;

    let mut part = PartInfo::new(fields.name.unwrap_or_else(|| "Unknown Part".to_string()));
    part.part_number = fields.part_number.unwrap_or_else(|| UNKNOWN_PART_NUMBER.to_string());
    part.price = fields.price;
    part.brand = fields.brand;
    part.url = fields.url;
    part.image_url = fields.image_url;
    part.info_url = fields.info_url;
    Some(part)
}

pub fn extract_tool_from_row(row: ElementRef<'_>) -> Option<ToolInfo> {
    let kind = RowKind {
        link_marker: "/en/tools/",
        brands: &rules::TOOL_BRAND_RULES,
    };
    let fields = scan_row(row, &kind)?;

    Some(ToolInfo {
        name: fields.name.unwrap_or_else(|| "Unknown Tool".to_string()),
        part_number: fields.part_number.unwrap_or_else(|| UNKNOWN_PART_NUMBER.to_string()),
        price: fields.price,
        brand: fields.brand,
        description: None,
        url: fields.url,
        image_url: fields.image_url,
        info_url: fields.info_url,
        video_url: None,
        specifications: None,
    })
}

fn scan_row(row: ElementRef<'_>, kind: &RowKind) -> Option<RowFields> {
    let cells: Vec<String> = row.select(selector!("td, th")).map(element_text).collect();
    if cells.len() < MIN_CELLS {
        return None;
    }

    let price = cells.iter().find_map(|cell| {
        rules::first_match(&ROW_PRICE_RULES, cell, |_| true).map(|m| format!("${}", m.value))
    });
    let part_number = cells
        .iter()
        .filter(|cell| !cell.contains('$'))
        .find_map(|cell| rules::first_match(&ROW_PART_NUMBER_RULES, cell, is_part_number))
        .map(|m| m.value);

    if price.is_none() && part_number.is_none() {
        return None;
    }

    let brand = cells
        .iter()
        .find_map(|cell| rules::first_match(kind.brands, cell, |_| true))
        .map(|m| m.value.to_uppercase());

    let name = cells
        .iter()
        .filter(|cell| !cell.contains('$') && cell.chars().count() >= MIN_NAME_LEN)
        .max_by_key(|cell| cell.chars().count())
        .map(|longest| {
            let cleaned = clean_row_name(longest, brand.as_deref(), part_number.as_deref());
            if cleaned.is_empty() { longest.clone() } else { cleaned }
        });

    let (url, image_url, info_url) = row_urls(row, kind.link_marker);

    Some(RowFields {
        name,
        part_number,
        price,
        brand,
        url,
        image_url,
        info_url,
    })
}

fn clean_row_name(name: &str, brand: Option<&str>, part_number: Option<&str>) -> String {
    let mut cleaned = name.to_string();
    if let Some(brand) = brand {
        cleaned = remove_ignoring_case(&cleaned, brand);
    }
    if let Some(number) = part_number {
        cleaned = cleaned.replace(number, "");
    }
    for noise in NAME_NOISE {
        cleaned = cleaned.replace(noise, "");
    }
    collapse_whitespace(&cleaned)
}

fn row_urls(row: ElementRef<'_>, link_marker: &str) -> (Option<String>, Option<String>, Option<String>) {
    let hrefs: Vec<&str> = row
        .select(selector!("a[href]"))
        .filter_map(|a| a.value().attr("href"))
        .collect();

    let url = hrefs
        .iter()
        .find(|href| href.contains(link_marker) && !href.contains("moreinfo"))
        .and_then(|href| absolute_url(href));

    let image_url = row
        .select(selector!("img[src]"))
        .filter_map(|img| img.value().attr("src"))
        .find(|src| !src.contains("flag_") && !src.contains("loading.gif"))
        .and_then(absolute_url);

    let info_url = hrefs
        .iter()
        .find(|href| regex!(r"(?i)moreinfo\.php|details|info").is_match(href))
        .and_then(|href| absolute_url(href));

    (url, image_url, info_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first_row(html: &Html) -> ElementRef<'_> {
        html.select(selector!("tr")).next().unwrap()
    }

    const PART_ROW: &str = r#"<table><tr>
        <td><img src="/images/flag_us.png"><img src="/info/123/rotor.jpg"></td>
        <td><a href="/en/catalog/honda,2015,civic,1.8l+l4,3444,brake,rotor">BREMBO Front Disc Brake Rotor Info</a></td>
        <td>09A53021</td>
        <td>$48.79</td>
        <td><a href="/en/moreinfo.php?pk=5551">More</a></td>
    </tr></table>"#;

    #[test]
    fn part_row_fields() {
        let html = Html::parse_document(PART_ROW);
        let part = extract_part_from_row(first_row(&html)).unwrap();

        assert_eq!(part.price.as_deref(), Some("$48.79"));
        assert_eq!(part.part_number, "09A53021");
        assert_eq!(part.brand.as_deref(), Some("BREMBO"));
        assert_eq!(part.name, "Front Disc Brake Rotor");
        assert_eq!(
            part.url.as_deref(),
            Some("https://www.rockauto.com/en/catalog/honda,2015,civic,1.8l+l4,3444,brake,rotor")
        );
        assert_eq!(part.image_url.as_deref(), Some("https://www.rockauto.com/info/123/rotor.jpg"));
        assert_eq!(part.info_url.as_deref(), Some("https://www.rockauto.com/en/moreinfo.php?pk=5551"));
    }

    #[test]
    fn rows_with_too_few_cells_are_skipped() {
        let html = Html::parse_document("<table><tr><td>ABC12345</td><td>$9.99</td></tr></table>");
        assert!(extract_part_from_row(first_row(&html)).is_none());
    }

    #[test]
    fn rows_without_price_or_number_are_skipped() {
        let html = Html::parse_document(
            "<table><tr><td>Header</td><td>Description</td><td>Notes</td></tr></table>",
        );
        assert!(extract_part_from_row(first_row(&html)).is_none());
    }

    #[test]
    fn tool_row_uses_tool_brands_and_links() {
        let html = Html::parse_document(
            r#"<table><tr>
                <td><a href="/en/tools/hand+tools,wrenches">GEARWRENCH 12pc Ratcheting Wrench Set</a></td>
                <td>GW9412D</td>
                <td>$89.00</td>
            </tr></table>"#,
        );
        let tool = extract_tool_from_row(first_row(&html)).unwrap();

        assert_eq!(tool.brand.as_deref(), Some("GEARWRENCH"));
        assert_eq!(tool.part_number, "GW9412D");
        assert_eq!(tool.name, "12pc Ratcheting Wrench Set");
        assert_eq!(
            tool.url.as_deref(),
            Some("https://www.rockauto.com/en/tools/hand+tools,wrenches")
        );
    }
}
