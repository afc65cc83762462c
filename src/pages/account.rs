//! Signed-in account pages: profile, account activity, order history.

use std::collections::HashSet;

use scraper::{ElementRef, Html};

use super::{first_number, row_cells};
use crate::extract::{absolute_url, collapse_whitespace, element_text};
use crate::models::{OrderHistoryItem, SavedAddress, SavedVehicle};

/// Tables that belong to the section labelled `label`.
///
/// An element carrying the label as `aria-label` scopes the search to its
/// parent. Otherwise a page that mentions the label anywhere is searched
/// whole, and a page that never mentions it has no such section.
fn section_tables<'a>(document: &'a Html, label: &str) -> Vec<ElementRef<'a>> {
    let labelled = document
        .select(selector!("[aria-label]"))
        .find(|el| el.value().attr("aria-label") == Some(label));

    if let Some(section) = labelled {
        let scope = section
            .parent()
            .and_then(ElementRef::wrap)
            .unwrap_or(section);
        return scope.select(selector!("table")).collect();
    }

    let mentioned = element_text(document.root_element())
        .to_lowercase()
        .contains(&label.to_lowercase());
    if mentioned {
        document.select(selector!("table")).collect()
    } else {
        Vec::new()
    }
}

/// Digits of the `onclick` of the first button whose text contains `action`.
fn button_id(cell: ElementRef<'_>, action: &str) -> Option<String> {
    cell.select(selector!("button"))
        .filter(|button| element_text(*button).to_lowercase().contains(action))
        .find_map(|button| first_number(button.value().attr("onclick")?).map(str::to_string))
}

fn cell_lines(cell: ElementRef<'_>) -> Vec<String> {
    cell.text()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

/// `City, ST 12345` into its three parts.
fn split_city_line(line: &str) -> (String, String, String) {
    let Some((city, rest)) = line.split_once(',') else {
        return (line.trim().to_string(), String::new(), String::new());
    };
    let mut words = rest.split_whitespace();
    let state = words.next().unwrap_or_default().to_string();
    let postal_code = words.collect::<Vec<_>>().join(" ");
    (city.trim().to_string(), state, postal_code)
}

pub fn parse_saved_addresses(html: &str) -> Vec<SavedAddress> {
    let document = Html::parse_document(html);
    let mut addresses = Vec::new();

    for table in section_tables(&document, "Saved Addresses") {
        for row in table.select(selector!("tr")) {
            let cells = row_cells(row);
            if cells.len() < 2 {
                continue;
            }
            let lines = cell_lines(cells[0]);
            if lines.len() < 3 || lines.iter().any(|l| l.to_lowercase().contains("edit")) {
                continue;
            }

            // name, street, [street 2...], city line; anything after is a phone
            let city_index = lines
                .iter()
                .skip(2)
                .position(|l| l.contains(','))
                .map_or(2, |i| i + 2);
            let (city, state, postal_code) = split_city_line(&lines[city_index]);
            let address_line2 = (city_index > 2).then(|| lines[2..city_index].join(", "));
            let phone = lines
                .get(city_index + 1)
                .filter(|l| l.chars().filter(char::is_ascii_digit).count() >= 7)
                .cloned();

            addresses.push(SavedAddress {
                full_name: lines[0].clone(),
                address_line1: lines[1].clone(),
                address_line2,
                city,
                state,
                postal_code,
                country: "US".to_string(),
                phone,
                is_default: element_text(row).to_lowercase().contains("default"),
                address_id: cells.last().and_then(|actions| button_id(*actions, "edit")),
            });
        }
    }

    addresses
}

pub fn parse_saved_vehicles(html: &str) -> Vec<SavedVehicle> {
    let document = Html::parse_document(html);
    let mut vehicles = Vec::new();

    for table in section_tables(&document, "Saved Vehicles") {
        for row in table.select(selector!("tr")) {
            let cells = row_cells(row);
            if cells.len() < 2 {
                continue;
            }
            let Some(link) = cells[0].select(selector!("a")).next() else {
                continue;
            };

            let display_name = element_text(link);
            let words: Vec<&str> = display_name.split_whitespace().collect();
            if words.len() < 3 {
                continue;
            }

            let href = link.value().attr("href").unwrap_or_default();
            let segments: Vec<&str> = href.split(',').collect();
            let (engine, carcode) = if segments.len() >= 5 {
                (
                    Some(segments[3].replace('+', " ")),
                    segments.last().map(|s| (*s).to_string()),
                )
            } else {
                (None, None)
            };

            vehicles.push(SavedVehicle {
                year: words[0].parse().unwrap_or(0),
                make: words[1].to_string(),
                model: words[2..].join(" "),
                engine,
                carcode,
                catalog_url: absolute_url(href),
                vehicle_id: cells.last().and_then(|actions| button_id(*actions, "delete")),
                display_name,
            });
        }
    }

    vehicles
}

/// Which optional features the account-activity page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActivityFlags {
    pub has_discount_codes: bool,
    pub has_store_credit: bool,
    pub has_alerts: bool,
}

pub fn parse_activity_flags(html: &str) -> ActivityFlags {
    let document = Html::parse_document(html);
    let text = element_text(document.root_element()).to_lowercase();
    ActivityFlags {
        has_discount_codes: text.contains("discount code"),
        has_store_credit: text.contains("store credit"),
        has_alerts: text.contains("availability alerts"),
    }
}

/// Orders listed on the order-history page.
///
/// Table rows are read first (the first row of each table is its header);
/// pages without such rows are scanned for order blocks instead.
pub fn parse_order_history(html: &str) -> Vec<OrderHistoryItem> {
    let document = Html::parse_document(html);
    let mut orders = Vec::new();

    for table in document.select(selector!("table")) {
        for row in table.select(selector!("tr")).skip(1) {
            let cells: Vec<String> = row_cells(row).into_iter().map(element_text).collect();
            if cells.len() < 3 || cells[0].is_empty() || cells[1].is_empty() {
                continue;
            }
            let order_url = row
                .select(selector!("a[href]"))
                .next()
                .and_then(|a| absolute_url(a.value().attr("href")?));

            orders.push(OrderHistoryItem {
                order_number: cells[0].clone(),
                date: cells[1].clone(),
                status: non_empty_or(&cells[2], "Unknown"),
                total: cells.get(3).map_or_else(|| "$0.00".to_string(), |t| non_empty_or(t, "$0.00")),
                vehicle: cells.get(4).filter(|v| !v.is_empty()).cloned(),
                order_url,
            });
        }
    }

    if orders.is_empty() {
        let mut seen = HashSet::new();
        for block in document.select(selector!("div[class], section[class]")) {
            let is_order_block = block
                .value()
                .attr("class")
                .is_some_and(|class| class.to_lowercase().contains("order"));
            if !is_order_block {
                continue;
            }
            let text = element_text(block);
            let Some(number) = regex!(r"(?i)order\s*#?\s*(\d+)")
                .captures(&text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
            else {
                continue;
            };
            if !seen.insert(number.clone()) {
                continue;
            }
            let date = regex!(r"(\d{1,2}/\d{1,2}/\d{4})")
                .find(&text)
                .map_or_else(|| "Unknown".to_string(), |m| m.as_str().to_string());

            orders.push(OrderHistoryItem {
                order_number: number,
                date,
                status: "Unknown".to_string(),
                total: "$0.00".to_string(),
                vehicle: None,
                order_url: None,
            });
        }
    }

    orders
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Whether the site confirmed linking an external order.
pub fn external_order_added(body: &str) -> bool {
    let lowered = body.to_lowercase();
    let success = ["added", "success", "order added"]
        .iter()
        .any(|w| lowered.contains(w));
    let failure = ["error", "failed", "not found", "invalid"]
        .iter()
        .any(|w| lowered.contains(w));
    success && !failure
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"<html><body>
        <div>
            <h3 aria-label="Saved Addresses">Saved Addresses</h3>
            <table>
                <tr>
                    <td>Jamie Driver<br>12 Elm St<br>Apt 4<br>Springfield, IL 62701<br>(217) 555-0100</td>
                    <td>Default</td>
                    <td><button onclick="editAddress(3311)">Edit</button></td>
                </tr>
                <tr><td>incomplete</td><td><button>Edit</button></td></tr>
            </table>
        </div>
        <div>
            <h3 aria-label="Saved Vehicles">Saved Vehicles</h3>
            <table>
                <tr>
                    <td><a href="/en/catalog/ford,2017,f-150,3.5l+v6+turbocharged,3364289">2017 FORD F-150</a></td>
                    <td><button onclick="deleteVehicle(88)">Delete</button></td>
                </tr>
                <tr><td>No link here</td><td></td></tr>
            </table>
        </div>
    </body></html>"#;

    #[test]
    fn addresses_from_labelled_section() {
        let addresses = parse_saved_addresses(PROFILE);
        assert_eq!(addresses.len(), 1);

        let home = &addresses[0];
        assert_eq!(home.full_name, "Jamie Driver");
        assert_eq!(home.address_line1, "12 Elm St");
        assert_eq!(home.address_line2.as_deref(), Some("Apt 4"));
        assert_eq!(home.city, "Springfield");
        assert_eq!(home.state, "IL");
        assert_eq!(home.postal_code, "62701");
        assert_eq!(home.phone.as_deref(), Some("(217) 555-0100"));
        assert!(home.is_default);
        assert_eq!(home.address_id.as_deref(), Some("3311"));
    }

    #[test]
    fn vehicles_from_labelled_section() {
        let vehicles = parse_saved_vehicles(PROFILE);
        assert_eq!(vehicles.len(), 1);

        let truck = &vehicles[0];
        assert_eq!(truck.year, 2017);
        assert_eq!(truck.make, "FORD");
        assert_eq!(truck.model, "F-150");
        assert_eq!(truck.carcode.as_deref(), Some("3364289"));
        assert_eq!(truck.engine.as_deref(), Some("3.5l v6 turbocharged"));
        assert_eq!(truck.vehicle_id.as_deref(), Some("88"));
        assert!(truck.catalog_url.as_deref().unwrap().starts_with("https://www.rockauto.com/en/catalog/ford"));
    }

    #[test]
    fn page_without_section_has_nothing() {
        assert!(parse_saved_addresses("<p>Welcome back</p>").is_empty());
    }

    #[test]
    fn activity_flags_from_page_text() {
        let flags = parse_activity_flags("<h2>Store Credit</h2><p>Availability Alerts: none</p>");
        assert_eq!(
            flags,
            ActivityFlags {
                has_discount_codes: false,
                has_store_credit: true,
                has_alerts: true,
            }
        );
    }

    #[test]
    fn history_table_skips_header() {
        let html = r#"<table>
            <tr><th>Order</th><th>Date</th><th>Status</th><th>Total</th></tr>
            <tr><td><a href="/orderstatus/?ordernum=1001">1001</a></td><td>01/05/2024</td><td>Shipped</td><td>$45.10</td></tr>
            <tr><td>1002</td><td>02/11/2024</td><td></td></tr>
        </table>"#;
        let orders = parse_order_history(html);
        assert_eq!(orders.len(), 2);
        assert_eq!(
            orders[0].order_url.as_deref(),
            Some("https://www.rockauto.com/orderstatus/?ordernum=1001")
        );
        assert_eq!(orders[1].status, "Unknown");
        assert_eq!(orders[1].total, "$0.00");
    }

    #[test]
    fn history_falls_back_to_order_blocks() {
        let html = r#"
            <div class="order-card"><span>Order #5550123</span> placed 3/9/2024</div>
            <div class="order-card"><div class="order-inner">Order #5550123</div></div>
        "#;
        let orders = parse_order_history(html);
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].order_number, "5550123");
        assert_eq!(orders[0].date, "3/9/2024");
    }

    #[test]
    fn external_order_confirmation() {
        assert!(external_order_added("<p>Order added to your history</p>"));
        assert!(!external_order_added("<p>Order added? error: not found</p>"));
    }
}
