//! Parsers for whole pages and AJAX fragments.
//!
//! Everything here is synchronous and returns owned data, so no parsed
//! `Html` ever lives across an `.await` in the client.

pub mod account;
pub mod catalog;
pub mod order;
pub mod search;
pub mod tools;

use scraper::{ElementRef, Html};

use crate::extract::{collapse_whitespace, element_text};

/// `value` of the first `<input>` named `name`. An input without a value
/// yields an empty string.
pub fn input_value(document: &Html, name: &str) -> Option<String> {
    document
        .select(selector!("input[name]"))
        .find(|input| input.value().attr("name") == Some(name))
        .map(|input| input.value().attr("value").unwrap_or_default().to_string())
}

/// The short-lived form token carried by every site form.
pub fn form_token(document: &Html) -> Option<String> {
    input_value(document, "_nck")
}

/// [`input_value`] on raw page markup.
pub fn page_input(html: &str, name: &str) -> Option<String> {
    input_value(&Html::parse_document(html), name)
}

/// Each non-blank text node with the text of the element holding it.
pub(crate) fn text_nodes(document: &Html) -> Vec<(String, String)> {
    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = collapse_whitespace(node.value().as_text()?);
            if text.is_empty() {
                return None;
            }
            let parent = node
                .parent()
                .and_then(ElementRef::wrap)
                .map_or_else(|| text.clone(), element_text);
            Some((text, parent))
        })
        .collect()
}

/// Every `td`/`th` directly in `row`.
pub(crate) fn row_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .collect()
}

/// First run of digits in `text`.
pub(crate) fn first_number(text: &str) -> Option<&str> {
    regex!(r"\d+").find(text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_read_from_named_input() {
        let html = Html::parse_document(
            r#"<form><input name="q"><input type="hidden" name="_nck" value="tok-123"></form>"#,
        );
        assert_eq!(form_token(&html).as_deref(), Some("tok-123"));
        assert_eq!(input_value(&html, "q").as_deref(), Some(""));
        assert_eq!(input_value(&html, "missing"), None);
    }

    #[test]
    fn text_nodes_carry_their_parent_text() {
        let html = Html::parse_document("<p>Status: <b>Shipped</b></p>");
        let nodes = text_nodes(&html);
        assert!(nodes.contains(&("Shipped".to_string(), "Shipped".to_string())));
        assert!(nodes.contains(&("Status:".to_string(), "Status: Shipped".to_string())));
    }

    #[test]
    fn cells_are_direct_children_only() {
        let html = Html::parse_document(
            "<table><tr><td>a</td><td><table><tr><td>x</td></tr></table></td><th>b</th></tr></table>",
        );
        let row = html.select(selector!("tr")).next().unwrap();
        assert_eq!(row_cells(row).len(), 3);
    }
}
