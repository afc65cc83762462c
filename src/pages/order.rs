//! Order-status replies.
//!
//! The status page embeds a large localization blob in a script. A loose
//! pattern can pick fields out of that blob instead of the order, which is
//! what [`is_real_order_data`] screens for.

use scraper::Html;

use super::{first_number, row_cells, text_nodes};
use crate::config::OrderDataLimits;
use crate::extract::{element_text, is_part_number};
use crate::extract::rules::{
    self, CARRIERS, ORDER_DATE_RULES, ORDER_NUMBER_RULES, Rule, RuleMatch, SHIPPING_COST_RULES,
    SUBTOTAL_RULES, TOTAL_RULES, TRACKING_RULES,
};
use crate::models::{BillingInfo, OrderItem, OrderNumber, OrderStatus, OrderStatusError, ShippingInfo};

const NO_AMOUNT: &str = "$0.00";
const STATUS_WORDS: &[&str] = &["shipped", "processing", "delivered", "cancelled"];

/// Rule-major search: every text is tried against a rule before the next rule.
fn first_in(rules: &[Rule], texts: &[String], accept: impl Fn(&str) -> bool) -> Option<RuleMatch> {
    rules.iter().find_map(|rule| {
        texts
            .iter()
            .find_map(|text| rules::first_match(std::slice::from_ref(rule), text, &accept))
    })
}

/// Parses an order reply, or `None` when it does not describe `order_number`.
pub fn parse_order_status(
    html: &str,
    order_number: &OrderNumber,
    limits: &OrderDataLimits,
) -> Option<OrderStatus> {
    let document = Html::parse_document(html);
    let nodes = text_nodes(&document);
    let texts: Vec<String> = nodes.iter().map(|(text, _)| text.clone()).collect();

    let has_container = document
        .select(selector!("div[class], table[class], section[class]"))
        .any(|el| {
            el.value()
                .attr("class")
                .is_some_and(|class| regex!(r"(?i)order|status|details").is_match(class))
        });
    if !has_container && !texts.iter().any(|t| t.contains(order_number.as_str())) {
        return None;
    }

    // Keep the number the page shows so a reply about another order is caught
    let echoed = first_in(&ORDER_NUMBER_RULES, &texts, |v| OrderNumber::parse(v).is_ok())
        .and_then(|m| OrderNumber::parse(&m.value).ok());
    let mut order = OrderStatus::new(echoed.unwrap_or_else(|| order_number.clone()));

    if let Some(status) = nodes.iter().find_map(|(text, parent)| {
        let lowered = parent.to_lowercase();
        (regex!(r"(?i)status|shipped|processing|delivered").is_match(text)
            && STATUS_WORDS.iter().any(|w| lowered.contains(w)))
        .then(|| parent.clone())
    }) {
        order.status = status;
    }
    order.order_date = first_in(&ORDER_DATE_RULES, &texts, |_| true).map(|m| m.value.trim().to_string());

    order.items = parse_items(&document);
    order.shipping = parse_shipping(&texts);
    order.billing = parse_billing(&texts, order.shipping.as_ref());

    is_real_order_data(&order, order_number, limits).then_some(order)
}

fn parse_items(document: &Html) -> Vec<OrderItem> {
    let mut items = Vec::new();

    for row in document.select(selector!("table tr")) {
        let cells: Vec<String> = row_cells(row).into_iter().map(element_text).collect();
        if cells.len() < 3 {
            continue;
        }

        let mut part_number = None;
        let mut quantity = 1;
        let mut unit_price = None;
        let mut total_price = None;

        for (i, text) in cells.iter().enumerate() {
            if text.chars().count() <= 2 {
                continue;
            }
            let leading_code = regex!(r"^[A-Z0-9\-]{4,}")
                .find(text)
                .map(|m| m.as_str())
                .filter(|code| is_part_number(code));
            if i == 0 && let Some(code) = leading_code {
                part_number = Some(code.to_string());
            } else if text.to_lowercase().contains("qty") || text.chars().all(|c| c.is_ascii_digit()) {
                if let Some(n) = first_number(text).and_then(|n| n.parse().ok()) {
                    quantity = n;
                }
            } else if text.contains('$') && text.contains('.') {
                if unit_price.is_none() {
                    unit_price = Some(text.clone());
                } else {
                    total_price = Some(text.clone());
                }
            }
        }

        if part_number.is_none() && !cells.iter().any(|c| c.contains('$')) {
            continue;
        }
        items.push(OrderItem {
            part_number: part_number.unwrap_or_else(|| "Unknown".to_string()),
            description: "Unknown".to_string(),
            brand: "Unknown".to_string(),
            quantity,
            unit_price: unit_price.unwrap_or_else(|| NO_AMOUNT.to_string()),
            total_price: total_price.unwrap_or_else(|| NO_AMOUNT.to_string()),
            status: "Unknown".to_string(),
            tracking_number: None,
        });
    }

    items
}

fn parse_shipping(texts: &[String]) -> Option<ShippingInfo> {
    let has_digit = |s: &str| s.chars().any(|c| c.is_ascii_digit());
    let tracking = first_in(&TRACKING_RULES, texts, has_digit);
    let carrier = tracking.as_ref().and_then(|m| {
        if let Some(carrier) = CARRIERS.iter().find(|c| **c == m.rule) {
            return Some((*carrier).to_string());
        }
        let line = texts.iter().find(|t| t.contains(&m.value))?.to_lowercase();
        CARRIERS
            .iter()
            .find(|c| line.contains(&c.to_lowercase()))
            .map(|c| (*c).to_string())
    });
    let cost = first_in(&SHIPPING_COST_RULES, texts, |_| true).map(|m| m.value);

    if tracking.is_none() && cost.is_none() {
        return None;
    }
    Some(ShippingInfo {
        method: "Standard".to_string(),
        cost: cost.unwrap_or_else(|| NO_AMOUNT.to_string()),
        carrier,
        tracking_number: tracking.map(|m| m.value),
        estimated_delivery: None,
        actual_delivery: None,
    })
}

fn parse_billing(texts: &[String], shipping: Option<&ShippingInfo>) -> Option<BillingInfo> {
    let total = first_in(&TOTAL_RULES, texts, |_| true).map(|m| m.value);
    let subtotal = first_in(&SUBTOTAL_RULES, texts, |_| true).map(|m| m.value);
    if total.is_none() && subtotal.is_none() {
        return None;
    }

    Some(BillingInfo {
        subtotal: subtotal.unwrap_or_else(|| NO_AMOUNT.to_string()),
        shipping_cost: shipping.map_or_else(|| NO_AMOUNT.to_string(), |s| s.cost.clone()),
        tax: NO_AMOUNT.to_string(),
        total: total.unwrap_or_else(|| NO_AMOUNT.to_string()),
        payment_method: None,
        payment_status: "Unknown".to_string(),
    })
}

/// Rejects replies whose fields look like leaked page data.
///
/// A real order has items, billing, or a short known status.
pub fn is_real_order_data(
    order: &OrderStatus,
    searched: &OrderNumber,
    limits: &OrderDataLimits,
) -> bool {
    if order.status.len() > limits.max_field_len {
        return false;
    }
    if order
        .order_date
        .as_ref()
        .is_some_and(|d| d.len() > limits.max_field_len)
    {
        return false;
    }
    if &order.order_number != searched {
        return false;
    }
    if let Some(first) = order.items.first()
        && (first.description.len() > limits.max_item_field_len
            || first.brand.len() > limits.max_item_field_len)
    {
        return false;
    }

    let status = order.status.to_lowercase();
    !order.items.is_empty()
        || order.billing.is_some()
        || (order.status.len() < limits.max_short_status_len && !status.is_empty() && status != "unknown")
}

/// Best message a failed lookup page offers.
pub fn parse_order_error(html: &str) -> String {
    let document = Html::parse_document(html);

    let flagged = document
        .select(selector!("div[class], span[class], p[class]"))
        .filter(|el| {
            el.value()
                .attr("class")
                .is_some_and(|class| regex!(r"(?i)error|alert|warning").is_match(class))
        })
        .map(element_text)
        .find(|text| text.len() > 10);
    if let Some(message) = flagged {
        return message;
    }

    text_nodes(&document)
        .into_iter()
        .map(|(text, _)| text)
        .find(|text| regex!(r"(?i)error|not found|invalid|failed").is_match(text))
        .unwrap_or_else(|| "Order lookup failed".to_string())
}

/// Maps a failure message onto a failure kind.
pub fn classify_order_error(message: &str, order_number: &OrderNumber) -> OrderStatusError {
    let lowered = message.to_lowercase();
    if lowered.contains("not found") {
        OrderStatusError::order_not_found(order_number)
    } else if lowered.contains("email") || lowered.contains("phone") {
        OrderStatusError::invalid_credentials(order_number)
    } else {
        OrderStatusError::system_error(message)
    }
}

/// Whether the order-list request page acknowledged sending the list.
pub fn order_list_sent(body: &str) -> bool {
    let lowered = body.to_lowercase();
    ["sent", "delivered", "order list"]
        .iter()
        .any(|w| lowered.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderErrorKind;

    fn number() -> OrderNumber {
        OrderNumber::parse("123456789").unwrap()
    }

    const FOUND: &str = r#"<html><body>
        <div class="orderstatus">
            <h2>Order 123456789</h2>
            <p>Order Date: 03/14/2024</p>
            <p>Status: <b>Shipped</b></p>
            <table class="details">
                <tr><th>Part</th><th>Qty</th><th>Price</th></tr>
                <tr><td>BR9034</td><td>Qty 2</td><td>$24.50</td><td>$49.00</td></tr>
            </table>
            <p>Shipped via UPS 1Z999AA10123456784</p>
            <p>Shipping: $7.99</p>
            <p>Subtotal: $49.00</p>
            <p>Order Total: $56.99</p>
        </div>
    </body></html>"#;

    #[test]
    fn full_order_reply() {
        let order = parse_order_status(FOUND, &number(), &OrderDataLimits::default()).unwrap();

        assert_eq!(order.status, "Status: Shipped");
        assert_eq!(order.order_date.as_deref(), Some("03/14/2024"));
        assert_eq!(order.item_count(), 1);
        assert_eq!(order.items[0].part_number, "BR9034");
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].unit_price, "$24.50");
        assert_eq!(order.items[0].total_price, "$49.00");

        let shipping = order.shipping.unwrap();
        assert_eq!(shipping.carrier.as_deref(), Some("UPS"));
        assert_eq!(shipping.tracking_number.as_deref(), Some("1Z999AA10123456784"));
        assert_eq!(shipping.cost, "$7.99");

        let billing = order.billing.unwrap();
        assert_eq!(billing.total, "$56.99");
        assert_eq!(billing.subtotal, "$49.00");
        assert_eq!(billing.shipping_cost, "$7.99");
    }

    #[test]
    fn reply_about_another_order_is_rejected() {
        let other = FOUND.replace("Order 123456789", "Order #555000111");
        assert!(parse_order_status(&other, &number(), &OrderDataLimits::default()).is_none());

        let unnumbered = FOUND.replace("Order 123456789", "Your order");
        let order = parse_order_status(&unnumbered, &number(), &OrderDataLimits::default()).unwrap();
        assert_eq!(order.order_number, number());
    }

    #[test]
    fn unrelated_page_is_not_an_order() {
        let html = "<html><body><p>Enter your order number</p></body></html>";
        assert!(parse_order_status(html, &number(), &OrderDataLimits::default()).is_none());
    }

    #[test]
    fn oversized_status_is_rejected() {
        let mut order = OrderStatus::new(number());
        order.status = "shipped ".repeat(200);
        assert!(!is_real_order_data(&order, &number(), &OrderDataLimits::default()));

        let lenient = OrderDataLimits {
            max_field_len: 5000,
            max_short_status_len: 5000,
            ..OrderDataLimits::default()
        };
        assert!(is_real_order_data(&order, &number(), &lenient));
    }

    #[test]
    fn mismatched_order_number_is_rejected() {
        let mut order = OrderStatus::new(OrderNumber::parse("987").unwrap());
        order.status = "Shipped".to_string();
        assert!(!is_real_order_data(&order, &number(), &OrderDataLimits::default()));
    }

    #[test]
    fn unknown_status_without_items_is_rejected() {
        let order = OrderStatus::new(number());
        assert!(!is_real_order_data(&order, &number(), &OrderDataLimits::default()));
    }

    #[test]
    fn error_messages_classify() {
        let html = r#"<div class="alert-box">Order 123456789 was not found in our records</div>"#;
        let message = parse_order_error(html);
        assert_eq!(
            classify_order_error(&message, &number()).kind,
            OrderErrorKind::OrderNotFound
        );

        let html = "<p>The email address does not match.</p>";
        assert_eq!(
            classify_order_error(&parse_order_error(html), &number()).kind,
            OrderErrorKind::SystemError
        );
        assert_eq!(
            classify_order_error("Email or phone mismatch", &number()).kind,
            OrderErrorKind::InvalidCredentials
        );
        assert_eq!(parse_order_error("<p>Hello</p>"), "Order lookup failed");
    }
}
