//! Order-status records and the validated lookup requests.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

const MAX_ORDER_NUMBER_DIGITS: usize = 12;
const MAX_CONTACT_LEN: usize = 50;

/// A numeric order number of at most twelve digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(ClientError::validation("Order number must be numeric"));
        }
        if raw.len() > MAX_ORDER_NUMBER_DIGITS {
            return Err(ClientError::validation(format!(
                "Order number cannot exceed {MAX_ORDER_NUMBER_DIGITS} digits"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(value: OrderNumber) -> Self {
        value.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trims and bounds an email address or phone number.
pub fn validate_contact(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClientError::validation("Email or phone cannot be empty"));
    }
    if raw.len() > MAX_CONTACT_LEN {
        return Err(ClientError::validation(format!(
            "Email or phone cannot exceed {MAX_CONTACT_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLookupRequest {
    pub email_or_phone: String,
    pub order_number: OrderNumber,
}

impl OrderLookupRequest {
    pub fn new(email_or_phone: &str, order_number: &str) -> Result<Self> {
        Ok(Self {
            email_or_phone: validate_contact(email_or_phone)?,
            order_number: OrderNumber::parse(order_number)?,
        })
    }
}

/// Same shape as a lookup, used to link an order to the signed-in account.
pub type ExternalOrderRequest = OrderLookupRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderListMethod {
    Email,
    Sms,
}

impl FromStr for OrderListMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            _ => Err(ClientError::validation("Method must be 'email' or 'sms'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderListRequest {
    pub method: OrderListMethod,
    pub contact: String,
}

impl OrderListRequest {
    pub fn new(method: OrderListMethod, contact: &str) -> Result<Self> {
        Ok(Self {
            method,
            contact: validate_contact(contact)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub part_number: String,
    pub description: String,
    pub brand: String,
    pub quantity: u32,
    pub unit_price: String,
    pub total_price: String,
    pub status: String,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub method: String,
    pub cost: String,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<String>,
    pub actual_delivery: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingInfo {
    pub subtotal: String,
    pub shipping_cost: String,
    pub tax: String,
    pub total: String,
    pub payment_method: Option<String>,
    pub payment_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    pub order_number: OrderNumber,
    pub order_date: Option<String>,
    pub status: String,
    pub items: Vec<OrderItem>,
    pub billing: Option<BillingInfo>,
    pub shipping: Option<ShippingInfo>,
}

impl OrderStatus {
    pub fn new(order_number: OrderNumber) -> Self {
        Self {
            order_number,
            order_date: None,
            status: "Unknown".to_string(),
            items: Vec::new(),
            billing: None,
            shipping: None,
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn shipped_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(|i| i.tracking_number.is_some())
    }

    pub fn pending_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(|i| {
            !matches!(
                i.status.to_lowercase().as_str(),
                "shipped" | "delivered" | "in transit"
            )
        })
    }

    pub fn is_fully_shipped(&self) -> bool {
        self.shipped_items().count() == self.items.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderErrorKind {
    OrderNotFound,
    InvalidCredentials,
    SystemError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusError {
    pub kind: OrderErrorKind,
    pub message: String,
    pub order_number: Option<String>,
    pub suggestions: Vec<String>,
}

impl OrderStatusError {
    pub fn order_not_found(order_number: &OrderNumber) -> Self {
        Self {
            kind: OrderErrorKind::OrderNotFound,
            message: format!("Order {order_number} was not found"),
            order_number: Some(order_number.to_string()),
            suggestions: strings(&[
                "Verify the order number is correct",
                "Check that the email/phone matches the order",
                "Ensure the order was placed with RockAuto",
            ]),
        }
    }

    pub fn invalid_credentials(order_number: &OrderNumber) -> Self {
        Self {
            kind: OrderErrorKind::InvalidCredentials,
            message: "Email or phone does not match order records".to_string(),
            order_number: Some(order_number.to_string()),
            suggestions: strings(&[
                "Verify email address spelling",
                "Try phone number if email doesn't work",
                "Check for alternate email addresses used",
            ]),
        }
    }

    pub fn system_error(message: impl Into<String>) -> Self {
        Self {
            kind: OrderErrorKind::SystemError,
            message: message.into(),
            order_number: None,
            suggestions: strings(&[
                "Try again in a few minutes",
                "Clear browser cache and cookies",
                "Contact RockAuto customer service",
            ]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Outcome of an order-status lookup. Lookup failures are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatusResult {
    Found {
        order: OrderStatus,
        lookup_time: DateTime<Utc>,
    },
    Failed {
        error: OrderStatusError,
        lookup_time: DateTime<Utc>,
    },
}

impl OrderStatusResult {
    pub fn found(order: OrderStatus) -> Self {
        Self::Found {
            order,
            lookup_time: Utc::now(),
        }
    }

    pub fn failed(error: OrderStatusError) -> Self {
        Self::Failed {
            error,
            lookup_time: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn order(&self) -> Option<&OrderStatus> {
        match self {
            Self::Found { order, .. } => Some(order),
            Self::Failed { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<OrderErrorKind> {
        match self {
            Self::Found { .. } => None,
            Self::Failed { error, .. } => Some(error.kind),
        }
    }
}

impl fmt::Display for OrderStatusResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { order, .. } => write!(f, "Order {}: {}", order.order_number, order.status),
            Self::Failed { error, .. } => write!(f, "Error: {}", error.message),
        }
    }
}
