//! Records returned by the signed-in account pages.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pricing::parse_price;
use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateRange {
    OneMonth,
    #[default]
    ThreeMonths,
    SixMonths,
    NineMonths,
    OneYear,
    TwoYears,
    All,
}

impl DateRange {
    pub fn label(self) -> &'static str {
        match self {
            Self::OneMonth => "1 Month",
            Self::ThreeMonths => "3 Months",
            Self::SixMonths => "6 Months",
            Self::NineMonths => "9 Months",
            Self::OneYear => "1 Year",
            Self::TwoYears => "2 Years",
            Self::All => "All",
        }
    }
}

impl FromStr for DateRange {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let all = [
            Self::OneMonth,
            Self::ThreeMonths,
            Self::SixMonths,
            Self::NineMonths,
            Self::OneYear,
            Self::TwoYears,
            Self::All,
        ];
        all.into_iter().find(|r| r.label() == s).ok_or_else(|| {
            let labels: Vec<&str> = all.iter().map(|r| r.label()).collect();
            ClientError::validation(format!("Date range must be one of: {}", labels.join(", ")))
        })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHistoryFilter {
    pub date_range: DateRange,
    pub vehicle: String,
    pub part_category: String,
    pub part_number: Option<String>,
}

impl Default for OrderHistoryFilter {
    fn default() -> Self {
        Self {
            date_range: DateRange::default(),
            vehicle: "All".to_string(),
            part_category: "All".to_string(),
            part_number: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHistoryItem {
    pub order_number: String,
    pub date: String,
    pub status: String,
    pub total: String,
    pub vehicle: Option<String>,
    pub order_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHistoryResult {
    pub orders: Vec<OrderHistoryItem>,
    pub filter_applied: OrderHistoryFilter,
    pub search_time: DateTime<Utc>,
}

impl OrderHistoryResult {
    pub fn count(&self) -> usize {
        self.orders.len()
    }

    pub fn orders_by_status(&self, status: &str) -> Vec<&OrderHistoryItem> {
        let status = status.to_lowercase();
        self.orders
            .iter()
            .filter(|o| o.status.to_lowercase().contains(&status))
            .collect()
    }

    /// Sum of every total that parses as a price.
    pub fn total_amount(&self) -> f64 {
        self.orders.iter().filter_map(|o| parse_price(&o.total)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAddress {
    pub full_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
    pub is_default: bool,
    pub address_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAddressesResult {
    pub addresses: Vec<SavedAddress>,
}

impl SavedAddressesResult {
    pub fn count(&self) -> usize {
        self.addresses.len()
    }

    pub fn has_default(&self) -> bool {
        self.addresses.iter().any(|a| a.is_default)
    }

    pub fn default_address(&self) -> Option<&SavedAddress> {
        self.addresses.iter().find(|a| a.is_default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedVehicle {
    pub year: i32,
    pub make: String,
    pub model: String,
    pub engine: Option<String>,
    pub carcode: Option<String>,
    /// e.g. `2017 FORD F-150`
    pub display_name: String,
    pub catalog_url: Option<String>,
    pub vehicle_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedVehiclesResult {
    pub vehicles: Vec<SavedVehicle>,
}

impl SavedVehiclesResult {
    pub fn count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn find(&self, year: i32, make: &str, model: &str) -> Option<&SavedVehicle> {
        self.vehicles.iter().find(|v| {
            v.year == year && v.make.eq_ignore_ascii_case(make) && v.model.eq_ignore_ascii_case(model)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountActivityResult {
    pub saved_addresses: SavedAddressesResult,
    pub saved_vehicles: SavedVehiclesResult,
    pub has_discount_codes: bool,
    pub has_store_credit: bool,
    pub has_alerts: bool,
    pub last_updated: DateTime<Utc>,
}
