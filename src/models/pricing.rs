//! Volatile price/stock observations and their per-part history.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{PartInfo, ToolInfo};

/// Default window in which a snapshot counts as current.
pub const DEFAULT_RECENT_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceStockSnapshot {
    pub price: Option<String>,
    pub availability: Option<String>,
    pub stock_level: Option<String>,
    pub shipping_info: Option<String>,
    pub sale_info: Option<String>,
    pub time_collected: DateTime<Utc>,
    pub source_url: Option<String>,
}

impl PriceStockSnapshot {
    /// Snapshot with only a price, collected now.
    pub fn priced(price: impl Into<String>) -> Self {
        Self {
            price: Some(price.into()),
            ..Self::default()
        }
    }

    pub fn is_recent(&self, max_age_minutes: i64) -> bool {
        self.is_recent_at(max_age_minutes, Utc::now())
    }

    pub fn is_recent_at(&self, max_age_minutes: i64, now: DateTime<Utc>) -> bool {
        now - self.time_collected < Duration::minutes(max_age_minutes)
    }

    fn numeric_price(&self) -> Option<f64> {
        parse_price(self.price.as_deref()?)
    }
}

impl Default for PriceStockSnapshot {
    fn default() -> Self {
        Self {
            price: None,
            availability: None,
            stock_level: None,
            shipping_info: None,
            sale_info: None,
            time_collected: Utc::now(),
            source_url: None,
        }
    }
}

impl fmt::Display for PriceStockSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.price.as_deref().unwrap_or("Price not available"))?;
        if let Some(availability) = &self.availability {
            write!(f, " ({availability})")?;
        }
        write!(f, " at {}", self.time_collected.format("%Y-%m-%d %H:%M"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceTrend {
    Increasing,
    Decreasing,
    Stable,
}

/// Bounded price history for one part number.
///
/// `current_snapshot` is always the last snapshot appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceInfo {
    pub part_number: String,
    current_snapshot: Option<PriceStockSnapshot>,
    price_history: Vec<PriceStockSnapshot>,
    max_history_entries: usize,
}

impl PriceInfo {
    pub fn new(part_number: impl Into<String>, max_history_entries: usize) -> Self {
        Self {
            part_number: part_number.into(),
            current_snapshot: None,
            price_history: Vec::new(),
            max_history_entries: max_history_entries.max(1),
        }
    }

    pub fn add_snapshot(&mut self, snapshot: PriceStockSnapshot) {
        self.current_snapshot = Some(snapshot.clone());
        self.price_history.push(snapshot);

        if self.price_history.len() > self.max_history_entries {
            let overflow = self.price_history.len() - self.max_history_entries;
            self.price_history.drain(..overflow);
        }
    }

    pub fn current_snapshot(&self) -> Option<&PriceStockSnapshot> {
        self.current_snapshot.as_ref()
    }

    pub fn price_history(&self) -> &[PriceStockSnapshot] {
        &self.price_history
    }

    pub fn max_history_entries(&self) -> usize {
        self.max_history_entries
    }

    pub fn last_collected(&self) -> Option<DateTime<Utc>> {
        self.current_snapshot.as_ref().map(|s| s.time_collected)
    }

    pub fn has_recent_data(&self, max_age_minutes: i64) -> bool {
        self.current_snapshot
            .as_ref()
            .is_some_and(|s| s.is_recent(max_age_minutes))
    }

    pub fn current_price(&self) -> Option<&str> {
        self.recent_snapshot().and_then(|s| s.price.as_deref())
    }

    pub fn current_availability(&self) -> Option<&str> {
        self.recent_snapshot().and_then(|s| s.availability.as_deref())
    }

    fn recent_snapshot(&self) -> Option<&PriceStockSnapshot> {
        self.current_snapshot
            .as_ref()
            .filter(|s| s.is_recent(DEFAULT_RECENT_MINUTES))
    }

    /// Compares the oldest and newest of the last five priced snapshots
    /// against a 5% band.
    pub fn price_trend(&self) -> Option<PriceTrend> {
        if self.price_history.len() < 2 {
            return None;
        }

        let start = self.price_history.len().saturating_sub(5);
        let prices: Vec<f64> = self.price_history[start..]
            .iter()
            .filter_map(PriceStockSnapshot::numeric_price)
            .collect();

        if prices.len() < 2 {
            return None;
        }

        let first = prices[0];
        let last = prices[prices.len() - 1];

        Some(if last > first * 1.05 {
            PriceTrend::Increasing
        } else if last < first * 0.95 {
            PriceTrend::Decreasing
        } else {
            PriceTrend::Stable
        })
    }

    pub fn lowest_price(&self) -> Option<&str> {
        self.extreme_price(|candidate, best| candidate < best)
    }

    pub fn highest_price(&self) -> Option<&str> {
        self.extreme_price(|candidate, best| candidate > best)
    }

    fn extreme_price(&self, better: impl Fn(f64, f64) -> bool) -> Option<&str> {
        let mut best: Option<(f64, &str)> = None;
        for snapshot in &self.price_history {
            let (Some(value), Some(display)) = (snapshot.numeric_price(), snapshot.price.as_deref())
            else {
                continue;
            };
            if best.is_none_or(|(current, _)| better(value, current)) {
                best = Some((value, display));
            }
        }
        best.map(|(_, display)| display)
    }
}

/// Parses a display price like `"$1,234.50"`.
pub fn parse_price(display: &str) -> Option<f64> {
    display
        .trim()
        .trim_start_matches('$')
        .replace(',', "")
        .parse()
        .ok()
}

/// Static part data joined with whatever pricing is still cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartWithPricing {
    pub part: PartInfo,
    pub pricing: Option<PriceInfo>,
}

impl PartWithPricing {
    pub fn needs_price_update(&self, max_age_minutes: i64) -> bool {
        !self
            .pricing
            .as_ref()
            .is_some_and(|p| p.has_recent_data(max_age_minutes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolWithPricing {
    pub tool: ToolInfo,
    pub pricing: Option<PriceInfo>,
}
