//! In-memory caching split by volatility.
//!
//! Static part/tool data lives for hours or days, prices for minutes, and
//! whole vehicle+category results sit in between. The tiers are independent:
//! a part can outlive its pricing and vice versa.

mod entry;
mod pricing;
mod store;

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use entry::CacheEntry;
pub use pricing::PricingCache;
pub use store::TtlStore;

use crate::config::{CacheConfig, MAX_TTL_HOURS};
use crate::models::{
    PartInfo, PartWithPricing, PriceInfo, PriceStockSnapshot, SearchDropdown, SearchOptions,
    ToolInfo, ToolWithPricing, UNKNOWN_PART_NUMBER, VehiclePartsResult,
};

/// Entry counts removed by a clear operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearedCounts {
    pub parts: usize,
    pub tools: usize,
    pub pricing: usize,
    pub results: usize,
    pub dropdowns: usize,
}

impl ClearedCounts {
    pub fn total(&self) -> usize {
        self.parts + self.tools + self.pricing + self.results + self.dropdowns
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub cached_parts: usize,
    pub cached_tools: usize,
    pub cached_results: usize,
    pub cached_dropdowns: usize,
    pub pricing_entries: usize,
    pub recent_pricing_entries: usize,
    pub price_snapshots: usize,
    pub total_part_accesses: u64,
    pub total_result_accesses: u64,
    /// Percentages of the configured capacities.
    pub parts_capacity_used: f64,
    pub results_capacity_used: f64,
    pub pricing_capacity_used: f64,
    pub settings: CacheConfig,
}

/// Builds the result-cache key: `make|model|year[|carcode][|category]`, lower-cased.
pub fn generate_key(
    make: &str,
    model: &str,
    year: i32,
    carcode: Option<&str>,
    category: Option<&str>,
) -> String {
    let year = year.to_string();
    [Some(make), Some(model), Some(year.as_str()), carcode, category]
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("|")
}

// Out-of-range settings are clamped; `CacheConfig::validate` is what reports them.
fn hours(value: i64) -> Duration {
    Duration::try_hours(value.clamp(1, MAX_TTL_HOURS)).unwrap_or_else(|| Duration::hours(1))
}

fn minutes(value: i64) -> Duration {
    Duration::try_minutes(value.clamp(1, MAX_TTL_HOURS * 60)).unwrap_or_else(|| Duration::minutes(1))
}

fn snapshot_of(price: Option<&str>, source_url: Option<&str>) -> Option<PriceStockSnapshot> {
    Some(PriceStockSnapshot {
        price: Some(price?.to_string()),
        source_url: source_url.map(str::to_string),
        ..PriceStockSnapshot::default()
    })
}

#[derive(Debug, Clone)]
pub struct CatalogCache {
    parts: TtlStore<PartInfo>,
    tools: TtlStore<ToolInfo>,
    pricing: PricingCache,
    results: TtlStore<VehiclePartsResult>,
    dropdowns: HashMap<SearchDropdown, SearchOptions>,
    settings: CacheConfig,
}

impl CatalogCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            parts: TtlStore::new(hours(config.part_ttl_hours), config.max_parts),
            tools: TtlStore::new(hours(config.part_ttl_hours), config.max_parts),
            pricing: PricingCache::new(
                minutes(config.pricing_ttl_minutes),
                config.max_pricing_entries,
                config.max_history_entries,
            ),
            results: TtlStore::new(hours(config.result_ttl_hours), config.max_results),
            dropdowns: HashMap::new(),
            settings: config.clone(),
        }
    }

    /// Applies new TTLs and capacities. Live entries survive unless a lowered
    /// capacity evicts them, or the cache is being switched off, which drops
    /// everything.
    pub fn reconfigure(&mut self, config: &CacheConfig) {
        self.parts.set_ttl(hours(config.part_ttl_hours));
        self.parts.set_capacity(config.max_parts);
        self.tools.set_ttl(hours(config.part_ttl_hours));
        self.tools.set_capacity(config.max_parts);
        self.pricing.set_ttl(minutes(config.pricing_ttl_minutes));
        self.pricing.set_capacity(config.max_pricing_entries);
        self.results.set_ttl(hours(config.result_ttl_hours));
        self.results.set_capacity(config.max_results);

        let switched_off = self.settings.enabled && !config.enabled;
        self.settings = config.clone();
        if switched_off {
            let cleared = self.clear_all();
            debug!("Cache disabled, dropped {} entries", cleared.total());
        }
    }

    pub fn settings(&self) -> &CacheConfig {
        &self.settings
    }

    pub fn part(&mut self, part_number: &str) -> Option<PartInfo> {
        self.parts.get_at(part_number, Utc::now())
    }

    pub fn put_part(&mut self, part: PartInfo) {
        self.put_part_at(part, Utc::now());
    }

    pub fn put_part_at(&mut self, part: PartInfo, now: DateTime<Utc>) {
        self.parts.put_at(part.part_number.clone(), part, now);
    }

    /// Caches every listing that has a part number, and records the price of
    /// the priced ones in the pricing tier. Returns how many were cached.
    pub fn store_parts(&mut self, parts: &[PartInfo], source_url: Option<&str>) -> usize {
        let mut stored = 0;
        for part in parts.iter().filter(|p| p.has_part_number()) {
            if let Some(snapshot) = snapshot_of(part.price.as_deref(), source_url) {
                self.record_pricing(&part.part_number, snapshot);
            }
            self.put_part(part.clone());
            stored += 1;
        }
        stored
    }

    pub fn tool(&mut self, part_number: &str) -> Option<ToolInfo> {
        self.tools.get_at(part_number, Utc::now())
    }

    pub fn put_tool(&mut self, tool: ToolInfo) {
        self.tools.put_at(tool.part_number.clone(), tool, Utc::now());
    }

    pub fn store_tools(&mut self, tools: &[ToolInfo], source_url: Option<&str>) -> usize {
        let mut stored = 0;
        for tool in tools.iter().filter(|t| t.part_number != UNKNOWN_PART_NUMBER) {
            if let Some(snapshot) = snapshot_of(tool.price.as_deref(), source_url) {
                self.record_pricing(&tool.part_number, snapshot);
            }
            self.put_tool(tool.clone());
            stored += 1;
        }
        stored
    }

    pub fn pricing(&mut self, part_number: &str) -> Option<PriceInfo> {
        self.pricing.get_at(part_number, Utc::now())
    }

    pub fn put_pricing(&mut self, info: PriceInfo) {
        self.pricing.put_at(info, Utc::now());
    }

    pub fn record_pricing(&mut self, part_number: &str, snapshot: PriceStockSnapshot) {
        self.record_pricing_at(part_number, snapshot, Utc::now());
    }

    pub fn record_pricing_at(
        &mut self,
        part_number: &str,
        snapshot: PriceStockSnapshot,
        now: DateTime<Utc>,
    ) {
        self.pricing.record_at(part_number, snapshot, now);
    }

    /// Static data is required; pricing is attached only while still cached.
    pub fn part_with_pricing(&mut self, part_number: &str) -> Option<PartWithPricing> {
        self.part_with_pricing_at(part_number, Utc::now())
    }

    pub fn part_with_pricing_at(
        &mut self,
        part_number: &str,
        now: DateTime<Utc>,
    ) -> Option<PartWithPricing> {
        let part = self.parts.get_at(part_number, now)?;
        let pricing = self.pricing.get_at(part_number, now);
        Some(PartWithPricing { part, pricing })
    }

    pub fn tool_with_pricing(&mut self, part_number: &str) -> Option<ToolWithPricing> {
        let now = Utc::now();
        let tool = self.tools.get_at(part_number, now)?;
        let pricing = self.pricing.get_at(part_number, now);
        Some(ToolWithPricing { tool, pricing })
    }

    pub fn result(&mut self, key: &str) -> Option<VehiclePartsResult> {
        self.result_at(key, Utc::now())
    }

    pub fn result_at(&mut self, key: &str, now: DateTime<Utc>) -> Option<VehiclePartsResult> {
        self.results.get_at(key, now)
    }

    pub fn put_result(&mut self, key: &str, result: VehiclePartsResult) {
        self.put_result_at(key, result, Utc::now());
    }

    pub fn put_result_at(&mut self, key: &str, result: VehiclePartsResult, now: DateTime<Utc>) {
        self.results.put_at(key, result, now);
    }

    /// Options of one dropdown while younger than the dropdown TTL.
    pub fn dropdown(&mut self, which: SearchDropdown) -> Option<SearchOptions> {
        self.dropdown_at(which, Utc::now())
    }

    pub fn dropdown_at(&mut self, which: SearchDropdown, now: DateTime<Utc>) -> Option<SearchOptions> {
        let ttl = hours(self.settings.dropdown_ttl_hours);
        let fresh = now - self.dropdowns.get(&which)?.last_updated < ttl;
        if !fresh {
            self.dropdowns.remove(&which);
            return None;
        }
        self.dropdowns.get(&which).cloned()
    }

    pub fn put_dropdown(&mut self, options: SearchOptions) {
        self.dropdowns.insert(options.dropdown, options);
    }

    pub fn clear_dropdowns(&mut self) -> usize {
        let removed = self.dropdowns.len();
        self.dropdowns.clear();
        removed
    }

    pub fn clear_expired(&mut self) -> ClearedCounts {
        self.clear_expired_at(Utc::now())
    }

    pub fn clear_expired_at(&mut self, now: DateTime<Utc>) -> ClearedCounts {
        let ttl = hours(self.settings.dropdown_ttl_hours);
        let before = self.dropdowns.len();
        self.dropdowns.retain(|_, options| now - options.last_updated < ttl);

        ClearedCounts {
            parts: self.parts.clear_expired_at(now),
            tools: self.tools.clear_expired_at(now),
            pricing: self.pricing.clear_expired_at(now),
            results: self.results.clear_expired_at(now),
            dropdowns: before - self.dropdowns.len(),
        }
    }

    pub fn clear_all(&mut self) -> ClearedCounts {
        ClearedCounts {
            parts: self.parts.clear(),
            tools: self.tools.clear(),
            pricing: self.pricing.clear(),
            results: self.results.clear(),
            dropdowns: self.clear_dropdowns(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            cached_parts: self.parts.len(),
            cached_tools: self.tools.len(),
            cached_results: self.results.len(),
            cached_dropdowns: self.dropdowns.len(),
            pricing_entries: self.pricing.len(),
            recent_pricing_entries: self.pricing.recent_count_at(Utc::now()),
            price_snapshots: self.pricing.total_snapshots(),
            total_part_accesses: self.parts.total_accesses(),
            total_result_accesses: self.results.total_accesses(),
            parts_capacity_used: percent(self.parts.len(), self.parts.capacity()),
            results_capacity_used: percent(self.results.len(), self.results.capacity()),
            pricing_capacity_used: percent(self.pricing.len(), self.pricing.max_entries()),
            settings: self.settings.clone(),
        }
    }
}

fn percent(used: usize, capacity: usize) -> f64 {
    let raw = used as f64 / capacity.max(1) as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}
