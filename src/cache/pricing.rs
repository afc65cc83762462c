use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::entry::CacheEntry;
use crate::models::{PriceInfo, PriceStockSnapshot};

/// Share of entries dropped when a new key arrives at capacity.
const EVICTION_DIVISOR: usize = 5;

/// Short-lived price histories keyed by part number.
#[derive(Debug, Clone)]
pub struct PricingCache {
    entries: HashMap<String, CacheEntry<PriceInfo>>,
    ttl: Duration,
    max_entries: usize,
    max_history_entries: usize,
}

impl PricingCache {
    pub fn new(ttl: Duration, max_entries: usize, max_history_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
            max_history_entries,
        }
    }

    pub fn get_at(&mut self, part_number: &str, now: DateTime<Utc>) -> Option<PriceInfo> {
        let expired = self.entries.get(part_number)?.is_expired_at(self.ttl, now);
        if expired {
            self.entries.remove(part_number);
            return None;
        }
        self.entries
            .get_mut(part_number)
            .map(|e| e.access_at(now).clone())
    }

    pub fn put_at(&mut self, info: PriceInfo, now: DateTime<Utc>) {
        if !self.entries.contains_key(&info.part_number) {
            self.make_room();
        }
        self.entries
            .insert(info.part_number.clone(), CacheEntry::new_at(info, now));
    }

    /// Appends a snapshot to the part's history, creating it if needed.
    ///
    /// Recording refreshes the entry's TTL.
    pub fn record_at(&mut self, part_number: &str, snapshot: PriceStockSnapshot, now: DateTime<Utc>) {
        if self
            .entries
            .get(part_number)
            .is_some_and(|e| e.is_expired_at(self.ttl, now))
        {
            self.entries.remove(part_number);
        }

        if !self.entries.contains_key(part_number) {
            self.make_room();
            let info = PriceInfo::new(part_number, self.max_history_entries);
            self.entries
                .insert(part_number.to_string(), CacheEntry::new_at(info, now));
        }

        if let Some(entry) = self.entries.get_mut(part_number) {
            entry.value_mut().add_snapshot(snapshot);
            entry.cached_at = now;
            entry.last_accessed = now;
        }
    }

    pub fn clear_expired_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, e| !e.is_expired_at(ttl, now));
        before - self.entries.len()
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn total_snapshots(&self) -> usize {
        self.entries
            .values()
            .map(|e| e.value().price_history().len())
            .sum()
    }

    pub fn recent_count_at(&self, now: DateTime<Utc>) -> usize {
        self.entries
            .values()
            .filter(|e| !e.is_expired_at(self.ttl, now))
            .count()
    }

    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    /// Lowering the bound evicts the oldest histories down to it immediately.
    pub fn set_capacity(&mut self, max_entries: usize) {
        self.max_entries = max_entries.max(1);
        let excess = self.entries.len().saturating_sub(self.max_entries);
        self.evict_oldest(excess);
    }

    /// Drops the oldest fifth (at least one) by last collection time when full.
    fn make_room(&mut self) {
        if self.entries.len() < self.max_entries {
            return;
        }
        let evict = (self.entries.len() / EVICTION_DIVISOR).max(1);
        debug!("Pricing cache full, evicting {} entries", evict);
        self.evict_oldest(evict);
    }

    fn evict_oldest(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        let mut by_age: Vec<(DateTime<Utc>, String)> = self
            .entries
            .iter()
            .map(|(k, e)| {
                let collected = e.value().last_collected().unwrap_or(DateTime::<Utc>::MIN_UTC);
                (collected, k.clone())
            })
            .collect();
        by_age.sort();

        for (_, key) in by_age.into_iter().take(count) {
            self.entries.remove(&key);
        }
    }
}
