use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::entry::CacheEntry;

/// Keyed entries with lazy TTL expiry and single-oldest eviction.
///
/// Holds at most `capacity` entries. When a new key arrives at capacity the
/// entry with the oldest `last_accessed` is dropped first.
#[derive(Debug, Clone)]
pub struct TtlStore<T> {
    entries: HashMap<String, CacheEntry<T>>,
    ttl: Duration,
    capacity: usize,
}

impl<T: Clone> TtlStore<T> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Expired entries are removed on the way out.
    pub fn get_at(&mut self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let expired = self.entries.get(key)?.is_expired_at(self.ttl, now);
        if expired {
            debug!("Cache entry '{}' expired", key);
            self.entries.remove(key);
            return None;
        }
        self.entries.get_mut(key).map(|e| e.access_at(now).clone())
    }

    pub fn put_at(&mut self, key: impl Into<String>, value: T, now: DateTime<Utc>) {
        let key = key.into();
        if !self.entries.contains_key(&key) {
            self.shrink_to(self.capacity - 1);
        }
        self.entries.insert(key, CacheEntry::new_at(value, now));
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

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_accesses(&self) -> u64 {
        self.entries.values().map(|e| e.access_count).sum()
    }

    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    /// Lowering the capacity evicts down to the new bound immediately.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.shrink_to(self.capacity);
    }

    fn shrink_to(&mut self, bound: usize) {
        while self.entries.len() > bound {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_accessed)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            debug!("Evicting cache entry '{}'", oldest);
            self.entries.remove(&oldest);
        }
    }
}
