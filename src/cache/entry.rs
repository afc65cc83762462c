use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A cached value plus the bookkeeping used for expiry and eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    value: T,
    pub cached_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
}

impl<T> CacheEntry<T> {
    pub fn new_at(value: T, now: DateTime<Utc>) -> Self {
        Self {
            value,
            cached_at: now,
            last_accessed: now,
            access_count: 1,
        }
    }

    /// Reads the value and records the access.
    pub fn access_at(&mut self, now: DateTime<Utc>) -> &T {
        self.access_count += 1;
        self.last_accessed = now;
        &self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Strictly older than `ttl`: an entry exactly `ttl` old is still live.
    pub fn is_expired_at(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.cached_at > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_boundary_is_exclusive() {
        let t0 = Utc::now();
        let entry = CacheEntry::new_at("x", t0);
        let ttl = Duration::hours(12);

        assert!(!entry.is_expired_at(ttl, t0 + ttl));
        assert!(entry.is_expired_at(ttl, t0 + ttl + Duration::seconds(1)));
    }

    #[test]
    fn access_updates_bookkeeping() {
        let t0 = Utc::now();
        let mut entry = CacheEntry::new_at(7, t0);
        let later = t0 + Duration::minutes(5);

        assert_eq!(*entry.access_at(later), 7);
        assert_eq!(entry.access_count, 2);
        assert_eq!(entry.last_accessed, later);
        assert_eq!(entry.cached_at, t0);
    }
}
