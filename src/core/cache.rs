use crate::core::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// A cached scalar and the instant it was stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedValue {
    pub value: f64,
    pub stored_at: DateTime<Utc>,
}

/// Backing storage for `TtlCache`. Swap the in-memory map for a shared
/// store when several processes need to see the same values.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedValue>;
    fn put(&self, key: &str, value: CachedValue);
}

#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, CachedValue>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<CachedValue> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).get(key).copied()
    }

    fn put(&self, key: &str, value: CachedValue) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }
}

/// Scalar cache keyed by indicator slug with an explicit time-to-live.
pub struct TtlCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    pub fn in_memory(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), clock, ttl)
    }

    /// The cached value if it is younger than the TTL.
    pub fn get_fresh(&self, key: &str) -> Option<f64> {
        let entry = self.store.get(key)?;
        let age = self.clock.now() - entry.stored_at;
        if age < self.ttl {
            let age_hours = age.num_minutes() as f64 / 60.0;
            info!(key, value = entry.value, age_hours, "Using cached value");
            Some(entry.value)
        } else {
            debug!(key, "Cached value expired");
            None
        }
    }

    pub fn insert(&self, key: &str, value: f64) {
        self.store.put(key, CachedValue { value, stored_at: self.clock.now() });
    }

    /// Age of the stored entry, fresh or not.
    pub fn age(&self, key: &str) -> Option<Duration> {
        self.store.get(key).map(|entry| self.clock.now() - entry.stored_at)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use chrono::TimeZone;

    fn setup() -> (Arc<FixedClock>, TtlCache) {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()));
        let cache = TtlCache::in_memory(clock.clone(), Duration::hours(24));
        (clock, cache)
    }

    #[test]
    fn test_miss_on_empty() {
        let (_, cache) = setup();
        assert_eq!(cache.get_fresh("shiller_pe"), None);
        assert_eq!(cache.age("shiller_pe"), None);
    }

    #[test]
    fn test_hit_within_ttl() {
        let (clock, cache) = setup();
        cache.insert("shiller_pe", 36.4);
        clock.advance(Duration::hours(23));

        assert_eq!(cache.get_fresh("shiller_pe"), Some(36.4));
        assert_eq!(cache.age("shiller_pe"), Some(Duration::hours(23)));
    }

    #[test]
    fn test_expires_at_ttl() {
        let (clock, cache) = setup();
        cache.insert("shiller_pe", 36.4);
        clock.advance(Duration::hours(24));

        assert_eq!(cache.get_fresh("shiller_pe"), None);
    }

    #[test]
    fn test_reinsert_refreshes_timestamp() {
        let (clock, cache) = setup();
        cache.insert("shiller_pe", 36.4);
        clock.advance(Duration::hours(30));
        cache.insert("shiller_pe", 37.0);

        assert_eq!(cache.get_fresh("shiller_pe"), Some(37.0));
    }

    #[test]
    fn test_shared_store() {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(Utc::now()));
        let store: Arc<dyn CacheStore> = Arc::new(InMemoryStore::new());
        let writer = TtlCache::new(store.clone(), clock.clone(), Duration::hours(1));
        let reader = TtlCache::new(store, clock, Duration::hours(1));

        writer.insert("vix", 18.2);
        assert_eq!(reader.get_fresh("vix"), Some(18.2));
    }
}
