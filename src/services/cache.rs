//! Search result cache
//!
//! Time-boxed memoization keyed by the normalized query string. Staleness is
//! checked lazily on read; an expired entry is treated as absent and silently
//! overwritten by the next write. The map is unbounded for the engine's
//! lifetime, which is acceptable for the bounded query spaces seen in
//! practice; a production deployment should add an eviction policy (LRU or a
//! size cap) on top.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// A cached value together with its insertion time
#[derive(Debug, Clone)]
struct CachedEntry<T> {
    value: T,
    inserted_at: Instant,
}

/// TTL-bounded cache shared across concurrent requests
#[derive(Debug, Clone)]
pub struct SearchCache<T> {
    entries: Arc<RwLock<HashMap<String, CachedEntry<T>>>>,
    ttl: Duration,
}

impl<T: Clone> SearchCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Look up a value; expired entries are treated as absent
    pub async fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if is_fresh(entry.inserted_at, Instant::now(), self.ttl) {
            debug!(key, "cache hit");
            Some(entry.value.clone())
        } else {
            debug!(key, "cache entry expired");
            None
        }
    }

    pub async fn set(&self, key: String, value: T) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CachedEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, fresh or not (for tests and monitoring)
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

/// Freshness is strict: an entry exactly `ttl` old is already stale
fn is_fresh(inserted_at: Instant, now: Instant, ttl: Duration) -> bool {
    now.duration_since(inserted_at) < ttl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_fresh_value() {
        let cache: SearchCache<String> = SearchCache::new(Duration::from_secs(60));
        cache.set("k".to_string(), "v".to_string()).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_get_misses_unknown_key() {
        let cache: SearchCache<String> = SearchCache::new(Duration::from_secs(60));
        assert!(cache.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let cache: SearchCache<u32> = SearchCache::new(Duration::from_millis(20));
        cache.set("k".to_string(), 1).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get("k").await.is_none());
        // The stale entry is still stored until overwritten
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_write_overwrites_expired_entry() {
        let cache: SearchCache<u32> = SearchCache::new(Duration::from_millis(20));
        cache.set("k".to_string(), 1).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.set("k".to_string(), 2).await;
        assert_eq!(cache.get("k").await, Some(2));
        assert_eq!(cache.len().await, 1);
    }

    #[test]
    fn test_freshness_boundary_is_strict() {
        let ttl = Duration::from_secs(900);
        let inserted = Instant::now();
        assert!(is_fresh(inserted, inserted + ttl - Duration::from_nanos(1), ttl));
        // Exactly at the TTL boundary the entry is stale
        assert!(!is_fresh(inserted, inserted + ttl, ttl));
        assert!(!is_fresh(inserted, inserted + ttl + Duration::from_nanos(1), ttl));
    }
}
