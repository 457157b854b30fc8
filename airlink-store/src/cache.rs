use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// TTL-bound lookup cache, injected through application state instead of
/// living as module-level globals. Entries expire after the configured
/// TTL; there is no other eviction.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry<V>>>,
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hit_within_ttl_and_miss_after_expiry() {
        let cache = TtlCache::new(Duration::from_millis(40));
        cache.insert("regiones", vec![1, 2, 3]).await;

        assert_eq!(cache.get("regiones").await, Some(vec![1, 2, 3]));
        assert_eq!(cache.get("comunas").await, None);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(cache.get("regiones").await, None);
    }

    #[tokio::test]
    async fn insert_refreshes_the_expiry() {
        let cache = TtlCache::new(Duration::from_millis(50));
        cache.insert("k", 1).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.insert("k", 2).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("k").await, Some(2));
    }
}
