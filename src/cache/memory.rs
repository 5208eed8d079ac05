//! In-memory cache implementation using moka
//!
//! Thread-safe cache with per-entry TTL via moka's `Expiry` hook.

use super::CacheStore;
use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default maximum cache capacity (number of entries)
const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// A cached JSON payload with its own TTL
#[derive(Clone)]
struct Entry {
    data: Arc<String>,
    ttl: Duration,
}

struct PerEntryExpiry;

impl Expiry<String, Entry> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-memory cache backed by moka
pub struct MemoryCache {
    cache: MokaCache<String, Entry>,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .build();
        Self { cache }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .cache
            .get(key)
            .await
            .map(|entry| entry.data.as_ref().clone()))
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let entry = Entry {
            data: Arc::new(value),
            ttl,
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        Ok(())
    }

    fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn expired_entries_are_gone() {
        let cache = MemoryCache::new();
        cache
            .set_raw("k", "\"v\"".to_string(), Duration::from_millis(20))
            .await
            .unwrap();
        assert!(cache.get_raw("k").await.unwrap().is_some());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get_raw("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = MemoryCache::new();
        cache
            .set_raw("a", "1".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set_raw("b", "2".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        cache.clear().await.unwrap();
        assert!(cache.get_raw("a").await.unwrap().is_none());
        assert!(cache.get_raw("b").await.unwrap().is_none());
    }
}
