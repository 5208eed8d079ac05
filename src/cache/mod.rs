//! Cache layer
//!
//! An explicit invalidation port (`CacheStore`) with an in-memory moka
//! implementation. The store is injected into the services that need it;
//! there is no module-level singleton. Values are stored JSON-encoded so any
//! serializable type fits through the object-safe trait.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

pub use memory::MemoryCache;

/// Object-safe cache port.
///
/// Implementations store opaque JSON strings; typed access goes through the
/// [`Cache`] wrapper.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get the raw JSON for a key
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// Store raw JSON under a key with a TTL
    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Remove a key. Removing an absent key is a no-op, not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Drop every entry
    async fn clear(&self) -> Result<()>;

    /// Number of live entries (approximate for concurrent stores)
    fn entry_count(&self) -> u64;
}

/// Typed wrapper over a [`CacheStore`]
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    default_ttl: Duration,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    /// Get and deserialize a value
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get_raw(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and store a value with the default TTL
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Serialize and store a value with an explicit TTL
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set_raw(key, raw, ttl).await
    }

    /// Invalidate a single key
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(key).await
    }

    /// Drop every entry
    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }

    /// Number of live entries
    pub fn entry_count(&self) -> u64 {
        self.store.entry_count()
    }
}

/// Build the cache from configuration
pub fn create_cache(config: &CacheConfig) -> Cache {
    let store = Arc::new(MemoryCache::with_capacity(config.max_capacity));
    Cache::new(store, Duration::from_secs(config.ttl_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cache() -> Cache {
        create_cache(&CacheConfig::default())
    }

    #[tokio::test]
    async fn set_get_round_trip() {
        let cache = test_cache();
        cache.set("greeting", &"hello".to_string()).await.unwrap();
        let value: Option<String> = cache.get("greeting").await.unwrap();
        assert_eq!(value, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let cache = test_cache();
        cache.set("key", &1i64).await.unwrap();
        cache.delete("key").await.unwrap();
        let value: Option<i64> = cache.get("key").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn delete_missing_key_is_ok() {
        let cache = test_cache();
        assert!(cache.delete("never-set").await.is_ok());
    }

    #[tokio::test]
    async fn typed_values_round_trip() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Preview {
            id: i64,
            html: String,
        }
        let cache = test_cache();
        let preview = Preview {
            id: 42,
            html: "<p>hi</p>".to_string(),
        };
        cache.set("blog_post_preview_42", &preview).await.unwrap();
        let back: Option<Preview> = cache.get("blog_post_preview_42").await.unwrap();
        assert_eq!(back, Some(preview));
    }
}
