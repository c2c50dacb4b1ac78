use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::CacheOperations;

/// Cache local con expiración, usado cuando no hay Redis configurado
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheOperations for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => {
                debug!("📥 Cache HIT para clave: {}", key);
                Ok(Some(value.clone()))
            }
            _ => {
                debug!("❌ Cache MISS para clave: {}", key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: String, ttl: u64) -> Result<()> {
        let expires_at = Instant::now() + Duration::from_secs(ttl);
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, at)| *at > Instant::now());
        entries.insert(key.to_string(), (value, expires_at));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new();
        cache.set("k", "v".into(), 60).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
        assert!(cache.ping().await);

        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses() {
        let cache = MemoryCache::new();
        cache.set("k", "v".into(), 0).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
