//! Cache
//!
//! Este módulo contiene el cache de vistas (listados y detalles) con dos
//! backends: Redis y memoria local.

pub mod cache_config;
pub mod memory_cache;
pub mod redis_client;
pub mod view_cache;

use anyhow::Result;
use async_trait::async_trait;

pub use cache_config::CacheConfig;
pub use view_cache::ViewCache;

/// Operaciones de cache sobre valores ya serializados
#[async_trait]
pub trait CacheOperations: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String, ttl: u64) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    /// Backend alcanzable (reportado en `/health`)
    async fn ping(&self) -> bool;
}
