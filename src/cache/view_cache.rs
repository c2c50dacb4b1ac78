//! Cache de vistas
//!
//! Los listados y detalles se leen cache-aside. Cada acción de escritura
//! invalida las claves de las vistas afectadas; los errores de invalidación
//! se registran y no se propagan.

use std::fmt::Display;
use std::sync::Arc;

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::memory_cache::MemoryCache;
use super::redis_client::RedisClient;
use super::{CacheConfig, CacheOperations};

pub const UNITS: &str = "units";
pub const CLIENTS: &str = "clients";
pub const DRIVERS: &str = "drivers";
pub const TRUCKS: &str = "trucks";
pub const SEMI_TRAILERS: &str = "semi_trailers";
pub const CARGOS: &str = "cargos";
pub const GROUPINGS: &str = "groupings";
pub const TRIPS: &str = "trips";
pub const COMPANIES: &str = "companies";

#[derive(Clone)]
pub struct ViewCache {
    backend: Arc<dyn CacheOperations>,
    ttl: u64,
    prefix: String,
    backend_name: &'static str,
}

impl ViewCache {
    /// Redis si hay URL configurada, si no memoria local
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        match &config.redis_url {
            Some(url) => {
                let client = RedisClient::new(url).await?;
                Ok(Self::with_backend(Arc::new(client), config, "redis"))
            }
            None => {
                info!("💾 REDIS_URL no configurada, usando cache en memoria");
                Ok(Self::in_memory(config))
            }
        }
    }

    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::with_backend(Arc::new(MemoryCache::new()), config, "memory")
    }

    pub fn with_backend(
        backend: Arc<dyn CacheOperations>,
        config: &CacheConfig,
        backend_name: &'static str,
    ) -> Self {
        Self {
            backend,
            ttl: config.default_ttl,
            prefix: config.key_prefix.clone(),
            backend_name,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    pub async fn is_available(&self) -> bool {
        self.backend.ping().await
    }

    /// Clave del listado de una vista: `fleet_backoffice:view:units`
    pub fn list_key(&self, view: &str) -> String {
        format!("{}:view:{}", self.prefix, view)
    }

    /// Clave del detalle: `fleet_backoffice:view:units:42`
    pub fn detail_key(&self, view: &str, id: impl Display) -> String {
        format!("{}:view:{}:{}", self.prefix, view, id)
    }

    /// Lectura tolerante: un error del backend o de deserialización es un MISS
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.backend.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("⚠️ Valor de cache inválido para {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("⚠️ Error leyendo cache para {}: {}", key, e);
                None
            }
        }
    }

    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("⚠️ No se pudo serializar {} para cache: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.backend.set(key, raw, self.ttl).await {
            warn!("⚠️ Error guardando cache para {}: {}", key, e);
        }
    }

    /// Invalida el listado de la vista
    pub async fn invalidate_list(&self, view: &str) {
        self.invalidate_keys(&[self.list_key(view)]).await;
    }

    /// Invalida el listado y el detalle de un registro
    pub async fn invalidate(&self, view: &str, id: impl Display) {
        let keys = [self.list_key(view), self.detail_key(view, id)];
        self.invalidate_keys(&keys).await;
    }

    pub async fn invalidate_keys(&self, keys: &[String]) {
        for key in keys {
            match self.backend.delete(key).await {
                Ok(()) => debug!("🗑️ Vista invalidada: {}", key),
                Err(e) => warn!("⚠️ Error invalidando {}: {}", key, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalidate_removes_list_and_detail() {
        let cache = ViewCache::in_memory(&CacheConfig::default());
        let list = cache.list_key(UNITS);
        let detail = cache.detail_key(UNITS, 7);
        assert_eq!(list, "fleet_backoffice:view:units");
        assert_eq!(detail, "fleet_backoffice:view:units:7");

        cache.set(&list, &vec![1, 2]).await;
        cache.set(&detail, &7).await;
        assert_eq!(cache.get::<Vec<i32>>(&list).await, Some(vec![1, 2]));

        cache.invalidate(UNITS, 7).await;
        assert_eq!(cache.get::<Vec<i32>>(&list).await, None);
        assert_eq!(cache.get::<i32>(&detail).await, None);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_a_miss() {
        let cache = ViewCache::in_memory(&CacheConfig::default());
        let key = cache.list_key(TRIPS);
        cache.set(&key, &"texto").await;
        assert_eq!(cache.get::<Vec<i32>>(&key).await, None);
    }
}
