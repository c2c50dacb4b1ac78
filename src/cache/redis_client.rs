use anyhow::Result;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, RedisResult};
use tracing::{debug, error, info, warn};

use super::CacheOperations;

/// Cliente Redis con connection manager y operaciones async
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
}

impl RedisClient {
    /// Crear nuevo cliente Redis
    pub async fn new(redis_url: &str) -> Result<Self> {
        info!("🔗 Conectando a Redis: {}", redis_url);

        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;

        // Test de conexión
        let mut conn = manager.clone();
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;

        info!("✅ Redis conectado exitosamente");

        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheOperations for RedisClient {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();

        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(value)) => {
                debug!("📥 Cache HIT para clave: {}", key);
                Ok(Some(value))
            }
            Ok(None) => {
                debug!("❌ Cache MISS para clave: {}", key);
                Ok(None)
            }
            Err(e) => {
                warn!("⚠️ Error leyendo cache para clave {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: String, ttl: u64) -> Result<()> {
        let mut conn = self.manager.clone();

        let result: RedisResult<()> = conn.set_ex(key, value, ttl).await;

        match result {
            Ok(()) => {
                debug!("💾 Cache SET para clave: {} (TTL: {}s)", key, ttl);
                Ok(())
            }
            Err(e) => {
                error!("❌ Error guardando en cache para clave {}: {}", key, e);
                Err(anyhow::anyhow!("Error de Redis: {}", e))
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();

        let result: RedisResult<i64> = conn.del(key).await;

        match result {
            Ok(count) => {
                debug!("🗑️ Cache DELETE para clave: {} (eliminados: {})", key, count);
                Ok(())
            }
            Err(e) => Err(anyhow::anyhow!("Error de Redis eliminando {}: {}", key, e)),
        }
    }

    async fn ping(&self) -> bool {
        let mut conn = self.manager.clone();
        let reply: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        match reply {
            Ok(reply) => reply == "PONG",
            Err(e) => {
                warn!("⚠️ Redis no responde al PING: {}", e);
                false
            }
        }
    }
}
