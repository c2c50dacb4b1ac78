//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use anyhow::{Context, Result};
use tracing::info;

use crate::cache::ViewCache;
use crate::config::environment::{EnvironmentConfig, StorageBackend};
use crate::config::DatabaseConfig;
use crate::database::DatabaseConnection;
use crate::repositories::Repositories;

#[derive(Clone)]
pub struct AppState {
    pub repositories: Repositories,
    pub cache: ViewCache,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(repositories: Repositories, cache: ViewCache, config: EnvironmentConfig) -> Self {
        Self {
            repositories,
            cache,
            config,
        }
    }

    /// Armar el estado según `STORAGE` y `REDIS_URL`
    pub async fn from_config(config: EnvironmentConfig) -> Result<Self> {
        let repositories = match config.storage {
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL must be set in environment variables")?;
                let connection = DatabaseConnection::connect(&DatabaseConfig::new(url)).await?;
                Repositories::postgres(connection.pool().clone())
            }
            StorageBackend::Memory => {
                info!("🧪 Usando almacenamiento en memoria");
                Repositories::in_memory()
            }
        };

        let cache = ViewCache::connect(&config.cache).await?;

        Ok(Self::new(repositories, cache, config))
    }

    /// Estado completamente en memoria (tests)
    pub fn in_memory() -> Self {
        let config = EnvironmentConfig::default();
        let cache = ViewCache::in_memory(&config.cache);
        Self::new(Repositories::in_memory(), cache, config)
    }
}
