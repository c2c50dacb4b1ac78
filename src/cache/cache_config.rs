//! Configuración de cache
//!
//! Este módulo contiene la configuración para el sistema de cache.

use serde::{Deserialize, Serialize};

/// Configuración del cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Sin URL se usa el cache en memoria
    pub redis_url: Option<String>,
    pub default_ttl: u64,
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            default_ttl: 300, // 5 minutos
            key_prefix: "fleet_backoffice".to_string(),
        }
    }
}
