//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::{FixedOffset, Offset, Utc};

use crate::cache::CacheConfig;

/// Backend de persistencia
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("STORAGE inválido: {}", other)),
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub cache: CacheConfig,
    /// Offset (horas) del día comercial usado por el dashboard
    pub business_utc_offset_hours: i32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            storage: StorageBackend::Memory,
            database_url: None,
            cache: CacheConfig::default(),
            business_utc_offset_hours: -3,
        }
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} inválido ({}): {}", key, value, e)),
        _ => Ok(default),
    }
}

impl EnvironmentConfig {
    /// Leer la configuración del entorno, con defaults para desarrollo
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let storage = match env::var("STORAGE") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ if database_url.is_some() => StorageBackend::Postgres,
            _ => StorageBackend::Memory,
        };
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL must be set when STORAGE=postgres"));
        }

        let offset: i32 = parse_var("BUSINESS_UTC_OFFSET_HOURS", defaults.business_utc_offset_hours)?;
        offset
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .context("BUSINESS_UTC_OFFSET_HOURS fuera de rango")?;

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parse_var("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            storage,
            database_url,
            cache: CacheConfig {
                redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
                default_ttl: parse_var("CACHE_TTL", defaults.cache.default_ttl)?,
                key_prefix: defaults.cache.key_prefix,
            },
            business_utc_offset_hours: offset,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Zona fija del día comercial (default -03:00)
    pub fn business_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.business_utc_offset_hours * 3600).unwrap_or(Utc.fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!("Postgres".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_default_business_offset() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.business_offset().local_minus_utc(), -3 * 3600);
        assert_eq!(config.server_url(), "0.0.0.0:3000");
    }
}
