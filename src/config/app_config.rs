use crate::error::{AppError, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub products_bucket: String,
    pub banner_bucket: String,
    /// Public base URL objects are served from; `{assets_url}/{bucket}/{key}`.
    pub assets_url: String,
    pub max_image_size: usize,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_entries: u64,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::ConfigError(format!("Invalid {} value", name)))
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", "3000")?,
                max_body_size: parse_var("MAX_BODY_SIZE", "12582912")?,
            },
            database: DatabaseConfig {
                url: env::var("DB_URL")?,
                max_connections: parse_var("DB_MAX_CONNECTIONS", "20")?,
                acquire_timeout_secs: parse_var("DB_ACQUIRE_TIMEOUT_SECS", "5")?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("FRONTEND_URL")?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            storage: StorageConfig {
                products_bucket: env::var("S3_PRODUCTS_BUCKET")
                    .unwrap_or_else(|_| "products".to_string()),
                banner_bucket: env::var("S3_BANNER_BUCKET")
                    .unwrap_or_else(|_| "banner".to_string()),
                assets_url: env::var("ASSETS_URL")?.trim_end_matches('/').to_string(),
                max_image_size: parse_var("MAX_IMAGE_SIZE", "5242880")?,
            },
            cache: CacheConfig {
                ttl_secs: parse_var("CACHE_TTL_SECS", "60")?,
                max_entries: parse_var("CACHE_MAX_ENTRIES", "1024")?,
            },
        })
    }

    /// Read before the rest of the config so startup errors are logged at
    /// the right level. Unknown values fall back to `info`.
    pub fn log_level() -> tracing::Level {
        env::var("LOG_LEVEL")
            .ok()
            .and_then(|level| level.parse().ok())
            .unwrap_or(tracing::Level::INFO)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
