//! API Configuration Module
//!
//! Configuration for the HTTP surface (bind address, CORS) and for the
//! catalogue itself (caching, table naming, picture bucket). Everything is
//! loaded from environment variables with defaults suited to development.

use std::net::SocketAddr;

use hangar_core::{ConfigError, HangarResult};

// ============================================================================
// ENV HELPERS
// ============================================================================

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    env_string(key)
        .map(|s| matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind.
    pub bind_host: String,

    /// Port to listen on.
    pub port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins.
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
            cors_max_age_secs: 86400,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `HANGAR_API_BIND`: Interface to bind (default: 0.0.0.0)
    /// - `PORT` or `HANGAR_API_PORT`: Listen port (default: 3000)
    /// - `HANGAR_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `HANGAR_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    pub fn from_env() -> HangarResult<Self> {
        let defaults = Self::default();

        let port = match env_string("PORT").or_else(|| env_string("HANGAR_API_PORT")) {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                field: "PORT".to_string(),
                value: raw.clone(),
                reason: "expected a port number".to_string(),
            })?,
            None => defaults.port,
        };

        let cors_origins = env_string("HANGAR_CORS_ORIGINS")
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        let cors_max_age_secs = env_string("HANGAR_CORS_MAX_AGE_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        Ok(Self {
            bind_host: env_string("HANGAR_API_BIND").unwrap_or(defaults.bind_host),
            port,
            cors_origins,
            cors_max_age_secs,
        })
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> HangarResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue {
                field: "HANGAR_API_BIND".to_string(),
                value: addr.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

// ============================================================================
// CATALOG CONFIGURATION
// ============================================================================

/// Storage layout and caching for the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Keep an in-process mirror of every entity table.
    pub keep_cache: bool,

    /// Prefix prepended to every table name.
    pub table_prefix: String,

    /// Object store bucket holding model pictures.
    pub picture_bucket: String,

    /// Secondary index on the model table keyed by picture.
    pub picture_index: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            keep_cache: true,
            table_prefix: String::new(),
            picture_bucket: "hangar-pics".to_string(),
            picture_index: "picture-code-index".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Create CatalogConfig from environment variables.
    ///
    /// Environment variables:
    /// - `HANGAR_KEEP_CACHE`: "true" or "false" (default: true)
    /// - `HANGAR_TABLE_PREFIX`: Prefix for table names (default: empty)
    /// - `HANGAR_PICTURE_BUCKET`: Picture bucket (default: hangar-pics)
    /// - `HANGAR_PICTURE_INDEX`: Picture index name (default: picture-code-index)
    pub fn from_env() -> HangarResult<Self> {
        let defaults = Self::default();
        let config = Self {
            keep_cache: env_bool("HANGAR_KEEP_CACHE", defaults.keep_cache),
            table_prefix: env_string("HANGAR_TABLE_PREFIX").unwrap_or(defaults.table_prefix),
            picture_bucket: env_string("HANGAR_PICTURE_BUCKET")
                .unwrap_or(defaults.picture_bucket),
            picture_index: env_string("HANGAR_PICTURE_INDEX").unwrap_or(defaults.picture_index),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> HangarResult<()> {
        if self.picture_bucket.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "HANGAR_PICTURE_BUCKET".to_string(),
            }
            .into());
        }
        if self.picture_index.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "HANGAR_PICTURE_INDEX".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Physical table name for an entity collection.
    pub fn table_name(&self, entity: &str) -> String {
        format!("{}{}", self.table_prefix, entity)
    }
}
