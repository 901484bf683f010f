//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

const DEFAULT_FILTER: &str = "hangar_api=debug,hangar_storage=info,tower_http=debug,info";

/// Output format of the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// `HANGAR_LOG_FORMAT`: "pretty" (default) or "json"
    pub log_format: LogFormat,
    /// Filter used when `RUST_LOG` is unset
    pub default_filter: String,
    /// Service name attached to the startup event
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            default_filter: DEFAULT_FILTER.to_string(),
            service_name: "hangar-api".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Load telemetry configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let log_format = match std::env::var("HANGAR_LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => defaults.log_format,
        };
        Self {
            log_format,
            service_name: std::env::var("HANGAR_SERVICE_NAME").unwrap_or(defaults.service_name),
            ..defaults
        }
    }
}

/// Install the global tracing subscriber. Call once at startup.
pub fn init_tracing(config: &TelemetryConfig) -> ApiResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    result.map_err(|e| ApiError::internal_error(format!("Failed to init subscriber: {}", e)))?;

    tracing::info!(
        service_name = %config.service_name,
        log_format = ?config.log_format,
        "Telemetry initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EnvVarGuard {
        key: &'static str,
        original: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let original = std::env::var(key).ok();
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
            Self { key, original }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match self.original.as_deref() {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn test_telemetry_config_format_selection() {
        {
            let _guard = EnvVarGuard::set("HANGAR_LOG_FORMAT", Some("JSON"));
            assert_eq!(TelemetryConfig::from_env().log_format, LogFormat::Json);
            assert_eq!(TelemetryConfig::default().log_format, LogFormat::Pretty);
        }
        let _guard = EnvVarGuard::set("HANGAR_LOG_FORMAT", None);
        let config = TelemetryConfig::from_env();
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.default_filter, DEFAULT_FILTER);
    }
}
