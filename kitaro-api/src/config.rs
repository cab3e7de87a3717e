//! API Configuration Module
//!
//! CORS, store selection and bind address. Everything is read from
//! environment variables with development defaults.

use std::net::SocketAddr;

use crate::constants::{DEFAULT_BIND_HOST, DEFAULT_CORS_MAX_AGE_SECS, DEFAULT_PORT};
use crate::error::{ApiError, ApiResult};

// ============================================================================
// STORE SELECTION
// ============================================================================

/// Which operative store backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Process-local store; contents are lost on restart.
    Memory,
    /// PostgreSQL through the connection pool.
    Postgres,
}

impl StoreKind {
    /// Parse `KITARO_STORE`. Unknown values are rejected.
    pub fn parse(value: &str) -> ApiResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreKind::Memory),
            "postgres" | "pg" | "postgresql" => Ok(StoreKind::Postgres),
            other => Err(ApiError::invalid_input(format!(
                "Unknown KITARO_STORE value: {}",
                other
            ))),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Storage
    // ========================================================================
    pub store: StoreKind,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: DEFAULT_CORS_MAX_AGE_SECS,
            store: StoreKind::Postgres,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `KITARO_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `KITARO_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `KITARO_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `KITARO_STORE`: "postgres" (default) or "memory"
    pub fn from_env() -> ApiResult<Self> {
        let cors_origins = std::env::var("KITARO_CORS_ORIGINS")
            .ok()
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("KITARO_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("KITARO_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CORS_MAX_AGE_SECS);

        let store = match std::env::var("KITARO_STORE") {
            Ok(value) => StoreKind::parse(&value)?,
            Err(_) => StoreKind::Postgres,
        };

        Ok(Self {
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            store,
        })
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Wildcard subdomains: *.megakitaro.xyz
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain.ends_with(&format!(".{}", pattern))
                        || origin_domain == pattern;
                }
            }
            false
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
// BIND ADDRESS
// ============================================================================

/// Resolve the listen address from `KITARO_API_BIND` and `PORT` /
/// `KITARO_API_PORT`.
pub fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("KITARO_API_BIND").unwrap_or_else(|_| DEFAULT_BIND_HOST.to_string());
    let port = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("KITARO_API_PORT").ok());
    bind_addr(&host, port.as_deref())
}

fn bind_addr(host: &str, port: Option<&str>) -> ApiResult<SocketAddr> {
    let port = match port {
        Some(raw) => raw
            .parse::<u16>()
            .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
        None => DEFAULT_PORT,
    };

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert!(!config.cors_allow_credentials);
        assert_eq!(config.cors_max_age_secs, 86400);
        assert_eq!(config.store, StoreKind::Postgres);
    }

    #[test]
    fn test_store_kind_parse() -> ApiResult<()> {
        assert_eq!(StoreKind::parse("memory")?, StoreKind::Memory);
        assert_eq!(StoreKind::parse(" Postgres ")?, StoreKind::Postgres);
        assert!(StoreKind::parse("sqlite").is_err());
        Ok(())
    }

    #[test]
    fn test_origin_allowed_dev_mode() {
        let config = ApiConfig::default();
        assert!(!config.is_production());
        assert!(config.is_origin_allowed("http://localhost:5173"));
    }

    #[test]
    fn test_origin_allowed_production() {
        let config = ApiConfig {
            cors_origins: parse_origins("https://megakitaro.xyz, *.megakitaro.xyz,,"),
            ..Default::default()
        };

        assert!(config.is_production());
        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.is_origin_allowed("https://megakitaro.xyz"));
        assert!(config.is_origin_allowed("https://app.megakitaro.xyz"));
        assert!(!config.is_origin_allowed("https://evilmegakitaro.xyz"));
        assert!(!config.is_origin_allowed("https://other.io"));
    }

    #[test]
    fn test_bind_addr() -> ApiResult<()> {
        assert_eq!(bind_addr("127.0.0.1", Some("8080"))?.port(), 8080);
        assert_eq!(bind_addr("0.0.0.0", None)?.port(), 3000);
        assert!(bind_addr("0.0.0.0", Some("http")).is_err());
        assert!(bind_addr("not a host", Some("80")).is_err());
        Ok(())
    }
}
