//! OpenAPI Specification for the registry API
//!
//! Generated by utoipa from the handler annotations and schema derives.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{health, operative, registry};
use crate::telemetry::metrics;
use crate::types::{RegisterOperativeRequest, RegisterOperativeResponse, RegistryEntry};

/// OpenAPI document for the MEGAKITARO registry API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MEGAKITARO Registry API",
        version = "0.1.0",
        description = "Operative registration and referral leaderboard",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Operatives", description = "Operative registration"),
        (name = "Registry", description = "Referral leaderboard"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        operative::register_operative,
        registry::list_registry,
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(schemas(
        RegisterOperativeRequest,
        RegisterOperativeResponse,
        RegistryEntry,
        ApiError,
        ErrorCode,
        HealthResponse,
        HealthStatus,
        HealthDetails,
        ComponentHealth,
    ))
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }

    /// Generate OpenAPI spec as YAML string.
    #[cfg(feature = "openapi")]
    pub fn to_yaml() -> Result<String, String> {
        serde_yaml::to_string(&Self::openapi()).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "MEGAKITARO Registry API");

        let tags = openapi
            .tags
            .as_ref()
            .ok_or_else(|| "OpenAPI tags missing".to_string())?;
        assert_eq!(tags.len(), 4);

        let components = openapi
            .components
            .as_ref()
            .ok_or_else(|| "OpenAPI components missing".to_string())?;
        assert!(components.schemas.contains_key("ApiError"));
        assert!(components.schemas.contains_key("RegistryEntry"));
        Ok(())
    }

    #[test]
    fn test_openapi_paths_exist() {
        let openapi = ApiDoc::openapi();
        assert!(openapi.paths.paths.contains_key("/api/v1/operatives"));
        assert!(openapi.paths.paths.contains_key("/api/v1/registry"));
        assert!(openapi.paths.paths.contains_key("/health/ready"));
        assert!(openapi.paths.paths.contains_key("/metrics"));
    }

    #[test]
    fn test_openapi_json_serialization() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| format!("Failed to serialize OpenAPI: {}", e))?;
        serde_json::from_str::<serde_json::Value>(&json)
            .map_err(|e| format!("Generated JSON invalid: {}", e))?;
        assert!(json.contains("xHandle"));
        Ok(())
    }

    #[test]
    fn test_registry_entry_timestamp_is_date_time_string() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| format!("Failed to serialize OpenAPI: {}", e))?;
        let doc: serde_json::Value =
            serde_json::from_str(&json).map_err(|e| format!("Generated JSON invalid: {}", e))?;
        let created_at = &doc["components"]["schemas"]["RegistryEntry"]["properties"]["created_at"];
        assert_eq!(created_at["type"], "string");
        assert_eq!(created_at["format"], "date-time");
        Ok(())
    }
}
