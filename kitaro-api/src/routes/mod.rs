//! REST API Routes Module
//!
//! Includes:
//! - Operative registration (`POST /api/v1/operatives`)
//! - Leaderboard (`GET /api/v1/registry`)
//! - Health check endpoints (Kubernetes-compatible)
//! - Prometheus metrics and the OpenAPI document
//! - CORS support for the browser client

pub mod health;
pub mod operative;
pub mod registry;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::openapi::ApiDoc;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use health::create_router as health_router;
pub use operative::create_router as operative_router;
pub use registry::create_router as registry_router;

// ============================================================================
// OPENAPI ENDPOINTS
// ============================================================================

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(feature = "openapi")]
async fn openapi_yaml() -> impl IntoResponse {
    use axum::http::StatusCode;

    match ApiDoc::to_yaml() {
        Ok(yaml) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/yaml")], yaml),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            format!("Failed to generate YAML: {}", e),
        ),
    }
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// Empty origins allow everything (development). Otherwise an origin is
/// echoed back when `ApiConfig::is_origin_allowed` accepts it, which covers
/// `*.domain` entries.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if !config.is_production() {
        tracing::info!("CORS: Development mode - allowing all origins");
        return cors.allow_origin(Any);
    }

    tracing::info!(origins = ?config.cors_origins, "CORS: restricting origins");
    let allowed = config.clone();
    let cors = cors.allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        origin
            .to_str()
            .map(|origin| allowed.is_origin_allowed(origin))
            .unwrap_or(false)
    }));
    if config.cors_allow_credentials {
        cors.allow_credentials(true)
    } else {
        cors
    }
}

// ============================================================================
// ROUTER ASSEMBLY
// ============================================================================

/// Create the complete API router.
///
/// Execution order: CORS -> Observability -> Handler.
pub fn create_api_router(state: AppState, api_config: &ApiConfig) -> Router {
    let api = Router::new()
        .nest("/operatives", operative_router())
        .nest("/registry", registry_router());

    #[allow(unused_mut)]
    let mut router = Router::new()
        .nest("/api/v1", api)
        .nest("/health", health_router())
        .route("/metrics", get(metrics_handler))
        .route("/openapi.json", get(openapi_json));

    #[cfg(feature = "openapi")]
    {
        router = router.route("/openapi.yaml", get(openapi_yaml));
    }

    #[cfg(feature = "swagger-ui")]
    {
        use utoipa_swagger_ui::SwaggerUi;
        router = router.merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()));
    }

    router
        .layer(from_fn(observability_middleware))
        .layer(build_cors_layer(api_config))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_openapi_json_endpoint_exists() -> Result<(), axum::http::Error> {
        let app = create_api_router(AppState::in_memory(), &ApiConfig::default());
        let response = app
            .oneshot(HttpRequest::builder().uri("/openapi.json").body(Body::empty())?)
            .await
            .unwrap_or_else(|never| match never {});
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_post() -> Result<(), axum::http::Error> {
        let config = ApiConfig {
            cors_origins: vec!["https://megakitaro.xyz".to_string()],
            ..ApiConfig::default()
        };
        let app = create_api_router(AppState::in_memory(), &config);
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/v1/operatives")
                    .header(header::ORIGIN, "https://megakitaro.xyz")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())?,
            )
            .await
            .unwrap_or_else(|never| match never {});

        let allowed = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok());
        assert_eq!(allowed, Some("https://megakitaro.xyz"));
        Ok(())
    }

    async fn preflight_origin(config: &ApiConfig, origin: &str) -> Result<Option<String>, axum::http::Error> {
        let app = create_api_router(AppState::in_memory(), config);
        let response = app
            .oneshot(
                HttpRequest::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/v1/registry")
                    .header(header::ORIGIN, origin)
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())?,
            )
            .await
            .unwrap_or_else(|never| match never {});
        Ok(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string))
    }

    #[tokio::test]
    async fn test_cors_wildcard_subdomain_origin() -> Result<(), axum::http::Error> {
        let config = ApiConfig {
            cors_origins: vec!["*.megakitaro.xyz".to_string()],
            ..ApiConfig::default()
        };

        let echoed = preflight_origin(&config, "https://app.megakitaro.xyz").await?;
        assert_eq!(echoed.as_deref(), Some("https://app.megakitaro.xyz"));

        let echoed = preflight_origin(&config, "https://evil.example").await?;
        assert_eq!(echoed, None);
        Ok(())
    }
}
