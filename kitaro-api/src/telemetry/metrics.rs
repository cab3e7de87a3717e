//! Prometheus Metrics Definitions
//!
//! Defines the registry metrics and the /metrics endpoint for Prometheus
//! scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Database operation latency buckets (seconds)
const DB_LATENCY_BUCKETS: &[f64] =
    &[0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<KitaroMetrics>> = Lazy::new(KitaroMetrics::new);

/// Outcome label for `kitaro_registrations_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    Duplicate,
    Invalid,
    Failed,
}

impl RegistrationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationOutcome::Registered => "registered",
            RegistrationOutcome::Duplicate => "duplicate",
            RegistrationOutcome::Invalid => "invalid",
            RegistrationOutcome::Failed => "failed",
        }
    }
}

/// Container for all registry metrics.
#[derive(Clone)]
pub struct KitaroMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// Database operation counter - labels: operation, status
    pub db_operations_total: CounterVec,

    /// Database operation duration histogram - labels: operation
    pub db_operation_duration_seconds: HistogramVec,

    /// Registration attempts - labels: outcome
    pub registrations_total: CounterVec,

    /// Referral increments - labels: matched (true/false/error)
    pub referral_increments_total: CounterVec,
}

impl KitaroMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "kitaro_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "kitaro_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            db_operations_total: register_counter_vec!(
                "kitaro_db_operations_total",
                "Total number of database operations",
                &["operation", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register db_operations_total: {}", e)))?,

            db_operation_duration_seconds: register_histogram_vec!(
                "kitaro_db_operation_duration_seconds",
                "Database operation duration in seconds",
                &["operation"],
                DB_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register db_operation_duration_seconds: {}", e)))?,

            registrations_total: register_counter_vec!(
                "kitaro_registrations_total",
                "Registration attempts by outcome",
                &["outcome"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register registrations_total: {}", e)))?,

            referral_increments_total: register_counter_vec!(
                "kitaro_referral_increments_total",
                "Referral counter updates by whether a referrer row matched",
                &["matched"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register referral_increments_total: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a database operation.
    pub fn record_db_operation(&self, operation: &str, success: bool, duration_secs: f64) {
        let status = if success { "success" } else { "error" };
        self.db_operations_total
            .with_label_values(&[operation, status])
            .inc();
        self.db_operation_duration_seconds
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn record_registration(&self, outcome: RegistrationOutcome) {
        self.registrations_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    /// `matched` is `None` when the increment itself failed.
    pub fn record_referral_increment(&self, matched: Option<bool>) {
        let label = match matched {
            Some(true) => "true",
            Some(false) => "false",
            None => "error",
        };
        self.referral_increments_total
            .with_label_values(&[label])
            .inc();
    }
}

// Call-site helpers; a registration failure at startup is logged once and
// metrics are skipped from then on.

pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    if let Ok(m) = METRICS.as_ref() {
        m.record_http_request(method, path, status, duration_secs);
    }
}

pub fn record_db_operation(operation: &str, success: bool, duration_secs: f64) {
    if let Ok(m) = METRICS.as_ref() {
        m.record_db_operation(operation, success, duration_secs);
    }
}

pub fn record_registration(outcome: RegistrationOutcome) {
    if let Ok(m) = METRICS.as_ref() {
        m.record_registration(outcome);
    }
}

pub fn record_referral_increment(matched: Option<bool>) {
    if let Ok(m) = METRICS.as_ref() {
        m.record_referral_increment(matched);
    }
}

/// Force metric registration, logging a failure.
pub fn init_metrics() {
    if let Err(e) = METRICS.as_ref() {
        tracing::error!(error = %e, "Metrics registration failed; metrics disabled");
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> Result<&'static KitaroMetrics, String> {
        METRICS
            .as_ref()
            .map_err(|e| format!("Metrics init failed: {}", e.message))
    }

    #[test]
    fn test_record_registration_outcomes() -> Result<(), String> {
        let m = metrics()?;
        let before = m
            .registrations_total
            .with_label_values(&["duplicate"])
            .get();
        record_registration(RegistrationOutcome::Duplicate);
        let after = m
            .registrations_total
            .with_label_values(&["duplicate"])
            .get();
        assert!(after >= before + 1.0);
        Ok(())
    }

    #[test]
    fn test_record_referral_increment_labels() -> Result<(), String> {
        let m = metrics()?;
        record_referral_increment(Some(true));
        record_referral_increment(Some(false));
        record_referral_increment(None);
        assert!(m.referral_increments_total.with_label_values(&["error"]).get() >= 1.0);
        Ok(())
    }

    #[test]
    fn test_record_db_operation() -> Result<(), String> {
        metrics()?;
        record_db_operation("insert", true, 0.005);
        record_db_operation("leaderboard", false, 0.010);
        Ok(())
    }

    #[tokio::test]
    async fn test_metrics_handler_exposes_registry_metrics() {
        use axum::body::to_bytes;
        record_http_request("GET", "/api/v1/registry", 200, 0.002);

        let response = metrics_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("kitaro_http_requests_total"));
    }
}
