//! Shared helpers for driving the full router in-process.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request as HttpRequest, StatusCode},
    Router,
};
use kitaro_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, InMemoryStore, OperativeStore,
    RegisterOperativeRequest,
};
use kitaro_core::{NewOperative, Operative, RegistryEntry};
use serde_json::Value;
use tower::ServiceExt;

pub fn app_with_store(store: Arc<dyn OperativeStore>) -> Router {
    create_api_router(AppState::new(store), &ApiConfig::default())
}

/// Send one request and decode the JSON body (`Value::Null` when empty or
/// not JSON).
pub async fn send(app: &Router, request: HttpRequest<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn post_raw(uri: &str, body: impl Into<Body>) -> HttpRequest<Body> {
    HttpRequest::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap_or_else(|e| panic!("Failed to build request: {}", e))
}

/// POST with an arbitrary `Content-Type`, or none at all.
pub fn post_as(uri: &str, content_type: Option<&str>, body: impl Into<Body>) -> HttpRequest<Body> {
    let mut builder = HttpRequest::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder
        .body(body.into())
        .unwrap_or_else(|e| panic!("Failed to build request: {}", e))
}

pub fn request(method: Method, uri: &str) -> HttpRequest<Body> {
    HttpRequest::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap_or_else(|e| panic!("Failed to build request: {}", e))
}

pub async fn register(app: &Router, payload: &RegisterOperativeRequest) -> (StatusCode, Value) {
    let body = serde_json::to_vec(payload).unwrap_or_else(|e| panic!("Failed to encode: {}", e));
    send(app, post_raw("/api/v1/operatives", body)).await
}

pub async fn leaderboard(app: &Router) -> Vec<RegistryEntry> {
    let (status, body) = send(app, request(Method::GET, "/api/v1/registry")).await;
    assert_eq!(status, StatusCode::OK, "leaderboard failed: {}", body);
    serde_json::from_value(body).unwrap_or_else(|e| panic!("Bad leaderboard body: {}", e))
}

/// Store whose individual operations can be switched to fail.
#[derive(Default)]
pub struct FailingStore {
    pub inner: InMemoryStore,
    pub fail_insert: AtomicBool,
    pub fail_increment: AtomicBool,
    pub fail_read: AtomicBool,
}

impl FailingStore {
    pub fn failing_insert() -> Self {
        let store = Self::default();
        store.fail_insert.store(true, Ordering::SeqCst);
        store
    }

    pub fn failing_increment() -> Self {
        let store = Self::default();
        store.fail_increment.store(true, Ordering::SeqCst);
        store
    }

    pub fn failing_read() -> Self {
        let store = Self::default();
        store.fail_read.store(true, Ordering::SeqCst);
        store
    }
}

fn broken() -> ApiError {
    ApiError::database_error("connection reset by peer")
}

#[async_trait]
impl OperativeStore for FailingStore {
    async fn operative_insert(&self, new: NewOperative) -> ApiResult<Operative> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(broken());
        }
        self.inner.operative_insert(new).await
    }

    async fn referral_increment(&self, handle: &str) -> ApiResult<u64> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(broken());
        }
        self.inner.referral_increment(handle).await
    }

    async fn registry_top(&self, limit: usize) -> ApiResult<Vec<RegistryEntry>> {
        if self.fail_read.load(Ordering::SeqCst) {
            return Err(broken());
        }
        self.inner.registry_top(limit).await
    }

    async fn health_check(&self) -> ApiResult<()> {
        if self.fail_read.load(Ordering::SeqCst) {
            return Err(broken());
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}
