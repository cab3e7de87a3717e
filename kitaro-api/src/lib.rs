//! MEGAKITARO Registry API
//!
//! Axum REST layer over an [`OperativeStore`]: operative registration with
//! referral crediting, and the top-100 referral leaderboard. PostgreSQL is
//! the production store; an in-memory store backs tests and local runs.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod validation;

pub use config::{resolve_bind_addr, ApiConfig, StoreKind};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::AppState;
pub use store::{InMemoryStore, OperativeStore, SharedStore};
pub use types::*;
