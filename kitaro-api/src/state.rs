//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{ApiConfig, StoreKind};
use crate::db::{DbClient, DbConfig};
use crate::error::ApiResult;
use crate::store::{InMemoryStore, SharedStore};

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Operative store (PostgreSQL or in-memory).
    pub store: SharedStore,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            start_time: Instant::now(),
        }
    }

    /// State over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    /// Build the store selected by `config.store`.
    ///
    /// The PostgreSQL path also runs the idempotent schema migration.
    pub async fn from_config(config: &ApiConfig, db_config: &DbConfig) -> ApiResult<Self> {
        let store: SharedStore = match config.store {
            StoreKind::Memory => {
                tracing::warn!("Using in-memory store; registrations are lost on restart");
                Arc::new(InMemoryStore::new())
            }
            StoreKind::Postgres => {
                let db = DbClient::from_config(db_config)?;
                db.migrate().await?;
                Arc::new(db)
            }
        };
        tracing::info!(backend = store.backend(), "Operative store ready");
        Ok(Self::new(store))
    }
}
