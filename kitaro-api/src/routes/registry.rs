//! Leaderboard Route
//!
//! `GET /api/v1/registry` returns the top operatives by referral count.

use axum::{extract::State, routing::get, Json, Router};
use kitaro_core::LEADERBOARD_LIMIT;

use crate::{
    constants::MSG_REGISTRY_FETCH_FAILED,
    error::{method_not_allowed, ApiError, ApiResult},
    state::AppState,
    types::RegistryEntry,
};

/// GET /api/v1/registry - Top 100 operatives
#[utoipa::path(
    get,
    path = "/api/v1/registry",
    tag = "Registry",
    responses(
        (status = 200, description = "At most 100 rows, referrals descending then earliest first", body = Vec<RegistryEntry>),
        (status = 405, description = "Method not allowed", body = ApiError),
        (status = 500, description = "Failed to fetch registry logs.", body = ApiError),
    ),
)]
pub async fn list_registry(State(state): State<AppState>) -> ApiResult<Json<Vec<RegistryEntry>>> {
    let rows = state
        .store
        .registry_top(LEADERBOARD_LIMIT)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Leaderboard read failed");
            e.mask_server_error(MSG_REGISTRY_FETCH_FAILED)
        })?;

    tracing::debug!(rows = rows.len(), "Leaderboard served");
    Ok(Json(rows))
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(list_registry).fallback(method_not_allowed))
}
