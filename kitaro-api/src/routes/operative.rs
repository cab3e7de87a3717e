//! Operative Registration Route
//!
//! `POST /api/v1/operatives` inserts one operative and, when a referrer is
//! named, credits that referrer. The two writes are sequential and not
//! atomic: once the insert succeeds the registration stands even if the
//! referral update fails.
//!
//! The body is decoded as JSON whatever the `Content-Type`; browser clients
//! post a bare string body, which arrives as `text/plain`.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};

use crate::{
    constants::MSG_INTERNAL_SERVER_ERROR,
    error::{method_not_allowed, ApiError, ApiResult, ErrorCode},
    state::AppState,
    store::OperativeStore,
    telemetry::metrics::{record_referral_increment, record_registration, RegistrationOutcome},
    types::{RegisterOperativeRequest, RegisterOperativeResponse},
    validation::validate_registration,
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/operatives - Register an operative
#[utoipa::path(
    post,
    path = "/api/v1/operatives",
    tag = "Operatives",
    request_body = RegisterOperativeRequest,
    responses(
        (status = 200, description = "Operative registered", body = RegisterOperativeResponse),
        (status = 400, description = "Invalid body, bad handle or wallet, or already registered", body = ApiError),
        (status = 405, description = "Method not allowed", body = ApiError),
        (status = 500, description = "Internal Server Error", body = ApiError),
    ),
)]
pub async fn register_operative(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<RegisterOperativeResponse>> {
    let new = serde_json::from_slice::<RegisterOperativeRequest>(&body)
        .map_err(ApiError::from)
        .and_then(validate_registration)
        .inspect_err(|e| {
            tracing::info!(error = %e, "Registration rejected");
            record_registration(RegistrationOutcome::Invalid);
        })?;

    let referrer = new.referrer_handle.clone();

    let operative = match state.store.operative_insert(new).await {
        Ok(operative) => operative,
        Err(e) if e.code == ErrorCode::AlreadyRegistered => {
            tracing::info!("Duplicate handle or wallet");
            record_registration(RegistrationOutcome::Duplicate);
            return Err(e);
        }
        Err(e) => {
            tracing::error!(error = %e, "Operative insert failed");
            record_registration(RegistrationOutcome::Failed);
            return Err(e.mask_server_error(MSG_INTERNAL_SERVER_ERROR));
        }
    };

    tracing::info!(
        operative_id = %operative.id,
        x_handle = %operative.x_handle,
        referred = referrer.is_some(),
        "Operative registered"
    );

    if let Some(referrer) = referrer {
        credit_referrer(state.store.as_ref(), &referrer).await;
    }

    record_registration(RegistrationOutcome::Registered);
    Ok(Json(RegisterOperativeResponse::registered()))
}

/// Add one referral to `referrer`. An unknown handle is a no-op and a store
/// failure is logged and dropped.
async fn credit_referrer(store: &dyn OperativeStore, referrer: &str) {
    match store.referral_increment(referrer).await {
        Ok(0) => {
            tracing::debug!(referrer, "Referrer not in registry; nothing credited");
            record_referral_increment(Some(false));
        }
        Ok(_) => {
            tracing::debug!(referrer, "Referral credited");
            record_referral_increment(Some(true));
        }
        Err(e) => {
            tracing::warn!(referrer, error = %e, "Referral increment failed after insert");
            record_referral_increment(None);
        }
    }
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new().route(
        "/",
        post(register_operative).fallback(method_not_allowed),
    )
}
