//! Request and response bodies for the REST API.

use serde::{Deserialize, Serialize};

use crate::constants::MSG_REGISTERED;

/// Registration body: `{ xHandle, commentLink, quoteLink, evmWallet, referrer }`.
pub use kitaro_core::RegistrationPayload as RegisterOperativeRequest;

/// Leaderboard row: `{ x_handle, evm_wallet, referrals, created_at }`.
pub use kitaro_core::RegistryEntry;

/// Body of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterOperativeResponse {
    pub message: String,
}

impl RegisterOperativeResponse {
    pub fn registered() -> Self {
        Self {
            message: MSG_REGISTERED.to_string(),
        }
    }
}
