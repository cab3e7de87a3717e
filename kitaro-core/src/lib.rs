//! KITARO Core - Registry Domain Types
//!
//! Pure data structures and transition logic with no I/O. The API server and
//! the terminal client both depend on this crate.
//!
//! - Operative records as stored in the registry
//! - Format validation for handles, post links and wallet addresses
//! - The five-step registration wizard as an explicit state machine
//! - The leaderboard display model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;
pub mod registry;
pub mod validation;
pub mod wizard;

pub use error::{ValidationError, WizardError};
pub use registry::{elide_wallet, RegistryRow, RegistryStatus, RegistryView};
pub use validation::{
    normalize_handle_input, normalize_referrer, referral_link, referrer_from_query,
    validate_evm_wallet, validate_status_link, validate_x_handle,
};
pub use wizard::{
    Effect, FormData, NotifyLevel, RegistrationPayload, SubmitFailure, TaskState, TaskStep,
    TaskUrls, TimerKind, WizardAction, WizardPhase, WizardState, WizardTimings,
};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Surrogate identifier for an operative row (UUIDv7, time-sortable).
pub type OperativeId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 operative identifier.
pub fn new_operative_id() -> OperativeId {
    Uuid::now_v7()
}

/// Maximum number of rows the leaderboard ever returns.
pub const LEADERBOARD_LIMIT: usize = 100;

// ============================================================================
// OPERATIVE
// ============================================================================

/// A registered campaign participant. One row per registrant.
///
/// `x_handle` and `evm_wallet` are unique across the registry. `referrals`
/// is a maintained counter that only ever grows; it is not recomputed from
/// the rows that name this operative as their referrer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Operative {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: OperativeId,
    pub x_handle: String,
    pub evm_wallet: String,
    pub comment_link: String,
    pub quote_link: String,
    pub referrer_handle: Option<String>,
    pub referrals: i32,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

/// Fields supplied by a registrant, already trimmed.
///
/// The store assigns `id`, `referrals` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOperative {
    pub x_handle: String,
    pub evm_wallet: String,
    pub comment_link: String,
    pub quote_link: String,
    pub referrer_handle: Option<String>,
}

impl NewOperative {
    /// Materialize the row the store would insert.
    pub fn into_operative(self, id: OperativeId, created_at: Timestamp) -> Operative {
        Operative {
            id,
            x_handle: self.x_handle,
            evm_wallet: self.evm_wallet,
            comment_link: self.comment_link,
            quote_link: self.quote_link,
            referrer_handle: self.referrer_handle,
            referrals: 0,
            created_at,
        }
    }
}

/// A leaderboard row as returned by the registry read path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegistryEntry {
    pub x_handle: String,
    pub evm_wallet: String,
    pub referrals: i32,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

impl From<&Operative> for RegistryEntry {
    fn from(op: &Operative) -> Self {
        Self {
            x_handle: op.x_handle.clone(),
            evm_wallet: op.evm_wallet.clone(),
            referrals: op.referrals,
            created_at: op.created_at,
        }
    }
}

/// Leaderboard ordering: referrals descending, earliest registrant first
/// among equal counts.
pub fn registry_order(a: &RegistryEntry, b: &RegistryEntry) -> std::cmp::Ordering {
    b.referrals
        .cmp(&a.referrals)
        .then_with(|| a.created_at.cmp(&b.created_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(handle: &str, referrals: i32, created_at: Timestamp) -> RegistryEntry {
        RegistryEntry {
            x_handle: handle.to_string(),
            evm_wallet: format!("0x{:0>40}", referrals),
            referrals,
            created_at,
        }
    }

    #[test]
    fn test_registry_order_breaks_ties_by_creation() {
        let t1 = Utc::now();
        let t2 = t1 + Duration::seconds(5);
        let mut rows = vec![
            entry("@late", 5, t2),
            entry("@low", 2, t1),
            entry("@early", 5, t1),
        ];
        rows.sort_by(registry_order);

        let handles: Vec<&str> = rows.iter().map(|r| r.x_handle.as_str()).collect();
        assert_eq!(handles, vec!["@early", "@late", "@low"]);
    }

    #[test]
    fn test_new_operative_starts_with_zero_referrals() {
        let new = NewOperative {
            x_handle: "@kitaro".to_string(),
            evm_wallet: format!("0x{}", "a".repeat(40)),
            comment_link: "https://x.com/kitaro/status/1".to_string(),
            quote_link: "https://x.com/kitaro/status/2".to_string(),
            referrer_handle: None,
        };
        let op = new.into_operative(new_operative_id(), Utc::now());
        assert_eq!(op.referrals, 0);
        assert_eq!(RegistryEntry::from(&op).x_handle, "@kitaro");
    }

    #[test]
    fn test_operative_ids_are_v7() {
        let id = new_operative_id();
        assert_eq!(id.get_version_num(), 7);
        assert_ne!(id, new_operative_id());
    }
}
