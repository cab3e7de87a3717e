//! Operative storage.
//!
//! [`OperativeStore`] is the seam between the handlers and persistence. Two
//! implementations exist: [`crate::db::DbClient`] over PostgreSQL and
//! [`InMemoryStore`] for development and tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use kitaro_core::{new_operative_id, registry_order, NewOperative, Operative, RegistryEntry};
use tokio::sync::RwLock;

use crate::error::{ApiError, ApiResult};

/// Persistence operations the registry needs.
///
/// The insert and the referral increment are separate calls. Nothing ties
/// them into a transaction.
#[async_trait]
pub trait OperativeStore: Send + Sync {
    /// Insert a new operative with `referrals = 0`.
    ///
    /// Fails with `ALREADY_REGISTERED` when the handle or the wallet is taken.
    async fn operative_insert(&self, new: NewOperative) -> ApiResult<Operative>;

    /// Add one to the referral counter of the operative whose handle is
    /// exactly `handle`. Returns the number of rows changed (0 or 1).
    async fn referral_increment(&self, handle: &str) -> ApiResult<u64>;

    /// Leaderboard: at most `limit` rows, referrals descending then
    /// earliest registration first.
    async fn registry_top(&self, limit: usize) -> ApiResult<Vec<RegistryEntry>>;

    /// Cheap connectivity probe for readiness checks.
    async fn health_check(&self) -> ApiResult<()>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Shared handle to the configured store.
pub type SharedStore = Arc<dyn OperativeStore>;

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Process-local store behind a single `RwLock`.
///
/// Uniqueness is checked and the row pushed under one write lock, so the
/// constraints hold under concurrent registrations.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    operatives: Arc<RwLock<Vec<Operative>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.operatives.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.operatives.read().await.is_empty()
    }

    /// Look up an operative by exact handle.
    pub async fn get_by_handle(&self, handle: &str) -> Option<Operative> {
        self.operatives
            .read()
            .await
            .iter()
            .find(|op| op.x_handle == handle)
            .cloned()
    }
}

#[async_trait]
impl OperativeStore for InMemoryStore {
    async fn operative_insert(&self, new: NewOperative) -> ApiResult<Operative> {
        let mut operatives = self.operatives.write().await;

        let taken = operatives
            .iter()
            .any(|op| op.x_handle == new.x_handle || op.evm_wallet == new.evm_wallet);
        if taken {
            return Err(ApiError::already_registered());
        }

        let operative = new.into_operative(new_operative_id(), Utc::now());
        operatives.push(operative.clone());
        Ok(operative)
    }

    async fn referral_increment(&self, handle: &str) -> ApiResult<u64> {
        let mut operatives = self.operatives.write().await;
        match operatives.iter_mut().find(|op| op.x_handle == handle) {
            Some(op) => {
                op.referrals = op.referrals.saturating_add(1);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn registry_top(&self, limit: usize) -> ApiResult<Vec<RegistryEntry>> {
        let operatives = self.operatives.read().await;
        let mut entries: Vec<RegistryEntry> = operatives.iter().map(RegistryEntry::from).collect();
        entries.sort_by(registry_order);
        entries.truncate(limit);
        Ok(entries)
    }

    async fn health_check(&self) -> ApiResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use kitaro_test_utils::fixtures::new_operative;

    #[tokio::test]
    async fn test_insert_starts_at_zero() -> ApiResult<()> {
        let store = InMemoryStore::new();
        let op = store.operative_insert(new_operative("kitaro", 1)).await?;
        assert_eq!(op.referrals, 0);
        assert_eq!(store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_handle_or_wallet_rejected() -> ApiResult<()> {
        let store = InMemoryStore::new();
        store.operative_insert(new_operative("kitaro", 1)).await?;

        let same_handle = store.operative_insert(new_operative("kitaro", 2)).await;
        assert_eq!(same_handle.map_err(|e| e.code), Err(ErrorCode::AlreadyRegistered));

        let same_wallet = store.operative_insert(new_operative("other", 1)).await;
        assert_eq!(same_wallet.map_err(|e| e.code), Err(ErrorCode::AlreadyRegistered));

        assert_eq!(store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_referral_increment_exact_match() -> ApiResult<()> {
        let store = InMemoryStore::new();
        store.operative_insert(new_operative("kitaro", 1)).await?;

        assert_eq!(store.referral_increment("@kitaro").await?, 1);
        assert_eq!(store.referral_increment("kitaro").await?, 0);
        assert_eq!(store.referral_increment("@KITARO").await?, 0);

        let op = store.get_by_handle("@kitaro").await;
        assert_eq!(op.map(|o| o.referrals), Some(1));
        Ok(())
    }

    #[tokio::test]
    async fn test_registry_top_caps_and_orders() -> ApiResult<()> {
        let store = InMemoryStore::new();
        for n in 0..5 {
            store
                .operative_insert(new_operative(&format!("op{}", n), n))
                .await?;
        }
        store.referral_increment("@op3").await?;

        let top = store.registry_top(3).await?;
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].x_handle, "@op3");
        assert_eq!(top[1].x_handle, "@op0");
        Ok(())
    }
}
