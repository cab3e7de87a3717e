//! Leaderboard display model.
//!
//! Ranks are assigned from the server ordering before any filtering, so a
//! search never renumbers rows.

use serde::{Deserialize, Serialize};

use crate::{RegistryEntry, Timestamp};

/// Ranks at or below this get the podium marker.
pub const PODIUM_RANKS: usize = 3;

/// Status label shown for every registered operative.
pub const VERIFIED_STATUS: &str = "VERIFIED";

/// Shown when nothing matches (or the registry is empty).
pub const EMPTY_MESSAGE: &str = "NO OPERATIVE FOUND IN REGISTRY";

/// Shorten a wallet to `0x12...9fa` form: first four characters, an ellipsis
/// and the last three. Short inputs are returned unchanged.
pub fn elide_wallet(wallet: &str) -> String {
    let chars: Vec<char> = wallet.chars().collect();
    if chars.len() <= 7 {
        return wallet.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{}...{}", head, tail)
}

/// One displayed leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRow {
    /// 1-based position in the server ordering.
    pub rank: usize,
    pub x_handle: String,
    pub evm_wallet: String,
    pub wallet_display: String,
    pub referrals: i32,
    pub created_at: Timestamp,
}

impl RegistryRow {
    pub fn from_entry(rank: usize, entry: RegistryEntry) -> Self {
        Self {
            rank,
            wallet_display: elide_wallet(&entry.evm_wallet),
            x_handle: entry.x_handle,
            evm_wallet: entry.evm_wallet,
            referrals: entry.referrals,
            created_at: entry.created_at,
        }
    }

    pub fn is_podium(&self) -> bool {
        self.rank <= PODIUM_RANKS
    }

    /// `#4` style label, or `None` for podium rows.
    pub fn rank_label(&self) -> Option<String> {
        (!self.is_podium()).then(|| format!("#{}", self.rank))
    }

    /// Case-insensitive substring match on handle or wallet. An empty needle
    /// matches everything.
    pub fn matches(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || self.x_handle.to_lowercase().contains(needle_lower)
            || self.evm_wallet.to_lowercase().contains(needle_lower)
            || self.wallet_display.to_lowercase().contains(needle_lower)
    }
}

/// Load status of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryStatus {
    Loading,
    Failed(String),
    Loaded,
}

/// Leaderboard with its search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryView {
    status: RegistryStatus,
    rows: Vec<RegistryRow>,
    query: String,
}

impl Default for RegistryView {
    fn default() -> Self {
        Self {
            status: RegistryStatus::Loading,
            rows: Vec::new(),
            query: String::new(),
        }
    }
}

impl RegistryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &RegistryStatus {
        &self.status
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    /// Mark a refresh in flight. Rows from the last load stay visible.
    pub fn begin_loading(&mut self) {
        self.status = RegistryStatus::Loading;
    }

    /// Replace the rows with a fresh server response, already ordered.
    pub fn load(&mut self, entries: Vec<RegistryEntry>) {
        self.rows = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| RegistryRow::from_entry(i + 1, entry))
            .collect();
        self.status = RegistryStatus::Loaded;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = RegistryStatus::Failed(message.into());
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
    }

    /// Rows matching the current query, in rank order.
    pub fn visible(&self) -> Vec<&RegistryRow> {
        let needle = self.query.trim().to_lowercase();
        self.rows.iter().filter(|row| row.matches(&needle)).collect()
    }
}
