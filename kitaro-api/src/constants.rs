//! Constants for the KITARO API
//!
//! Public messages are fixed strings; clients match on them.

// ============================================================================
// RESPONSE MESSAGES
// ============================================================================

/// Body message for a successful registration.
pub const MSG_REGISTERED: &str = "Operative successfully registered.";

/// Uniqueness conflict on handle or wallet.
pub const MSG_ALREADY_REGISTERED: &str = "Handle or Wallet already exists in the registry.";

/// Any registration failure that is not the caller's fault.
pub const MSG_INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Leaderboard read failed.
pub const MSG_REGISTRY_FETCH_FAILED: &str = "Failed to fetch registry logs.";

pub const MSG_METHOD_NOT_ALLOWED: &str = "Method Not Allowed";

// ============================================================================
// STORAGE
// ============================================================================

/// Table holding one row per registered operative.
pub const OPERATIVES_TABLE: &str = "megakitaro_operatives";

/// Default PostgreSQL pool size.
pub const DEFAULT_DB_POOL_SIZE: usize = 16;

/// Default pool acquisition timeout in seconds.
pub const DEFAULT_DB_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// SERVER
// ============================================================================

pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 3000;
