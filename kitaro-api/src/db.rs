//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling via deadpool-postgres and the
//! [`OperativeStore`] implementation over the `megakitaro_operatives` table.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use kitaro_core::{new_operative_id, NewOperative, Operative, RegistryEntry};
use tokio_postgres::{NoTls, Row};

use crate::constants::{DEFAULT_DB_POOL_SIZE, DEFAULT_DB_TIMEOUT_SECS};
use crate::error::{ApiError, ApiResult};
use crate::store::OperativeStore;
use crate::telemetry::metrics::record_db_operation;

// ============================================================================
// SCHEMA
// ============================================================================

const MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS megakitaro_operatives (
    id              UUID PRIMARY KEY,
    x_handle        TEXT NOT NULL UNIQUE,
    evm_wallet      TEXT NOT NULL UNIQUE,
    comment_link    TEXT NOT NULL,
    quote_link      TEXT NOT NULL,
    referrer_handle TEXT,
    referrals       INTEGER NOT NULL DEFAULT 0,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS megakitaro_operatives_leaderboard_idx
    ON megakitaro_operatives (referrals DESC, created_at ASC);
"#;

const INSERT_OPERATIVE: &str = "INSERT INTO megakitaro_operatives \
     (id, x_handle, evm_wallet, comment_link, quote_link, referrer_handle) \
     VALUES ($1, $2, $3, $4, $5, $6) \
     RETURNING id, x_handle, evm_wallet, comment_link, quote_link, referrer_handle, \
               referrals, created_at";

const INCREMENT_REFERRALS: &str =
    "UPDATE megakitaro_operatives SET referrals = referrals + 1 WHERE x_handle = $1";

const SELECT_LEADERBOARD: &str = "SELECT x_handle, evm_wallet, referrals, created_at \
     FROM megakitaro_operatives \
     ORDER BY referrals DESC, created_at ASC \
     LIMIT $1";

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full connection string; wins over the discrete fields when set.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Pool acquisition timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            dbname: "kitaro".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: DEFAULT_DB_POOL_SIZE,
            timeout: Duration::from_secs(DEFAULT_DB_TIMEOUT_SECS),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    ///
    /// `DATABASE_URL` is honored first; otherwise `KITARO_DB_HOST`,
    /// `KITARO_DB_PORT`, `KITARO_DB_NAME`, `KITARO_DB_USER` and
    /// `KITARO_DB_PASSWORD` are used.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty()),
            host: std::env::var("KITARO_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("KITARO_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("KITARO_DB_NAME").unwrap_or_else(|_| "kitaro".to_string()),
            user: std::env::var("KITARO_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("KITARO_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("KITARO_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_DB_POOL_SIZE),
            timeout: Duration::from_secs(
                std::env::var("KITARO_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DB_TIMEOUT_SECS),
            ),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        match &self.url {
            Some(url) => cfg.url = Some(url.clone()),
            None => {
                cfg.host = Some(self.host.clone());
                cfg.port = Some(self.port);
                cfg.dbname = Some(self.dbname.clone());
                cfg.user = Some(self.user.clone());
                cfg.password = Some(self.password.clone());
            }
        }

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool_cfg = deadpool_postgres::PoolConfig::new(self.max_size);
        pool_cfg.timeouts.wait = Some(self.timeout);
        cfg.pool = Some(pool_cfg);

        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))
    }
}

// ============================================================================
// DATABASE CLIENT WRAPPER
// ============================================================================

/// PostgreSQL-backed operative store.
#[derive(Clone)]
pub struct DbClient {
    pool: Pool,
}

impl DbClient {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    async fn get_conn(&self) -> ApiResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// Create the operatives table and leaderboard index if missing.
    pub async fn migrate(&self) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(MIGRATION).await?;
        tracing::info!("Operative schema ready");
        Ok(())
    }

    fn operative_from_row(row: &Row) -> ApiResult<Operative> {
        Ok(Operative {
            id: row.try_get("id")?,
            x_handle: row.try_get("x_handle")?,
            evm_wallet: row.try_get("evm_wallet")?,
            comment_link: row.try_get("comment_link")?,
            quote_link: row.try_get("quote_link")?,
            referrer_handle: row.try_get("referrer_handle")?,
            referrals: row.try_get("referrals")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn entry_from_row(row: &Row) -> ApiResult<RegistryEntry> {
        Ok(RegistryEntry {
            x_handle: row.try_get("x_handle")?,
            evm_wallet: row.try_get("evm_wallet")?,
            referrals: row.try_get("referrals")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Record the outcome and latency of one store call.
fn observe<T>(operation: &str, start: Instant, result: &ApiResult<T>) {
    record_db_operation(operation, result.is_ok(), start.elapsed().as_secs_f64());
}

#[async_trait]
impl OperativeStore for DbClient {
    async fn operative_insert(&self, new: NewOperative) -> ApiResult<Operative> {
        let start = Instant::now();
        let result: ApiResult<Operative> = async {
            let conn = self.get_conn().await?;
            let row = conn
                .query_one(
                    INSERT_OPERATIVE,
                    &[
                        &new_operative_id(),
                        &new.x_handle,
                        &new.evm_wallet,
                        &new.comment_link,
                        &new.quote_link,
                        &new.referrer_handle,
                    ],
                )
                .await?;
            Self::operative_from_row(&row)
        }
        .await;
        observe("insert", start, &result);
        result
    }

    async fn referral_increment(&self, handle: &str) -> ApiResult<u64> {
        let start = Instant::now();
        let result: ApiResult<u64> = async {
            let conn = self.get_conn().await?;
            Ok::<_, ApiError>(conn.execute(INCREMENT_REFERRALS, &[&handle]).await?)
        }
        .await;
        observe("increment", start, &result);
        result
    }

    async fn registry_top(&self, limit: usize) -> ApiResult<Vec<RegistryEntry>> {
        let start = Instant::now();
        let result: ApiResult<Vec<RegistryEntry>> = async {
            let conn = self.get_conn().await?;
            let limit = i64::try_from(limit).unwrap_or(i64::MAX);
            let rows = conn.query(SELECT_LEADERBOARD, &[&limit]).await?;
            rows.iter().map(Self::entry_from_row).collect()
        }
        .await;
        observe("leaderboard", start, &result);
        result
    }

    async fn health_check(&self) -> ApiResult<()> {
        let conn = self.get_conn().await?;
        conn.query_one("SELECT 1", &[]).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_config() {
        let config = DbConfig::default();
        assert!(config.url.is_none());
        assert_eq!(config.port, 5432);
        assert_eq!(config.max_size, 16);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_statements_target_operatives_table() {
        use crate::constants::OPERATIVES_TABLE;
        for sql in [MIGRATION, INSERT_OPERATIVE, INCREMENT_REFERRALS, SELECT_LEADERBOARD] {
            assert!(sql.contains(OPERATIVES_TABLE));
        }
        assert!(SELECT_LEADERBOARD.contains("ORDER BY referrals DESC, created_at ASC"));
    }

    #[tokio::test]
    async fn test_pool_creation_is_lazy() -> ApiResult<()> {
        // deadpool connects on first checkout, so building a pool against an
        // unreachable host succeeds.
        let config = DbConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..Default::default()
        };
        let db = DbClient::from_config(&config)?;
        assert_eq!(db.pool_size(), 0);
        assert_eq!(db.backend(), "postgres");
        Ok(())
    }
}
