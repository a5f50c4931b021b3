//! # Local Cache Store
//!
//! Durable on-device mirror of each remote collection plus the pending
//! mutation queue, backed by SQLite through sqlx.
//!
//! All operations are local and effectively synchronous from the caller's
//! perspective: no network, no meaningful latency. `upsert_*` replaces or
//! inserts by primary key; `insert_*_local` assumes the key is absent and
//! records the row as unsynced with its local identifier.
//!
//! ## Key Components
//!
//! - `schema.rs`: table definitions and migration bookkeeping
//! - `rt.rs`: neighborhood-unit cache operations
//! - `waste_types.rs`: waste-category cache operations
//! - `transactions.rs`: waste-deposit and savings cache operations
//! - `pending.rs`: pending-sync queue and dead-letter helpers

pub mod pending;
pub mod rt;
pub mod schema;
pub mod transactions;
pub mod waste_types;

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Result as SqlxResult, SqlitePool};

/// Result type for local cache operations
pub type Result<T> = SqlxResult<T>;

/// Local cache connection manager.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct LocalDatabase {
    pool: SqlitePool,
}

impl LocalDatabase {
    /// Open or create the cache database at the given path.
    ///
    /// Creates the file if it doesn't exist and initializes the schema.
    /// Uses WAL mode for better concurrency.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Self::from_pool(pool).await
    }

    /// Open an in-memory cache, used by tests and the demo path.
    ///
    /// The pool is capped at a single connection: each SQLite in-memory
    /// connection is its own database.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(sqlx::Error::from)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
        sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;
        sqlx::query("PRAGMA foreign_keys=ON").execute(&pool).await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Create all tables and run any pending migrations
    async fn init_schema(&self) -> Result<()> {
        for statement in schema::SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        self.run_migrations().await?;
        Ok(())
    }

    /// Record the schema version; migrations are additive only
    async fn run_migrations(&self) -> Result<()> {
        let current_version: (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;

        for version in schema::pending_migrations(current_version.0) {
            sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
                .bind(version)
                .bind(crate::model::now_rfc3339())
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    /// Connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Row counts per table, for status displays and debugging
    pub async fn stats(&self) -> Result<CacheStats> {
        let rt_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rt")
            .fetch_one(&self.pool)
            .await?;
        let waste_type_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM waste_types")
            .fetch_one(&self.pool)
            .await?;
        let waste_transaction_count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM waste_transactions")
                .fetch_one(&self.pool)
                .await?;
        let savings_transaction_count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM savings_transactions")
                .fetch_one(&self.pool)
                .await?;
        let pending_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pending_sync")
            .fetch_one(&self.pool)
            .await?;
        let dead_letter_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM dead_letter")
            .fetch_one(&self.pool)
            .await?;

        Ok(CacheStats {
            rt_count: rt_count.0 as u64,
            waste_type_count: waste_type_count.0 as u64,
            waste_transaction_count: waste_transaction_count.0 as u64,
            savings_transaction_count: savings_transaction_count.0 as u64,
            pending_count: pending_count.0 as u64,
            dead_letter_count: dead_letter_count.0 as u64,
        })
    }

    /// Remove every row from every table (reset / tests)
    pub async fn clear_all_data(&self) -> Result<()> {
        for table in [
            "rt",
            "waste_types",
            "waste_transactions",
            "savings_transactions",
            "pending_sync",
            "dead_letter",
        ] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}

/// Row counts of the local cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub rt_count: u64,
    pub waste_type_count: u64,
    pub waste_transaction_count: u64,
    pub savings_transaction_count: u64,
    pub pending_count: u64,
    pub dead_letter_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = LocalDatabase::open_in_memory().await;
        assert!(db.is_ok());
    }

    #[tokio::test]
    async fn test_fresh_cache_is_empty() {
        let db = LocalDatabase::open_in_memory().await.unwrap();
        let stats = db.stats().await.unwrap();
        assert_eq!(stats.rt_count, 0);
        assert_eq!(stats.pending_count, 0);
        assert_eq!(stats.dead_letter_count, 0);
    }

    #[tokio::test]
    async fn test_schema_version_recorded() {
        let db = LocalDatabase::open_in_memory().await.unwrap();
        let version: (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(version.0, schema::CURRENT_SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_open_file_backed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let db = LocalDatabase::open(&path).await.unwrap();
        let stats = db.stats().await.unwrap();
        assert_eq!(stats.rt_count, 0);
        assert!(path.exists());
    }
}
