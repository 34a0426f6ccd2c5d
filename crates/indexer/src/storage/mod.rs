//! Storage layer for the poolscan indexer.
//!
//! This module provides database operations for:
//! - Accounts (one row per provider address)
//! - Event log entries (one table per event kind, write-once by id)
//! - Liquidity provisions (running balance per provider)
//! - Sync state (indexer progress tracking)
//!
//! Writes for a block range go through a [`StorageTransaction`].

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use poolscan_core::{Account, AccountId, EventId, EventRecord, LiquidityProvision};

use crate::store::EntityStore;

pub mod accounts;
mod codec;
pub mod events;
pub mod provisions;
pub mod sync;
pub mod transaction;
pub mod types;

pub use transaction::StorageTransaction;
pub use types::*;

/// Database storage for the indexer.
///
/// Provides async access to SQLite database with connection pooling.
#[derive(Debug, Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    /// Create a new storage instance with the given database URL.
    ///
    /// This will create the database file if it doesn't exist. Call
    /// [`Storage::run_migrations`] before use.
    ///
    /// # Arguments
    /// * `database_url` - SQLite database URL (e.g., "sqlite://poolscan.db")
    /// * `max_connections` - Pool upper bound (default 5)
    /// * `min_connections` - Pool lower bound (default 1)
    ///
    /// # Example
    /// ```no_run
    /// # use poolscan_indexer::storage::Storage;
    /// # async fn example() -> anyhow::Result<()> {
    /// let storage = Storage::new("sqlite://poolscan.db", None, None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(
        database_url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self> {
        info!("Connecting to database: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.unwrap_or(5))
            .min_connections(min_connections.unwrap_or(1))
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        info!("Database connection established");

        Ok(Self { pool })
    }

    /// Create a new storage instance with a specific file path.
    pub async fn new_with_path<P: AsRef<Path>>(
        path: P,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self> {
        let database_url = format!("sqlite://{}", path.as_ref().display());
        Self::new(&database_url, max_connections, min_connections).await
    }

    /// Run database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");

        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run migrations")?;

        info!("Migrations completed successfully");

        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        info!("Closing database connection");
        self.pool.close().await;
    }

    /// Get database statistics.
    pub async fn stats(&self) -> Result<DatabaseStats> {
        let account_count = self.count("accounts").await?;
        let add_liquidity_count = self.count("add_liquidity_events").await?;
        let remove_liquidity_count = self.count("remove_liquidity_events").await?;
        let remove_liquidity_one_count = self.count("remove_liquidity_one_events").await?;
        let provision_count = self.count("liquidity_provisions").await?;

        let sync_state = self.get_sync_state().await?;

        Ok(DatabaseStats {
            account_count,
            add_liquidity_count,
            remove_liquidity_count,
            remove_liquidity_one_count,
            provision_count,
            last_block_number: sync_state.last_block_number,
        })
    }

    async fn count(&self, table: &'static str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count {table}"))?;
        Ok(count as u64)
    }

    /// Check database health.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database health check failed")?;

        Ok(())
    }
}

impl EntityStore for Storage {
    async fn load_account(&self, id: &AccountId) -> Result<Option<Account>> {
        self.get_account(id).await
    }

    async fn save_account(&self, account: &Account) -> Result<()> {
        self.upsert_account(account).await
    }

    async fn load_event(&self, id: &EventId) -> Result<Option<EventRecord>> {
        self.get_event(id).await
    }

    async fn save_event(&self, record: &EventRecord) -> Result<()> {
        self.upsert_event(record).await
    }

    async fn load_provision(&self, account: &AccountId) -> Result<Option<LiquidityProvision>> {
        self.get_provision(account).await
    }

    async fn save_provision(&self, provision: &LiquidityProvision) -> Result<()> {
        self.upsert_provision(provision).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Storage;
    use tempfile::NamedTempFile;

    pub async fn setup_storage() -> (Storage, NamedTempFile) {
        let temp_db = NamedTempFile::new().unwrap();
        let storage = Storage::new_with_path(temp_db.path(), None, None)
            .await
            .unwrap();
        storage.run_migrations().await.unwrap();
        (storage, temp_db)
    }
}
