//! Sync state storage operations.

use super::{Storage, SyncState};
use anyhow::{Context, Result};
use sqlx::{Executor, Row, Sqlite};

pub(super) async fn get_sync_state<'e, E>(executor: E) -> Result<SyncState>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
        SELECT last_block_number, chain_id, updated_at
        FROM sync_state
        WHERE id = 1
        "#,
    )
    .fetch_one(executor)
    .await
    .context("Failed to fetch sync state")?;

    Ok(SyncState {
        last_block_number: row.get::<i64, _>("last_block_number") as u64,
        chain_id: row.get::<i64, _>("chain_id") as u64,
        updated_at: row.get("updated_at"),
    })
}

pub(super) async fn update_sync_state<'e, E>(executor: E, state: &SyncState) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE sync_state
        SET last_block_number = ?,
            chain_id = ?,
            updated_at = ?
        WHERE id = 1
        "#,
    )
    .bind(state.last_block_number as i64)
    .bind(state.chain_id as i64)
    .bind(state.updated_at)
    .execute(executor)
    .await
    .context("Failed to update sync state")?;

    Ok(())
}

/// Set `last_block_number`, keeping the chain id.
pub(super) async fn advance_sync_state<'e, E>(executor: E, block_number: u64) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE sync_state SET last_block_number = ?, updated_at = ? WHERE id = 1")
        .bind(block_number as i64)
        .bind(chrono::Utc::now().timestamp())
        .execute(executor)
        .await
        .context("Failed to advance sync state")?;

    Ok(())
}

impl Storage {
    /// Get the current sync state.
    pub async fn get_sync_state(&self) -> Result<SyncState> {
        get_sync_state(&self.pool).await
    }

    /// Update the sync state.
    pub async fn update_sync_state(&self, state: &SyncState) -> Result<()> {
        update_sync_state(&self.pool, state).await
    }

    /// Record that every block up to and including `block_number` is processed.
    pub async fn advance_sync_state(&self, block_number: u64) -> Result<()> {
        advance_sync_state(&self.pool, block_number).await
    }

    /// Initialize sync state for a new chain.
    pub async fn initialize_sync_state(&self, chain_id: u64, start_block: u64) -> Result<()> {
        let state = SyncState {
            last_block_number: start_block,
            chain_id,
            updated_at: chrono::Utc::now().timestamp(),
        };

        self.update_sync_state(&state)
            .await
            .context("Failed to initialize sync state")
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::setup_storage;

    #[tokio::test]
    async fn test_sync_state_operations() {
        let (storage, _temp_db) = setup_storage().await;

        // Initial state is created by the migration
        let state = storage.get_sync_state().await.unwrap();
        assert_eq!(state.last_block_number, 0);
        assert_eq!(state.chain_id, 0);

        storage
            .initialize_sync_state(1, 10_809_472)
            .await
            .unwrap();

        let state = storage.get_sync_state().await.unwrap();
        assert_eq!(state.last_block_number, 10_809_472);
        assert_eq!(state.chain_id, 1);

        storage.advance_sync_state(10_809_500).await.unwrap();

        let state = storage.get_sync_state().await.unwrap();
        assert_eq!(state.last_block_number, 10_809_500);
        assert_eq!(state.chain_id, 1);
        assert!(state.updated_at > 0);

        storage.close().await;
    }
}
