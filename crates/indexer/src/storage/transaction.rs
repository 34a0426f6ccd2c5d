//! Range-scoped write transaction.
//!
//! Every write a block range produces goes through one
//! [`StorageTransaction`], together with the sync state advance. Nothing is
//! visible until [`StorageTransaction::commit`]; dropping it rolls back.

use anyhow::{Context, Result};
use sqlx::{Sqlite, Transaction};
use tokio::sync::Mutex;

use poolscan_core::{Account, AccountId, EventId, EventRecord, LiquidityProvision};

use super::{accounts, events, provisions, sync, Storage};
use crate::store::EntityStore;

/// An open SQLite transaction usable as an [`EntityStore`].
#[derive(Debug)]
pub struct StorageTransaction {
    tx: Mutex<Transaction<'static, Sqlite>>,
}

impl Storage {
    /// Begin a write transaction.
    pub async fn begin(&self) -> Result<StorageTransaction> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        Ok(StorageTransaction { tx: Mutex::new(tx) })
    }
}

impl StorageTransaction {
    /// Record `block_number` as synced, effective on commit.
    pub async fn advance_sync_state(&self, block_number: u64) -> Result<()> {
        let mut tx = self.tx.lock().await;
        sync::advance_sync_state(&mut **tx, block_number).await
    }

    /// Commit every write made through this transaction.
    pub async fn commit(self) -> Result<()> {
        self.tx
            .into_inner()
            .commit()
            .await
            .context("Failed to commit transaction")
    }
}

impl EntityStore for StorageTransaction {
    async fn load_account(&self, id: &AccountId) -> Result<Option<Account>> {
        let mut tx = self.tx.lock().await;
        accounts::get_account(&mut **tx, id).await
    }

    async fn save_account(&self, account: &Account) -> Result<()> {
        let mut tx = self.tx.lock().await;
        accounts::upsert_account(&mut **tx, account).await
    }

    async fn load_event(&self, id: &EventId) -> Result<Option<EventRecord>> {
        let mut tx = self.tx.lock().await;
        events::get_event(&mut **tx, id).await
    }

    async fn save_event(&self, record: &EventRecord) -> Result<()> {
        let mut tx = self.tx.lock().await;
        events::upsert_event(&mut **tx, record).await
    }

    async fn load_provision(&self, account: &AccountId) -> Result<Option<LiquidityProvision>> {
        let mut tx = self.tx.lock().await;
        provisions::get_provision(&mut **tx, account).await
    }

    async fn save_provision(&self, provision: &LiquidityProvision) -> Result<()> {
        let mut tx = self.tx.lock().await;
        provisions::upsert_provision(&mut **tx, provision).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::setup_storage;
    use super::*;
    use poolscan_core::Address;

    #[tokio::test]
    async fn test_writes_invisible_until_commit() {
        let (storage, _temp_db) = setup_storage().await;
        let account = Account::new(AccountId::from(Address::repeat_byte(0x11)));

        let tx = storage.begin().await.unwrap();
        tx.save_account(&account).await.unwrap();
        assert!(tx.load_account(&account.id).await.unwrap().is_some());
        tx.advance_sync_state(42).await.unwrap();
        drop(tx);

        assert!(storage.get_account(&account.id).await.unwrap().is_none());
        assert_eq!(storage.get_sync_state().await.unwrap().last_block_number, 0);

        let tx = storage.begin().await.unwrap();
        tx.save_account(&account).await.unwrap();
        tx.advance_sync_state(42).await.unwrap();
        tx.commit().await.unwrap();

        assert!(storage.get_account(&account.id).await.unwrap().is_some());
        assert_eq!(storage.get_sync_state().await.unwrap().last_block_number, 42);

        storage.close().await;
    }
}
