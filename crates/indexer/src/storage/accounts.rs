//! Account storage operations.

use super::Storage;
use anyhow::{Context, Result};
use poolscan_core::{Account, AccountId};
use sqlx::{Executor, Sqlite};

pub(super) async fn upsert_account<'e, E>(executor: E, account: &Account) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT INTO accounts (id) VALUES (?) ON CONFLICT(id) DO NOTHING")
        .bind(account.id.to_hex())
        .execute(executor)
        .await
        .context("Failed to upsert account")?;

    Ok(())
}

pub(super) async fn get_account<'e, E>(executor: E, id: &AccountId) -> Result<Option<Account>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<String> = sqlx::query_scalar("SELECT id FROM accounts WHERE id = ?")
        .bind(id.to_hex())
        .fetch_optional(executor)
        .await
        .context("Failed to fetch account")?;

    match row {
        Some(id) => Ok(Some(Account::new(id.parse()?))),
        None => Ok(None),
    }
}

impl Storage {
    /// Insert an account if it is not already registered.
    pub async fn upsert_account(&self, account: &Account) -> Result<()> {
        upsert_account(&self.pool, account).await
    }

    /// Get an account by address.
    pub async fn get_account(&self, id: &AccountId) -> Result<Option<Account>> {
        get_account(&self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::setup_storage;
    use super::*;
    use poolscan_core::Address;

    #[tokio::test]
    async fn test_account_operations() {
        let (storage, _temp_db) = setup_storage().await;
        let account = Account::new(AccountId::from(Address::repeat_byte(0xcd)));

        assert!(storage.get_account(&account.id).await.unwrap().is_none());

        storage.upsert_account(&account).await.unwrap();
        storage.upsert_account(&account).await.unwrap();

        assert_eq!(storage.get_account(&account.id).await.unwrap(), Some(account));
        assert_eq!(storage.stats().await.unwrap().account_count, 1);

        storage.close().await;
    }
}
