//! Account registration.

use anyhow::{Context, Result};
use tracing::debug;

use poolscan_core::{Account, AccountId, Address};

use crate::store::EntityStore;

/// Return the account for `address`, registering it on first sight.
///
/// Safe to call repeatedly: an existing account is returned untouched.
pub async fn get_or_register_account<S: EntityStore>(store: &S, address: Address) -> Result<Account> {
    let id = AccountId::from(address);

    if let Some(account) = store
        .load_account(&id)
        .await
        .with_context(|| format!("Failed to load account {id}"))?
    {
        return Ok(account);
    }

    let account = Account::new(id);
    store
        .save_account(&account)
        .await
        .with_context(|| format!("Failed to register account {id}"))?;

    debug!(account = %id, "Registered new account");

    Ok(account)
}
