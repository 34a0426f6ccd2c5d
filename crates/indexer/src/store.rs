//! Entity store interface used by the mapping layer.
//!
//! Every method is create-or-update by id (`save_*`) or a point lookup
//! (`load_*`). Errors are store failures and are fatal to the event stream.

use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use poolscan_core::{Account, AccountId, EventId, EventRecord, LiquidityProvision};

/// Persistent store for accounts, event log entries and liquidity provisions.
pub trait EntityStore {
    /// Load an account by address.
    fn load_account(
        &self,
        id: &AccountId,
    ) -> impl Future<Output = Result<Option<Account>>> + Send;

    /// Create or update an account.
    fn save_account(&self, account: &Account) -> impl Future<Output = Result<()>> + Send;

    /// Load an event log entry by id.
    fn load_event(&self, id: &EventId)
        -> impl Future<Output = Result<Option<EventRecord>>> + Send;

    /// Create or overwrite an event log entry.
    fn save_event(&self, record: &EventRecord) -> impl Future<Output = Result<()>> + Send;

    /// Load the liquidity provision of an account.
    fn load_provision(
        &self,
        account: &AccountId,
    ) -> impl Future<Output = Result<Option<LiquidityProvision>>> + Send;

    /// Create or update a liquidity provision.
    fn save_provision(
        &self,
        provision: &LiquidityProvision,
    ) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    events: BTreeMap<EventId, EventRecord>,
    provisions: HashMap<AccountId, LiquidityProvision>,
}

/// In-memory [`EntityStore`], used in tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }

    /// Number of registered accounts.
    pub fn account_count(&self) -> Result<usize> {
        Ok(self.tables()?.accounts.len())
    }

    /// Number of event log entries.
    pub fn event_count(&self) -> Result<usize> {
        Ok(self.tables()?.events.len())
    }

    /// Number of liquidity provisions.
    pub fn provision_count(&self) -> Result<usize> {
        Ok(self.tables()?.provisions.len())
    }

    /// All event log entries, ordered by id.
    pub fn events(&self) -> Result<Vec<EventRecord>> {
        Ok(self.tables()?.events.values().cloned().collect())
    }
}

impl EntityStore for MemoryStore {
    async fn load_account(&self, id: &AccountId) -> Result<Option<Account>> {
        Ok(self.tables()?.accounts.get(id).copied())
    }

    async fn save_account(&self, account: &Account) -> Result<()> {
        self.tables()?.accounts.insert(account.id, *account);
        Ok(())
    }

    async fn load_event(&self, id: &EventId) -> Result<Option<EventRecord>> {
        Ok(self.tables()?.events.get(id).cloned())
    }

    async fn save_event(&self, record: &EventRecord) -> Result<()> {
        self.tables()?
            .events
            .insert(record.id().clone(), record.clone());
        Ok(())
    }

    async fn load_provision(&self, account: &AccountId) -> Result<Option<LiquidityProvision>> {
        Ok(self.tables()?.provisions.get(account).cloned())
    }

    async fn save_provision(&self, provision: &LiquidityProvision) -> Result<()> {
        self.tables()?
            .provisions
            .insert(provision.account, provision.clone());
        Ok(())
    }
}
