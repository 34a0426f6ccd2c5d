//! Entity records persisted by the indexer.

use alloy_primitives::{B256, U256};
use num_bigint::BigInt;

use crate::identity::EventId;
use crate::types::{AccountId, EventKind};

/// A registered account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Account {
    /// Account identity (chain address)
    pub id: AccountId,
}

impl Account {
    /// Create a new account record.
    pub fn new(id: AccountId) -> Self {
        Self { id }
    }
}

/// Log entry for an `AddLiquidity` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityRecord {
    /// `al-<txHash>-<logIndex>`
    pub id: EventId,
    /// Provider account
    pub provider: AccountId,
    /// Amount deposited per coin
    pub token_amounts: Vec<U256>,
    /// Fee charged per coin
    pub fees: Vec<U256>,
    /// Pool invariant after the deposit
    pub invariant: U256,
    /// LP token supply after the deposit
    pub token_supply: U256,
    /// Block number
    pub block: u64,
    /// Block timestamp (unix seconds)
    pub timestamp: u64,
    /// Transaction hash
    pub transaction: B256,
}

/// Log entry for a `RemoveLiquidity` event.
///
/// The chain event carries no invariant, so neither does the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityRecord {
    /// `rl-<txHash>-<logIndex>`
    pub id: EventId,
    /// Provider account
    pub provider: AccountId,
    /// Amount withdrawn per coin
    pub token_amounts: Vec<U256>,
    /// Fee charged per coin
    pub fees: Vec<U256>,
    /// LP token supply after the withdrawal
    pub token_supply: U256,
    /// Block number
    pub block: u64,
    /// Block timestamp (unix seconds)
    pub timestamp: u64,
    /// Transaction hash
    pub transaction: B256,
}

/// Log entry for a `RemoveLiquidityOne` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityOneRecord {
    /// `rlo-<txHash>-<logIndex>`
    pub id: EventId,
    /// Provider account
    pub provider: AccountId,
    /// LP tokens burned
    pub token_amount: U256,
    /// Coins received
    pub coin_amount: U256,
    /// Block number
    pub block: u64,
    /// Block timestamp (unix seconds)
    pub timestamp: u64,
    /// Transaction hash
    pub transaction: B256,
}

/// Immutable log entry, one per observed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRecord {
    /// See [`AddLiquidityRecord`].
    AddLiquidity(AddLiquidityRecord),
    /// See [`RemoveLiquidityRecord`].
    RemoveLiquidity(RemoveLiquidityRecord),
    /// See [`RemoveLiquidityOneRecord`].
    RemoveLiquidityOne(RemoveLiquidityOneRecord),
}

impl EventRecord {
    /// Record id.
    pub fn id(&self) -> &EventId {
        match self {
            EventRecord::AddLiquidity(r) => &r.id,
            EventRecord::RemoveLiquidity(r) => &r.id,
            EventRecord::RemoveLiquidityOne(r) => &r.id,
        }
    }

    /// Event kind tag.
    pub fn kind(&self) -> EventKind {
        match self {
            EventRecord::AddLiquidity(_) => EventKind::AddLiquidity,
            EventRecord::RemoveLiquidity(_) => EventKind::RemoveLiquidity,
            EventRecord::RemoveLiquidityOne(_) => EventKind::RemoveLiquidityOne,
        }
    }

    /// Provider account reference.
    pub fn provider(&self) -> &AccountId {
        match self {
            EventRecord::AddLiquidity(r) => &r.provider,
            EventRecord::RemoveLiquidity(r) => &r.provider,
            EventRecord::RemoveLiquidityOne(r) => &r.provider,
        }
    }
}

/// Running liquidity balance of one provider.
///
/// Keyed by the provider's address; one record per account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityProvision {
    /// Provider account (also the record id)
    pub account: AccountId,

    /// Cumulative signed balance
    pub amount: BigInt,
}

impl LiquidityProvision {
    /// Create a provision with an opening balance.
    pub fn new(account: AccountId, amount: BigInt) -> Self {
        Self { account, amount }
    }
}
