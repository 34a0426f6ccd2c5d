//! Core types for poolscan.

use alloy_primitives::{hex, Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Account identity: a chain address rendered as canonical lowercase hex.
///
/// Alloy's `Display` for `Address` is EIP-55 checksummed, so every place that
/// needs the string form of an account goes through [`AccountId::to_hex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub Address);

impl AccountId {
    /// Create a new AccountId from an address.
    pub const fn new(address: Address) -> Self {
        AccountId(address)
    }

    /// Get the inner address.
    pub const fn address(&self) -> &Address {
        &self.0
    }

    /// Lowercase, `0x`-prefixed hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl From<Address> for AccountId {
    fn from(address: Address) -> Self {
        AccountId(address)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for AccountId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<Address>()
            .map(AccountId)
            .map_err(|_| CoreError::InvalidAddress(s.to_string()))
    }
}

/// The three pool event kinds the indexer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Liquidity deposited in one or more coins.
    AddLiquidity,

    /// Liquidity withdrawn proportionally in all coins.
    RemoveLiquidity,

    /// Liquidity withdrawn in a single coin.
    RemoveLiquidityOne,
}

impl EventKind {
    /// Prefix used when building event ids.
    pub const fn prefix(&self) -> &'static str {
        match self {
            EventKind::AddLiquidity => "al",
            EventKind::RemoveLiquidity => "rl",
            EventKind::RemoveLiquidityOne => "rlo",
        }
    }

    /// Look up a kind from its id prefix.
    pub fn from_prefix(prefix: &str) -> Result<Self, CoreError> {
        match prefix {
            "al" => Ok(EventKind::AddLiquidity),
            "rl" => Ok(EventKind::RemoveLiquidity),
            "rlo" => Ok(EventKind::RemoveLiquidityOne),
            other => Err(CoreError::UnknownEventKind(other.to_string())),
        }
    }

    /// Convert to database string representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventKind::AddLiquidity => "add_liquidity",
            EventKind::RemoveLiquidity => "remove_liquidity",
            EventKind::RemoveLiquidityOne => "remove_liquidity_one",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add_liquidity" => Ok(EventKind::AddLiquidity),
            "remove_liquidity" => Ok(EventKind::RemoveLiquidity),
            "remove_liquidity_one" => Ok(EventKind::RemoveLiquidityOne),
            other => Err(CoreError::UnknownEventKind(other.to_string())),
        }
    }
}

/// Where an event was observed on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Provenance {
    /// Block number
    pub block_number: u64,

    /// Block timestamp (unix seconds)
    pub block_timestamp: u64,

    /// Transaction hash
    pub tx_hash: B256,

    /// Log index within the block
    pub log_index: u64,
}

impl Provenance {
    /// Create new provenance.
    pub fn new(block_number: u64, block_timestamp: u64, tx_hash: B256, log_index: u64) -> Self {
        Self {
            block_number,
            block_timestamp,
            tx_hash,
            log_index,
        }
    }

    /// Canonical delivery order: block number, then log index.
    pub fn ordering_key(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }
}
