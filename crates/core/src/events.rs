//! Decoded pool events as delivered to the indexer.

use alloy_primitives::{Address, U256};

use crate::delta::{sum_amounts, u256_to_bigint, LiquidityDelta};
use crate::identity::EventId;
use crate::records::{
    AddLiquidityRecord, EventRecord, RemoveLiquidityOneRecord, RemoveLiquidityRecord,
};
use crate::types::{AccountId, EventKind, Provenance};

/// Liquidity deposited into the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidity {
    /// Depositing account
    pub provider: Address,

    /// Amount deposited per coin
    pub token_amounts: Vec<U256>,

    /// Fee charged per coin
    pub fees: Vec<U256>,

    /// Pool invariant after the deposit
    pub invariant: U256,

    /// LP token supply after the deposit
    pub token_supply: U256,

    /// Chain coordinates
    pub provenance: Provenance,
}

/// Liquidity withdrawn from the pool in all coins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidity {
    /// Withdrawing account
    pub provider: Address,

    /// Amount withdrawn per coin
    pub token_amounts: Vec<U256>,

    /// Fee charged per coin
    pub fees: Vec<U256>,

    /// LP token supply after the withdrawal
    pub token_supply: U256,

    /// Chain coordinates
    pub provenance: Provenance,
}

/// Liquidity withdrawn from the pool in a single coin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityOne {
    /// Withdrawing account
    pub provider: Address,

    /// LP tokens burned
    pub token_amount: U256,

    /// Coins received
    pub coin_amount: U256,

    /// Chain coordinates
    pub provenance: Provenance,
}

/// Any event the indexer handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    /// See [`AddLiquidity`].
    AddLiquidity(AddLiquidity),
    /// See [`RemoveLiquidity`].
    RemoveLiquidity(RemoveLiquidity),
    /// See [`RemoveLiquidityOne`].
    RemoveLiquidityOne(RemoveLiquidityOne),
}

impl PoolEvent {
    /// Event kind tag.
    pub fn kind(&self) -> EventKind {
        match self {
            PoolEvent::AddLiquidity(_) => EventKind::AddLiquidity,
            PoolEvent::RemoveLiquidity(_) => EventKind::RemoveLiquidity,
            PoolEvent::RemoveLiquidityOne(_) => EventKind::RemoveLiquidityOne,
        }
    }

    /// Account that added or removed liquidity.
    pub fn provider(&self) -> Address {
        match self {
            PoolEvent::AddLiquidity(e) => e.provider,
            PoolEvent::RemoveLiquidity(e) => e.provider,
            PoolEvent::RemoveLiquidityOne(e) => e.provider,
        }
    }

    /// Chain coordinates of the event.
    pub fn provenance(&self) -> &Provenance {
        match self {
            PoolEvent::AddLiquidity(e) => &e.provenance,
            PoolEvent::RemoveLiquidity(e) => &e.provenance,
            PoolEvent::RemoveLiquidityOne(e) => &e.provenance,
        }
    }

    /// Deterministic id of the log entry for this event.
    pub fn id(&self) -> EventId {
        let provenance = self.provenance();
        EventId::new(self.kind(), &provenance.tx_hash, provenance.log_index)
    }

    /// Balance change this event applies to its provider.
    ///
    /// Multi-coin events contribute the sum of all coin amounts. Single-coin
    /// withdrawals debit `token_amount`, never `coin_amount`.
    pub fn delta(&self) -> LiquidityDelta {
        match self {
            PoolEvent::AddLiquidity(e) => LiquidityDelta::Credit(sum_amounts(&e.token_amounts)),
            PoolEvent::RemoveLiquidity(e) => LiquidityDelta::Debit(sum_amounts(&e.token_amounts)),
            PoolEvent::RemoveLiquidityOne(e) => {
                LiquidityDelta::Debit(u256_to_bigint(&e.token_amount))
            }
        }
    }

    /// Build the immutable log record for this event.
    pub fn to_record(&self, provider: AccountId) -> EventRecord {
        let id = self.id();
        match self {
            PoolEvent::AddLiquidity(e) => EventRecord::AddLiquidity(AddLiquidityRecord {
                id,
                provider,
                token_amounts: e.token_amounts.clone(),
                fees: e.fees.clone(),
                invariant: e.invariant,
                token_supply: e.token_supply,
                block: e.provenance.block_number,
                timestamp: e.provenance.block_timestamp,
                transaction: e.provenance.tx_hash,
            }),
            PoolEvent::RemoveLiquidity(e) => EventRecord::RemoveLiquidity(RemoveLiquidityRecord {
                id,
                provider,
                token_amounts: e.token_amounts.clone(),
                fees: e.fees.clone(),
                token_supply: e.token_supply,
                block: e.provenance.block_number,
                timestamp: e.provenance.block_timestamp,
                transaction: e.provenance.tx_hash,
            }),
            PoolEvent::RemoveLiquidityOne(e) => {
                EventRecord::RemoveLiquidityOne(RemoveLiquidityOneRecord {
                    id,
                    provider,
                    token_amount: e.token_amount,
                    coin_amount: e.coin_amount,
                    block: e.provenance.block_number,
                    timestamp: e.provenance.block_timestamp,
                    transaction: e.provenance.tx_hash,
                })
            }
        }
    }
}

impl From<AddLiquidity> for PoolEvent {
    fn from(event: AddLiquidity) -> Self {
        PoolEvent::AddLiquidity(event)
    }
}

impl From<RemoveLiquidity> for PoolEvent {
    fn from(event: RemoveLiquidity) -> Self {
        PoolEvent::RemoveLiquidity(event)
    }
}

impl From<RemoveLiquidityOne> for PoolEvent {
    fn from(event: RemoveLiquidityOne) -> Self {
        PoolEvent::RemoveLiquidityOne(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;
    use num_bigint::BigInt;

    fn provenance(log_index: u64) -> Provenance {
        Provenance::new(100, 1_600_000_000, B256::repeat_byte(0xaa), log_index)
    }

    fn amounts(values: &[u64]) -> Vec<U256> {
        values.iter().map(|v| U256::from(*v)).collect()
    }

    #[test]
    fn test_add_liquidity_credits_sum_of_amounts() {
        let event = PoolEvent::from(AddLiquidity {
            provider: Address::repeat_byte(0x01),
            token_amounts: amounts(&[10, 0, 5]),
            fees: amounts(&[0, 0, 0]),
            invariant: U256::from(1000u64),
            token_supply: U256::from(900u64),
            provenance: provenance(1),
        });

        assert_eq!(event.kind(), EventKind::AddLiquidity);
        assert_eq!(event.delta(), LiquidityDelta::Credit(BigInt::from(15)));
    }

    #[test]
    fn test_remove_liquidity_one_debits_token_amount() {
        let event = PoolEvent::from(RemoveLiquidityOne {
            provider: Address::repeat_byte(0x01),
            token_amount: U256::from(30u64),
            coin_amount: U256::from(29u64),
            provenance: provenance(2),
        });

        assert_eq!(event.delta(), LiquidityDelta::Debit(BigInt::from(30)));
        assert_eq!(event.delta().signed(), BigInt::from(-30));
    }

    #[test]
    fn test_record_carries_payload_and_provenance() {
        let event = PoolEvent::from(RemoveLiquidity {
            provider: Address::repeat_byte(0x02),
            token_amounts: amounts(&[1, 2, 3]),
            fees: amounts(&[0, 1, 0]),
            token_supply: U256::from(77u64),
            provenance: provenance(9),
        });
        let provider = AccountId::from(Address::repeat_byte(0x02));

        let EventRecord::RemoveLiquidity(record) = event.to_record(provider) else {
            panic!("expected RemoveLiquidity record");
        };
        assert_eq!(record.id, event.id());
        assert!(record.id.as_str().starts_with("rl-0xaaaa"));
        assert!(record.id.as_str().ends_with("-9"));
        assert_eq!(record.provider, provider);
        assert_eq!(record.token_amounts, amounts(&[1, 2, 3]));
        assert_eq!(record.fees, amounts(&[0, 1, 0]));
        assert_eq!(record.token_supply, U256::from(77u64));
        assert_eq!(record.block, 100);
        assert_eq!(record.timestamp, 1_600_000_000);
        assert_eq!(record.transaction, B256::repeat_byte(0xaa));
    }
}
