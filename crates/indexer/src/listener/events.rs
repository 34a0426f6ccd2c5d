//! Event bindings for the liquidity pool contract.

use alloy::primitives::B256;
use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::SolEvent;
use anyhow::{Context, Result};
use poolscan_core::{events as pool, PoolEvent, Provenance};

// Three-coin pool events, as emitted by the pool contract
sol! {
    /// Liquidity deposited in one or more coins.
    #[derive(Debug, PartialEq, Eq)]
    event AddLiquidity(
        address indexed provider,
        uint256[3] token_amounts,
        uint256[3] fees,
        uint256 invariant,
        uint256 token_supply
    );

    /// Liquidity withdrawn proportionally in all coins.
    #[derive(Debug, PartialEq, Eq)]
    event RemoveLiquidity(
        address indexed provider,
        uint256[3] token_amounts,
        uint256[3] fees,
        uint256 token_supply
    );

    /// Liquidity withdrawn in a single coin.
    #[derive(Debug, PartialEq, Eq)]
    event RemoveLiquidityOne(
        address indexed provider,
        uint256 token_amount,
        uint256 coin_amount
    );
}

/// Topic0 hashes of every event the indexer subscribes to.
pub fn event_signatures() -> Vec<B256> {
    vec![
        AddLiquidity::SIGNATURE_HASH,
        RemoveLiquidity::SIGNATURE_HASH,
        RemoveLiquidityOne::SIGNATURE_HASH,
    ]
}

/// Read the block coordinates of a log, except the timestamp.
///
/// Returns `(block_number, tx_hash, log_index)`.
pub fn log_coordinates(log: &Log) -> Result<(u64, B256, u64)> {
    let block_number = log.block_number.context("Log missing block_number")?;
    let tx_hash = log
        .transaction_hash
        .context("Log missing transaction_hash")?;
    let log_index = log.log_index.context("Log missing log_index")?;
    Ok((block_number, tx_hash, log_index))
}

/// Decode a pool log into a [`PoolEvent`].
///
/// `block_timestamp` is passed separately because not every node includes it
/// in `eth_getLogs` responses.
pub fn decode_pool_log(log: &Log, block_timestamp: u64) -> Result<PoolEvent> {
    let (block_number, tx_hash, log_index) = log_coordinates(log)?;
    let provenance = Provenance::new(block_number, block_timestamp, tx_hash, log_index);

    let topic0 = log.topics().first().copied().context("Log has no topics")?;

    if topic0 == AddLiquidity::SIGNATURE_HASH {
        let event = AddLiquidity::decode_log(log.as_ref(), true)
            .context("Failed to decode AddLiquidity event")?
            .data;
        Ok(PoolEvent::AddLiquidity(pool::AddLiquidity {
            provider: event.provider,
            token_amounts: event.token_amounts.to_vec(),
            fees: event.fees.to_vec(),
            invariant: event.invariant,
            token_supply: event.token_supply,
            provenance,
        }))
    } else if topic0 == RemoveLiquidity::SIGNATURE_HASH {
        let event = RemoveLiquidity::decode_log(log.as_ref(), true)
            .context("Failed to decode RemoveLiquidity event")?
            .data;
        Ok(PoolEvent::RemoveLiquidity(pool::RemoveLiquidity {
            provider: event.provider,
            token_amounts: event.token_amounts.to_vec(),
            fees: event.fees.to_vec(),
            token_supply: event.token_supply,
            provenance,
        }))
    } else if topic0 == RemoveLiquidityOne::SIGNATURE_HASH {
        let event = RemoveLiquidityOne::decode_log(log.as_ref(), true)
            .context("Failed to decode RemoveLiquidityOne event")?
            .data;
        Ok(PoolEvent::RemoveLiquidityOne(pool::RemoveLiquidityOne {
            provider: event.provider,
            token_amount: event.token_amount,
            coin_amount: event.coin_amount,
            provenance,
        }))
    } else {
        anyhow::bail!("Unrecognized event signature {topic0}")
    }
}
