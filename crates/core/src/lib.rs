//! # poolscan core
//!
//! Domain types shared by the poolscan indexer: account and event identities,
//! decoded pool events, the records persisted for them, and the signed
//! liquidity deltas that drive the per-provider aggregate.
//!
//! Nothing in this crate performs I/O.
//!
//! ## Features
//!
//! - **Ethereum Types**: Uses Alloy primitives for Address, B256 and U256
//! - **Identity**: `<prefix>-<txHash>-<logIndex>` event ids
//! - **Arithmetic**: exact, unbounded sums of `uint256` amounts

#![warn(missing_docs)]

pub mod delta;
pub mod error;
pub mod events;
pub mod identity;
pub mod records;
pub mod types;

// Re-export commonly used items
pub use delta::{sum_amounts, u256_to_bigint, LiquidityDelta};
pub use error::{CoreError, Result};
pub use events::{AddLiquidity, PoolEvent, RemoveLiquidity, RemoveLiquidityOne};
pub use identity::EventId;
pub use records::{
    Account, AddLiquidityRecord, EventRecord, LiquidityProvision, RemoveLiquidityOneRecord,
    RemoveLiquidityRecord,
};
pub use types::*;

// Re-export Alloy primitives for convenience
pub use alloy_primitives::{Address, B256, U256};
pub use num_bigint::BigInt;
