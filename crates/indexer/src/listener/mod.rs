//! Event listener for the liquidity pool contract.
//!
//! This module provides:
//! - Solidity event bindings and log decoding
//! - RPC provider wrapper for Ethereum communication
//! - Sync engine for historical and live block processing

pub mod events;
pub mod provider;
pub mod sync;

pub use events::decode_pool_log;
pub use provider::RpcProvider;
pub use sync::{apply_range, BatchSummary, SyncEngine};
