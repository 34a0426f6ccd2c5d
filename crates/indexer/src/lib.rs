//! Liquidity pool event ingestion for poolscan.
//!
//! This crate provides:
//! - An event listener for the pool's AddLiquidity, RemoveLiquidity and
//!   RemoveLiquidityOne events
//! - The mapping layer that folds each event into an immutable event log
//!   and a running liquidity balance per provider
//! - SQLite storage for accounts, event logs, provisions and sync progress
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │  poolscan-indexer                │
//! │                                  │
//! │  ┌─────────────────┐             │
//! │  │  Event Listener │ ← Ethereum RPC (eth_getLogs)
//! │  │  (sync engine)  │             │
//! │  └────────┬────────┘             │
//! │           │ PoolEvent, chain order
//! │      ┌────▼────────────┐         │
//! │      │ EventDispatcher │         │
//! │      │ account → log → provision │
//! │      └────┬────────────┘         │
//! │           │ EntityStore          │
//! │      ┌────▼──────┐               │
//! │      │  Storage  │ ← SQLite      │
//! │      └───────────┘               │
//! └──────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod listener;
pub mod mapping;
pub mod storage;
pub mod store;

pub use mapping::{EventDispatcher, HandleOutcome, ProvisionUpdate};
pub use store::{EntityStore, MemoryStore};

// Re-export common types
pub use poolscan_core::*;
