//! Database types for the indexer storage layer.

/// Sync state record (singleton).
///
/// Tracks the indexer's progress through the blockchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    /// Last fully processed block number
    pub last_block_number: u64,

    /// Chain ID (for safety)
    pub chain_id: u64,

    /// Unix timestamp of last update
    pub updated_at: i64,
}

/// Database statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Registered accounts
    pub account_count: u64,

    /// AddLiquidity log entries
    pub add_liquidity_count: u64,

    /// RemoveLiquidity log entries
    pub remove_liquidity_count: u64,

    /// RemoveLiquidityOne log entries
    pub remove_liquidity_one_count: u64,

    /// Liquidity provisions
    pub provision_count: u64,

    /// Last processed block number
    pub last_block_number: u64,
}

impl DatabaseStats {
    /// Total event log entries across all kinds.
    pub fn event_count(&self) -> u64 {
        self.add_liquidity_count + self.remove_liquidity_count + self.remove_liquidity_one_count
    }
}
