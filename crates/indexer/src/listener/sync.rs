//! Sync engine for historical and live block processing.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::RpcProvider;
use crate::config::SyncConfig;
use crate::mapping::EventDispatcher;
use crate::storage::Storage;
use poolscan_core::PoolEvent;

/// Summary of one processed block range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// First block of the range
    pub from_block: u64,

    /// Last block of the range (now recorded as synced)
    pub to_block: u64,

    /// Events folded into the store
    pub events: usize,

    /// Removals that found no liquidity record
    pub anomalies: usize,
}

/// Compute the next inclusive block range to process, if any.
///
/// `last_synced` is the last fully processed block and `safe_block` the
/// newest block with enough confirmations.
pub fn next_range(last_synced: u64, safe_block: u64, batch_size: u64) -> Option<(u64, u64)> {
    if safe_block <= last_synced {
        return None;
    }
    let from = last_synced + 1;
    let to = last_synced.saturating_add(batch_size).min(safe_block);
    Some((from, to))
}

/// Apply one range of events and advance the sync state to `to_block`,
/// all in a single store transaction.
///
/// On error nothing from the range is kept, so retrying the range cannot
/// apply a provision delta twice.
pub async fn apply_range(
    storage: &Storage,
    events: &[PoolEvent],
    from_block: u64,
    to_block: u64,
) -> Result<BatchSummary> {
    let dispatcher = EventDispatcher::new(storage.begin().await?);

    let outcomes = dispatcher.handle_all(events).await.with_context(|| {
        format!(
            "Failed to apply events for blocks {} to {}",
            from_block, to_block
        )
    })?;

    let tx = dispatcher.into_store();
    tx.advance_sync_state(to_block).await?;
    tx.commit().await.with_context(|| {
        format!("Failed to commit blocks {} to {}", from_block, to_block)
    })?;

    let anomalies = outcomes
        .iter()
        .filter(|outcome| outcome.provision.is_anomaly())
        .count();
    if anomalies > 0 {
        warn!(
            "{} removal(s) without liquidity record in blocks {} to {}",
            anomalies, from_block, to_block
        );
    }

    Ok(BatchSummary {
        from_block,
        to_block,
        events: outcomes.len(),
        anomalies,
    })
}

/// Sync engine: pulls pool events block range by block range and feeds
/// them to the dispatcher in chain order.
pub struct SyncEngine {
    provider: RpcProvider,
    storage: Storage,
    config: SyncConfig,
}

impl SyncEngine {
    /// Create a new sync engine.
    pub fn new(provider: RpcProvider, storage: Storage, config: SyncConfig) -> Self {
        Self {
            provider,
            storage,
            config,
        }
    }

    /// Run the sync loop (historical + live).
    ///
    /// Runs until an RPC or store error occurs. Each range is committed
    /// together with its sync state, or not at all.
    pub async fn run(&self) -> Result<()> {
        info!("Sync engine starting...");

        loop {
            let sync_state = self.storage.get_sync_state().await?;
            let current_block = self.provider.get_block_number().await?;
            let safe_block = current_block.saturating_sub(self.config.confirmations);

            let last_synced = sync_state.last_block_number;

            debug!(
                "Sync status: last={}, current={}, safe={}, confirmations={}",
                last_synced, current_block, safe_block, self.config.confirmations
            );

            match next_range(last_synced, safe_block, self.config.batch_size) {
                Some((from, to)) => {
                    self.sync_range(from, to).await?;
                }
                None => {
                    debug!(
                        "Caught up, waiting {} seconds for new blocks...",
                        self.config.poll_interval_secs
                    );
                    tokio::time::sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
                }
            }
        }
    }

    /// Fetch, apply and commit one inclusive block range.
    pub async fn sync_range(&self, from: u64, to: u64) -> Result<BatchSummary> {
        let events = self
            .provider
            .get_events(from, to)
            .await
            .with_context(|| format!("Failed to fetch logs for blocks {} to {}", from, to))?;

        let summary = apply_range(&self.storage, &events, from, to).await?;

        info!(
            "Synced blocks {} to {}: {} events",
            summary.from_block, summary.to_block, summary.events
        );

        Ok(summary)
    }
}
