//! Immutable event log.

use anyhow::{Context, Result};

use poolscan_core::{Account, EventRecord, PoolEvent};

use crate::store::EntityStore;

/// Write the log entry for `event`, attributed to `provider`.
///
/// The write is unconditional. Replaying the same chain log yields the same
/// id, so the store overwrites the earlier entry instead of duplicating it.
pub async fn record_event<S: EntityStore>(
    store: &S,
    event: &PoolEvent,
    provider: &Account,
) -> Result<EventRecord> {
    let record = event.to_record(provider.id);

    store
        .save_event(&record)
        .await
        .with_context(|| format!("Failed to save event {}", record.id()))?;

    Ok(record)
}
