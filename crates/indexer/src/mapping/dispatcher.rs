//! Routes decoded pool events through the mapping sequence.

use anyhow::{Context, Result};
use tracing::debug;

use poolscan_core::{AccountId, EventId, PoolEvent};

use super::{apply_delta, get_or_register_account, record_event, ProvisionUpdate};
use crate::store::EntityStore;

/// Result of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleOutcome {
    /// Id of the log entry written
    pub event_id: EventId,

    /// Provider the event was attributed to
    pub provider: AccountId,

    /// Effect on the provider's liquidity provision
    pub provision: ProvisionUpdate,
}

/// Applies pool events to an [`EntityStore`], one at a time.
///
/// Callers must deliver events in block order (block number, then log
/// index) and await each `handle` before starting the next.
#[derive(Debug)]
pub struct EventDispatcher<S> {
    store: S,
}

impl<S: EntityStore> EventDispatcher<S> {
    /// Create a dispatcher writing to `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the dispatcher and return the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Handle a single event: resolve provider, log the event, update the
    /// provider's liquidity.
    ///
    /// Store failures are returned as errors; a removal for a provider with
    /// no liquidity record is not an error (see [`ProvisionUpdate`]).
    pub async fn handle(&self, event: &PoolEvent) -> Result<HandleOutcome> {
        let delta = event.delta();

        let provider = get_or_register_account(&self.store, event.provider()).await?;
        let record = record_event(&self.store, event, &provider).await?;
        let provision = apply_delta(&self.store, &provider.id, &delta)
            .await
            .with_context(|| format!("Failed to update liquidity for event {}", record.id()))?;

        debug!(
            event_id = %record.id(),
            provider = %provider.id,
            delta = %delta.signed(),
            "Handled {} event",
            event.kind()
        );

        Ok(HandleOutcome {
            event_id: record.id().clone(),
            provider: provider.id,
            provision,
        })
    }

    /// Handle events in the order given, stopping at the first store failure.
    pub async fn handle_all<'a, I>(&self, events: I) -> Result<Vec<HandleOutcome>>
    where
        I: IntoIterator<Item = &'a PoolEvent>,
    {
        let mut outcomes = Vec::new();
        for event in events {
            outcomes.push(self.handle(event).await?);
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::fixtures::{add, provenance, remove, remove_one, ErrorEvents};
    use crate::store::MemoryStore;
    use poolscan_core::{Address, BigInt, EventRecord};

    fn provider() -> Address {
        Address::repeat_byte(0xab)
    }

    async fn balance(dispatcher: &EventDispatcher<MemoryStore>) -> Option<BigInt> {
        dispatcher
            .store()
            .load_provision(&AccountId::from(provider()))
            .await
            .unwrap()
            .map(|p| p.amount)
    }

    #[tokio::test]
    async fn test_adds_accumulate() {
        let dispatcher = EventDispatcher::new(MemoryStore::new());
        let events = vec![
            add(provider(), &[1, 2, 3], provenance(1, 0)),
            add(provider(), &[100, 0, 0], provenance(2, 0)),
            add(provider(), &[0, 0, 7], provenance(2, 1)),
        ];

        dispatcher.handle_all(&events).await.unwrap();

        assert_eq!(balance(&dispatcher).await, Some(BigInt::from(113)));
        assert_eq!(dispatcher.store().event_count().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_add_then_remove() {
        let dispatcher = EventDispatcher::new(MemoryStore::new());

        dispatcher
            .handle(&add(provider(), &[50, 30, 20], provenance(1, 0)))
            .await
            .unwrap();
        dispatcher
            .handle(&remove(provider(), &[20, 10, 10], provenance(2, 0)))
            .await
            .unwrap();

        assert_eq!(balance(&dispatcher).await, Some(BigInt::from(60)));
    }

    #[tokio::test]
    async fn test_multi_token_add_on_empty_aggregate() {
        let dispatcher = EventDispatcher::new(MemoryStore::new());

        let outcome = dispatcher
            .handle(&add(provider(), &[10, 0, 5], provenance(1, 0)))
            .await
            .unwrap();

        assert_eq!(
            outcome.provision,
            ProvisionUpdate::Created {
                amount: BigInt::from(15)
            }
        );
        assert_eq!(balance(&dispatcher).await, Some(BigInt::from(15)));
    }

    #[tokio::test]
    async fn test_remove_one_debits_token_amount() {
        let dispatcher = EventDispatcher::new(MemoryStore::new());

        dispatcher
            .handle(&add(provider(), &[50, 0, 0], provenance(1, 0)))
            .await
            .unwrap();
        dispatcher
            .handle(&remove_one(provider(), 30, 29, provenance(2, 0)))
            .await
            .unwrap();

        assert_eq!(balance(&dispatcher).await, Some(BigInt::from(20)));
    }

    #[tokio::test]
    async fn test_removal_before_any_add() {
        let dispatcher = EventDispatcher::new(MemoryStore::new());

        for event in [
            remove(provider(), &[5, 5, 5], provenance(1, 0)),
            remove_one(provider(), 9, 8, provenance(1, 1)),
        ] {
            let outcome = dispatcher.handle(&event).await.unwrap();
            assert!(outcome.provision.is_anomaly());
            // Log entry is still written.
            assert!(dispatcher
                .store()
                .load_event(&outcome.event_id)
                .await
                .unwrap()
                .is_some());
        }
        assert_eq!(balance(&dispatcher).await, None);

        // Earlier debits are not applied retroactively.
        dispatcher
            .handle(&add(provider(), &[40, 0, 0], provenance(2, 0)))
            .await
            .unwrap();
        assert_eq!(balance(&dispatcher).await, Some(BigInt::from(40)));
    }

    #[tokio::test]
    async fn test_orphan_removal_reports_once() {
        let errors = ErrorEvents::default();
        let _guard = errors.install();
        let dispatcher = EventDispatcher::new(MemoryStore::new());

        dispatcher
            .handle(&remove_one(provider(), 9, 8, provenance(1, 0)))
            .await
            .unwrap();
        assert_eq!(errors.fields().len(), 1);
        assert!(errors.fields()[0].contains(&"provider"));

        dispatcher
            .handle(&add(provider(), &[40, 0, 0], provenance(2, 0)))
            .await
            .unwrap();
        dispatcher
            .handle(&remove(provider(), &[10, 0, 0], provenance(3, 0)))
            .await
            .unwrap();
        assert_eq!(errors.fields().len(), 1);
    }

    #[tokio::test]
    async fn test_same_provider_across_events() {
        let dispatcher = EventDispatcher::new(MemoryStore::new());

        let first = dispatcher
            .handle(&add(provider(), &[1, 1, 1], provenance(1, 0)))
            .await
            .unwrap();
        let second = dispatcher
            .handle(&remove_one(provider(), 1, 1, provenance(3, 4)))
            .await
            .unwrap();

        assert_eq!(first.provider, second.provider);
        assert_eq!(dispatcher.store().account_count().unwrap(), 1);

        let records = dispatcher.store().events().unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.provider() == &first.provider));
    }

    #[tokio::test]
    async fn test_event_ids() {
        let dispatcher = EventDispatcher::new(MemoryStore::new());
        let event = add(provider(), &[1, 0, 0], provenance(9, 2));

        let first = dispatcher.handle(&event).await.unwrap();
        let replay = dispatcher.handle(&event).await.unwrap();
        let next_log = dispatcher
            .handle(&add(provider(), &[1, 0, 0], provenance(9, 3)))
            .await
            .unwrap();

        assert_eq!(first.event_id, replay.event_id);
        assert_ne!(first.event_id, next_log.event_id);
        assert!(first.event_id.as_str().starts_with("al-0x0909"));
        assert!(first.event_id.as_str().ends_with("-2"));

        let Some(EventRecord::AddLiquidity(record)) = dispatcher
            .store()
            .load_event(&first.event_id)
            .await
            .unwrap()
        else {
            panic!("expected AddLiquidity entry");
        };
        assert_eq!(record.block, 9);
        assert_eq!(record.invariant, poolscan_core::U256::from(1_000_000u64));
    }
}
