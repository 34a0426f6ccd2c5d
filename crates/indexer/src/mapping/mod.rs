//! Event mapping: folds decoded pool events into store state.
//!
//! Each event runs the same fixed sequence:
//! 1. resolve (or register) the provider account
//! 2. write the immutable event log entry
//! 3. apply the signed delta to the provider's liquidity provision

pub mod accounts;
pub mod dispatcher;
pub mod event_log;
pub mod provision;

pub use accounts::get_or_register_account;
pub use dispatcher::{EventDispatcher, HandleOutcome};
pub use event_log::record_event;
pub use provision::{apply_delta, ProvisionUpdate};

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::subscriber::DefaultGuard;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use poolscan_core::{
        AddLiquidity, Address, PoolEvent, Provenance, RemoveLiquidity, RemoveLiquidityOne, B256,
        U256,
    };

    pub fn provenance(block_number: u64, log_index: u64) -> Provenance {
        Provenance::new(
            block_number,
            1_600_000_000 + block_number * 12,
            B256::repeat_byte(block_number as u8),
            log_index,
        )
    }

    pub fn amounts(values: &[u64]) -> Vec<U256> {
        values.iter().map(|v| U256::from(*v)).collect()
    }

    pub fn add(provider: Address, token_amounts: &[u64], provenance: Provenance) -> PoolEvent {
        PoolEvent::AddLiquidity(AddLiquidity {
            provider,
            token_amounts: amounts(token_amounts),
            fees: amounts(&vec![0; token_amounts.len()]),
            invariant: U256::from(1_000_000u64),
            token_supply: U256::from(900_000u64),
            provenance,
        })
    }

    pub fn remove(provider: Address, token_amounts: &[u64], provenance: Provenance) -> PoolEvent {
        PoolEvent::RemoveLiquidity(RemoveLiquidity {
            provider,
            token_amounts: amounts(token_amounts),
            fees: amounts(&vec![0; token_amounts.len()]),
            token_supply: U256::from(900_000u64),
            provenance,
        })
    }

    pub fn remove_one(
        provider: Address,
        token_amount: u64,
        coin_amount: u64,
        provenance: Provenance,
    ) -> PoolEvent {
        PoolEvent::RemoveLiquidityOne(RemoveLiquidityOne {
            provider,
            token_amount: U256::from(token_amount),
            coin_amount: U256::from(coin_amount),
            provenance,
        })
    }

    /// Field names of every ERROR event seen while installed.
    #[derive(Clone, Default)]
    pub struct ErrorEvents(Arc<Mutex<Vec<Vec<&'static str>>>>);

    impl ErrorEvents {
        /// Route this thread's tracing events here until the guard drops.
        pub fn install(&self) -> DefaultGuard {
            tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
        }

        pub fn fields(&self) -> Vec<Vec<&'static str>> {
            self.0.lock().unwrap().clone()
        }
    }

    struct FieldNames(Vec<&'static str>);

    impl Visit for FieldNames {
        fn record_debug(&mut self, field: &Field, _value: &dyn std::fmt::Debug) {
            self.0.push(field.name());
        }
    }

    impl<S: Subscriber> Layer<S> for ErrorEvents {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                let mut names = FieldNames(Vec::new());
                event.record(&mut names);
                self.0.lock().unwrap().push(names.0);
            }
        }
    }
}
