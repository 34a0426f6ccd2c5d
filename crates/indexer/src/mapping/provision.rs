//! Per-provider liquidity aggregate.

use anyhow::{Context, Result};
use tracing::error;

use poolscan_core::{AccountId, BigInt, LiquidityDelta, LiquidityProvision};

use crate::store::EntityStore;

/// What [`apply_delta`] did to the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionUpdate {
    /// First credit for the provider; record opened with this balance.
    Created {
        /// Opening balance
        amount: BigInt,
    },

    /// Existing record adjusted.
    Updated {
        /// Balance before the delta
        previous: BigInt,
        /// Balance after the delta
        amount: BigInt,
    },

    /// Debit for a provider with no record. Nothing was written.
    MissingProvision,
}

impl ProvisionUpdate {
    /// Whether this update is the missing-provision anomaly.
    pub fn is_anomaly(&self) -> bool {
        matches!(self, ProvisionUpdate::MissingProvision)
    }
}

/// Apply a signed delta to `account`'s liquidity provision.
///
/// A credit for an unknown provider opens a new record. A debit for an
/// unknown provider is logged as an error and leaves the store unchanged; it
/// is not applied retroactively when the provider later deposits.
pub async fn apply_delta<S: EntityStore>(
    store: &S,
    account: &AccountId,
    delta: &LiquidityDelta,
) -> Result<ProvisionUpdate> {
    let existing = store
        .load_provision(account)
        .await
        .with_context(|| format!("Failed to load liquidity provision for {account}"))?;

    let (provision, update) = match existing {
        Some(mut provision) => {
            let previous = provision.amount.clone();
            provision.amount += delta.signed();
            let amount = provision.amount.clone();
            (provision, ProvisionUpdate::Updated { previous, amount })
        }
        None if delta.is_credit() => {
            let amount = delta.signed();
            (
                LiquidityProvision::new(*account, amount.clone()),
                ProvisionUpdate::Created { amount },
            )
        }
        None => {
            error!(
                provider = %account,
                amount = %delta.magnitude(),
                "Liquidity removed but no LiquidityProvision found"
            );
            return Ok(ProvisionUpdate::MissingProvision);
        }
    };

    store
        .save_provision(&provision)
        .await
        .with_context(|| format!("Failed to save liquidity provision for {account}"))?;

    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::fixtures::ErrorEvents;
    use crate::store::MemoryStore;
    use poolscan_core::Address;

    fn account() -> AccountId {
        AccountId::from(Address::repeat_byte(0x07))
    }

    #[tokio::test]
    async fn test_credit_creates_provision() {
        let store = MemoryStore::new();

        let update = apply_delta(&store, &account(), &LiquidityDelta::Credit(BigInt::from(100)))
            .await
            .unwrap();

        assert_eq!(
            update,
            ProvisionUpdate::Created {
                amount: BigInt::from(100)
            }
        );
        let provision = store.load_provision(&account()).await.unwrap().unwrap();
        assert_eq!(provision.account, account());
        assert_eq!(provision.amount, BigInt::from(100));
    }

    #[tokio::test]
    async fn test_debit_reduces_balance() {
        let store = MemoryStore::new();
        apply_delta(&store, &account(), &LiquidityDelta::Credit(BigInt::from(100)))
            .await
            .unwrap();

        let update = apply_delta(&store, &account(), &LiquidityDelta::Debit(BigInt::from(40)))
            .await
            .unwrap();

        assert_eq!(
            update,
            ProvisionUpdate::Updated {
                previous: BigInt::from(100),
                amount: BigInt::from(60)
            }
        );
        let provision = store.load_provision(&account()).await.unwrap().unwrap();
        assert_eq!(provision.amount, BigInt::from(60));
    }

    #[tokio::test]
    async fn test_debit_without_provision_is_anomaly() {
        let store = MemoryStore::new();

        let update = apply_delta(&store, &account(), &LiquidityDelta::Debit(BigInt::from(5)))
            .await
            .unwrap();

        assert!(update.is_anomaly());
        assert!(store.load_provision(&account()).await.unwrap().is_none());
        assert_eq!(store.provision_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zero_credit_still_creates_provision() {
        let store = MemoryStore::new();

        apply_delta(&store, &account(), &LiquidityDelta::Credit(BigInt::from(0)))
            .await
            .unwrap();

        let provision = store.load_provision(&account()).await.unwrap().unwrap();
        assert_eq!(provision.amount, BigInt::from(0));
    }

    #[tokio::test]
    async fn test_balance_may_go_negative() {
        let store = MemoryStore::new();
        apply_delta(&store, &account(), &LiquidityDelta::Credit(BigInt::from(10)))
            .await
            .unwrap();
        apply_delta(&store, &account(), &LiquidityDelta::Debit(BigInt::from(25)))
            .await
            .unwrap();

        let provision = store.load_provision(&account()).await.unwrap().unwrap();
        assert_eq!(provision.amount, BigInt::from(-15));
    }

    #[tokio::test]
    async fn test_missing_provision_emits_one_error() {
        let errors = ErrorEvents::default();
        let _guard = errors.install();
        let store = MemoryStore::new();

        apply_delta(&store, &account(), &LiquidityDelta::Debit(BigInt::from(5)))
            .await
            .unwrap();

        let fields = errors.fields();
        assert_eq!(fields.len(), 1);
        assert!(fields[0].contains(&"provider"));
        assert!(fields[0].contains(&"amount"));
    }

    #[tokio::test]
    async fn test_applied_deltas_emit_no_error() {
        let errors = ErrorEvents::default();
        let _guard = errors.install();
        let store = MemoryStore::new();

        apply_delta(&store, &account(), &LiquidityDelta::Credit(BigInt::from(100)))
            .await
            .unwrap();
        apply_delta(&store, &account(), &LiquidityDelta::Debit(BigInt::from(40)))
            .await
            .unwrap();

        assert!(errors.fields().is_empty());
    }
}
