//! RPC provider wrapper for Ethereum communication.

use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::{BlockNumberOrTag, BlockTransactionsKind, Filter, Log};
use alloy::transports::http::{Client, Http};
use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

use poolscan_core::PoolEvent;

use super::events::{decode_pool_log, event_signatures};

/// HTTP RPC provider for querying the pool contract.
#[derive(Clone)]
pub struct RpcProvider {
    provider: RootProvider<Http<Client>>,
    pool_address: Address,
}

impl RpcProvider {
    /// Create a new RPC provider.
    pub async fn new(rpc_url: &str, pool_address: Address) -> Result<Self> {
        let url = rpc_url
            .parse()
            .with_context(|| format!("Invalid RPC URL: {}", rpc_url))?;

        let provider = ProviderBuilder::new().on_http(url);

        Ok(Self {
            provider,
            pool_address,
        })
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> Result<u64> {
        self.provider
            .get_block_number()
            .await
            .context("Failed to get block number")
    }

    /// Get the chain id reported by the node.
    pub async fn get_chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .context("Failed to get chain id")
    }

    async fn get_block_timestamp(&self, block_number: u64) -> Result<u64> {
        let block = self
            .provider
            .get_block_by_number(
                BlockNumberOrTag::Number(block_number),
                BlockTransactionsKind::Hashes,
            )
            .await
            .with_context(|| format!("Failed to fetch block {}", block_number))?
            .with_context(|| format!("Block {} not found", block_number))?;

        Ok(block.header.timestamp)
    }

    /// Get pool events for an inclusive block range, in chain order.
    ///
    /// Logs that cannot be decoded are skipped with a warning. RPC failures
    /// are returned as errors.
    pub async fn get_events(&self, from_block: u64, to_block: u64) -> Result<Vec<PoolEvent>> {
        let filter = Filter::new()
            .address(self.pool_address)
            .event_signature(event_signatures())
            .from_block(from_block)
            .to_block(to_block);

        let logs: Vec<Log> = self
            .provider
            .get_logs(&filter)
            .await
            .context("Failed to fetch logs from RPC")?;

        debug!(
            from_block,
            to_block,
            logs = logs.len(),
            "Fetched pool logs"
        );

        let mut timestamps: HashMap<u64, u64> = HashMap::new();
        let mut events = Vec::with_capacity(logs.len());

        for log in &logs {
            if log.removed {
                continue;
            }

            let timestamp = match (log.block_timestamp, log.block_number) {
                (Some(ts), _) => ts,
                (None, Some(number)) => match timestamps.get(&number) {
                    Some(ts) => *ts,
                    None => {
                        let ts = self.get_block_timestamp(number).await?;
                        timestamps.insert(number, ts);
                        ts
                    }
                },
                (None, None) => {
                    warn!("Skipping pending log without block number");
                    continue;
                }
            };

            match decode_pool_log(log, timestamp) {
                Ok(event) => events.push(event),
                Err(e) => {
                    warn!("Failed to decode pool event: {:#}", e);
                }
            }
        }

        sort_chain_order(&mut events);

        Ok(events)
    }
}

/// Sort events by `(block_number, log_index)`.
pub fn sort_chain_order(events: &mut [PoolEvent]) {
    events.sort_by_key(|event| event.provenance().ordering_key());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::fixtures::{add, provenance, remove_one};
    use poolscan_core::Address;

    #[test]
    fn test_sort_chain_order() {
        let provider = Address::repeat_byte(0x01);
        let mut events = vec![
            remove_one(provider, 5, 2, provenance(5, 1)),
            add(provider, &[1, 0, 0], provenance(4, 9)),
            add(provider, &[1, 0, 0], provenance(5, 0)),
        ];

        sort_chain_order(&mut events);

        let keys: Vec<(u64, u64)> = events
            .iter()
            .map(|e| e.provenance().ordering_key())
            .collect();
        assert_eq!(keys, vec![(4, 9), (5, 0), (5, 1)]);
    }

    #[tokio::test]
    async fn test_rejects_invalid_rpc_url() {
        let result = RpcProvider::new("not a url", Address::ZERO).await;
        assert!(result.is_err());
    }
}
