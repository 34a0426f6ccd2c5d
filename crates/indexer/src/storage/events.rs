//! Event log storage operations.
//!
//! Each event kind has its own table whose columns mirror the chain payload:
//! `remove_liquidity_events` has no invariant, `remove_liquidity_one_events`
//! has neither invariant nor token supply.

use super::codec::{decode_amounts, decode_hash, decode_u256, encode_amounts};
use super::Storage;
use anyhow::{Context, Result};
use poolscan_core::{
    AccountId, AddLiquidityRecord, EventId, EventKind, EventRecord, RemoveLiquidityOneRecord,
    RemoveLiquidityRecord,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite};

pub(super) async fn upsert_event<'e, E>(executor: E, record: &EventRecord) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    match record {
        EventRecord::AddLiquidity(r) => upsert_add_liquidity(executor, r).await,
        EventRecord::RemoveLiquidity(r) => upsert_remove_liquidity(executor, r).await,
        EventRecord::RemoveLiquidityOne(r) => upsert_remove_liquidity_one(executor, r).await,
    }
}

async fn upsert_add_liquidity<'e, E>(executor: E, r: &AddLiquidityRecord) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO add_liquidity_events (
            id, provider, token_amounts, fees, invariant, token_supply,
            block_number, block_timestamp, tx_hash
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            provider = excluded.provider,
            token_amounts = excluded.token_amounts,
            fees = excluded.fees,
            invariant = excluded.invariant,
            token_supply = excluded.token_supply,
            block_number = excluded.block_number,
            block_timestamp = excluded.block_timestamp,
            tx_hash = excluded.tx_hash
        "#,
    )
    .bind(r.id.as_str())
    .bind(r.provider.to_hex())
    .bind(encode_amounts(&r.token_amounts)?)
    .bind(encode_amounts(&r.fees)?)
    .bind(r.invariant.to_string())
    .bind(r.token_supply.to_string())
    .bind(r.block as i64)
    .bind(r.timestamp as i64)
    .bind(r.transaction.as_slice())
    .execute(executor)
    .await
    .context("Failed to upsert add_liquidity_events")?;

    Ok(())
}

async fn upsert_remove_liquidity<'e, E>(executor: E, r: &RemoveLiquidityRecord) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO remove_liquidity_events (
            id, provider, token_amounts, fees, token_supply,
            block_number, block_timestamp, tx_hash
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            provider = excluded.provider,
            token_amounts = excluded.token_amounts,
            fees = excluded.fees,
            token_supply = excluded.token_supply,
            block_number = excluded.block_number,
            block_timestamp = excluded.block_timestamp,
            tx_hash = excluded.tx_hash
        "#,
    )
    .bind(r.id.as_str())
    .bind(r.provider.to_hex())
    .bind(encode_amounts(&r.token_amounts)?)
    .bind(encode_amounts(&r.fees)?)
    .bind(r.token_supply.to_string())
    .bind(r.block as i64)
    .bind(r.timestamp as i64)
    .bind(r.transaction.as_slice())
    .execute(executor)
    .await
    .context("Failed to upsert remove_liquidity_events")?;

    Ok(())
}

async fn upsert_remove_liquidity_one<'e, E>(
    executor: E,
    r: &RemoveLiquidityOneRecord,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO remove_liquidity_one_events (
            id, provider, token_amount, coin_amount,
            block_number, block_timestamp, tx_hash
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            provider = excluded.provider,
            token_amount = excluded.token_amount,
            coin_amount = excluded.coin_amount,
            block_number = excluded.block_number,
            block_timestamp = excluded.block_timestamp,
            tx_hash = excluded.tx_hash
        "#,
    )
    .bind(r.id.as_str())
    .bind(r.provider.to_hex())
    .bind(r.token_amount.to_string())
    .bind(r.coin_amount.to_string())
    .bind(r.block as i64)
    .bind(r.timestamp as i64)
    .bind(r.transaction.as_slice())
    .execute(executor)
    .await
    .context("Failed to upsert remove_liquidity_one_events")?;

    Ok(())
}

/// Get an event log entry by id.
///
/// The table is chosen from the id's kind prefix.
pub(super) async fn get_event<'e, E>(executor: E, id: &EventId) -> Result<Option<EventRecord>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let kind = id.kind()?;
    let table = kind.as_str();

    let row = sqlx::query(&format!("SELECT * FROM {table}_events WHERE id = ?"))
        .bind(id.as_str())
        .fetch_optional(executor)
        .await
        .with_context(|| format!("Failed to fetch event {id}"))?;

    match row {
        Some(row) => Ok(Some(row_to_event_record(kind, &row)?)),
        None => Ok(None),
    }
}

fn row_to_event_record(kind: EventKind, row: &SqliteRow) -> Result<EventRecord> {
    let id: String = row.get("id");
    let provider: String = row.get("provider");
    let tx_hash: Vec<u8> = row.get("tx_hash");

    let id: EventId = id.parse()?;
    let provider: AccountId = provider.parse()?;
    let block = row.get::<i64, _>("block_number") as u64;
    let timestamp = row.get::<i64, _>("block_timestamp") as u64;
    let transaction = decode_hash(&tx_hash)?;

    let record = match kind {
        EventKind::AddLiquidity => EventRecord::AddLiquidity(AddLiquidityRecord {
            id,
            provider,
            token_amounts: decode_amounts(row.get("token_amounts"))?,
            fees: decode_amounts(row.get("fees"))?,
            invariant: decode_u256(row.get("invariant"))?,
            token_supply: decode_u256(row.get("token_supply"))?,
            block,
            timestamp,
            transaction,
        }),
        EventKind::RemoveLiquidity => EventRecord::RemoveLiquidity(RemoveLiquidityRecord {
            id,
            provider,
            token_amounts: decode_amounts(row.get("token_amounts"))?,
            fees: decode_amounts(row.get("fees"))?,
            token_supply: decode_u256(row.get("token_supply"))?,
            block,
            timestamp,
            transaction,
        }),
        EventKind::RemoveLiquidityOne => {
            EventRecord::RemoveLiquidityOne(RemoveLiquidityOneRecord {
                id,
                provider,
                token_amount: decode_u256(row.get("token_amount"))?,
                coin_amount: decode_u256(row.get("coin_amount"))?,
                block,
                timestamp,
                transaction,
            })
        }
    };

    Ok(record)
}

impl Storage {
    /// Write an event log entry, overwriting any entry with the same id.
    pub async fn upsert_event(&self, record: &EventRecord) -> Result<()> {
        upsert_event(&self.pool, record).await
    }

    /// Get an event log entry by id.
    pub async fn get_event(&self, id: &EventId) -> Result<Option<EventRecord>> {
        get_event(&self.pool, id).await
    }
}
