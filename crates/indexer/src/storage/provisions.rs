//! Liquidity provision storage operations.

use super::codec::decode_bigint;
use super::Storage;
use anyhow::{Context, Result};
use poolscan_core::{AccountId, LiquidityProvision};
use sqlx::{Executor, Row, Sqlite};

pub(super) async fn upsert_provision<'e, E>(executor: E, provision: &LiquidityProvision) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let account = provision.account.to_hex();

    sqlx::query(
        r#"
        INSERT INTO liquidity_provisions (id, account, amount)
        VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            account = excluded.account,
            amount = excluded.amount
        "#,
    )
    .bind(&account)
    .bind(&account)
    .bind(provision.amount.to_string())
    .execute(executor)
    .await
    .context("Failed to upsert liquidity provision")?;

    Ok(())
}

pub(super) async fn get_provision<'e, E>(
    executor: E,
    account: &AccountId,
) -> Result<Option<LiquidityProvision>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT account, amount FROM liquidity_provisions WHERE id = ?")
        .bind(account.to_hex())
        .fetch_optional(executor)
        .await
        .context("Failed to fetch liquidity provision")?;

    let Some(row) = row else {
        return Ok(None);
    };

    let account: String = row.get("account");
    let amount: String = row.get("amount");

    Ok(Some(LiquidityProvision::new(
        account.parse()?,
        decode_bigint(&amount)?,
    )))
}

impl Storage {
    /// Create or update a provider's liquidity provision.
    pub async fn upsert_provision(&self, provision: &LiquidityProvision) -> Result<()> {
        upsert_provision(&self.pool, provision).await
    }

    /// Get a provider's liquidity provision.
    pub async fn get_provision(&self, account: &AccountId) -> Result<Option<LiquidityProvision>> {
        get_provision(&self.pool, account).await
    }
}
