//! Column encodings for amounts and hashes.
//!
//! SQLite integers are 64-bit, so every amount is stored as base-10 text and
//! every amount sequence as a JSON array of base-10 strings.

use anyhow::{Context, Result};
use poolscan_core::delta::{parse_bigint, parse_u256};
use poolscan_core::{BigInt, B256, U256};

pub(crate) fn encode_amounts(amounts: &[U256]) -> Result<String> {
    let digits: Vec<String> = amounts.iter().map(U256::to_string).collect();
    serde_json::to_string(&digits).context("Failed to encode amount list")
}

pub(crate) fn decode_amounts(column: &str) -> Result<Vec<U256>> {
    let digits: Vec<String> =
        serde_json::from_str(column).with_context(|| format!("Invalid amount list: {column}"))?;
    digits
        .iter()
        .map(|d| parse_u256(d).map_err(Into::into))
        .collect()
}

pub(crate) fn decode_u256(column: &str) -> Result<U256> {
    Ok(parse_u256(column)?)
}

pub(crate) fn decode_bigint(column: &str) -> Result<BigInt> {
    Ok(parse_bigint(column)?)
}

pub(crate) fn decode_hash(column: &[u8]) -> Result<B256> {
    B256::try_from(column).with_context(|| format!("Invalid hash length: {}", column.len()))
}
