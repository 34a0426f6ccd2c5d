//! Signed liquidity deltas and exact amount arithmetic.
//!
//! Chain amounts are `uint256`; sums of several of them can exceed 256 bits,
//! so aggregation happens in [`BigInt`].

use alloy_primitives::U256;
use num_bigint::{BigInt, Sign};
use num_traits::Zero;

use crate::error::{CoreError, Result};

/// Change applied to a provider's liquidity balance.
///
/// The tag decides what happens when the provider has no balance yet; the
/// arithmetic only ever uses [`LiquidityDelta::signed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiquidityDelta {
    /// Liquidity added.
    Credit(BigInt),

    /// Liquidity removed.
    Debit(BigInt),
}

impl LiquidityDelta {
    /// Signed value: positive for credits, negative for debits.
    pub fn signed(&self) -> BigInt {
        match self {
            LiquidityDelta::Credit(amount) => amount.clone(),
            LiquidityDelta::Debit(amount) => -amount,
        }
    }

    /// Unsigned magnitude as carried by the event.
    pub fn magnitude(&self) -> &BigInt {
        match self {
            LiquidityDelta::Credit(amount) | LiquidityDelta::Debit(amount) => amount,
        }
    }

    /// Whether this delta adds liquidity.
    pub fn is_credit(&self) -> bool {
        matches!(self, LiquidityDelta::Credit(_))
    }
}

/// Widen a chain amount into an unbounded integer.
pub fn u256_to_bigint(value: &U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>())
}

/// Sum a sequence of chain amounts, starting from zero.
pub fn sum_amounts<'a, I>(amounts: I) -> BigInt
where
    I: IntoIterator<Item = &'a U256>,
{
    amounts
        .into_iter()
        .fold(BigInt::zero(), |acc, amount| acc + u256_to_bigint(amount))
}

/// Parse a base-10 `uint256` string.
pub fn parse_u256(s: &str) -> Result<U256> {
    U256::from_str_radix(s, 10).map_err(|_| CoreError::InvalidAmount(s.to_string()))
}

/// Parse a base-10 signed integer string.
pub fn parse_bigint(s: &str) -> Result<BigInt> {
    s.parse::<BigInt>()
        .map_err(|_| CoreError::InvalidAmount(s.to_string()))
}
