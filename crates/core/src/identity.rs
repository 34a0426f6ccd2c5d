//! Deterministic event identities.
//!
//! An event id is `<kind-prefix>-<txHash>-<logIndex>`, for example
//! `al-0x3f…9c-12`. The pair (tx hash, log index) is unique per chain log, so
//! the id is unique per observed event and stable across re-delivery.

use alloy_primitives::{hex, B256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::types::EventKind;

/// Identity of a logged event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Build the id for an event of `kind` emitted at `(tx_hash, log_index)`.
    pub fn new(kind: EventKind, tx_hash: &B256, log_index: u64) -> Self {
        EventId(format!(
            "{}-0x{}-{}",
            kind.prefix(),
            hex::encode(tx_hash),
            log_index
        ))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the id back into its components.
    pub fn parts(&self) -> Result<(EventKind, B256, u64)> {
        parse_parts(&self.0)
    }

    /// Event kind encoded in the prefix.
    pub fn kind(&self) -> Result<EventKind> {
        self.parts().map(|(kind, _, _)| kind)
    }
}

fn parse_parts(s: &str) -> Result<(EventKind, B256, u64)> {
    let invalid = || CoreError::InvalidEventId(s.to_string());

    let mut parts = s.splitn(3, '-');
    let (Some(prefix), Some(tx_hash), Some(log_index)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let kind = EventKind::from_prefix(prefix)?;
    if !tx_hash.starts_with("0x") {
        return Err(invalid());
    }
    let tx_hash = tx_hash.parse::<B256>().map_err(|_| invalid())?;
    let log_index = log_index.parse::<u64>().map_err(|_| invalid())?;

    Ok((kind, tx_hash, log_index))
}

impl FromStr for EventId {
    type Err = CoreError;

    /// Parse an id, accepting only the canonical (lowercase) rendering.
    fn from_str(s: &str) -> Result<Self> {
        let (kind, tx_hash, log_index) = parse_parts(s)?;
        let id = EventId::new(kind, &tx_hash, log_index);
        if id.0 != s {
            return Err(CoreError::InvalidEventId(s.to_string()));
        }
        Ok(id)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EventId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    const TX: B256 = b256!("00000000000000000000000000000000000000000000000000000000000000ab");

    #[test]
    fn test_event_id_format() {
        let id = EventId::new(EventKind::AddLiquidity, &TX, 12);
        assert_eq!(
            id.as_str(),
            "al-0x00000000000000000000000000000000000000000000000000000000000000ab-12"
        );

        let id = EventId::new(EventKind::RemoveLiquidityOne, &TX, 0);
        assert!(id.as_str().starts_with("rlo-0x"));
        assert!(id.as_str().ends_with("-0"));
    }

    #[test]
    fn test_event_id_is_stable_and_unique() {
        let first = EventId::new(EventKind::RemoveLiquidity, &TX, 3);
        let replay = EventId::new(EventKind::RemoveLiquidity, &TX, 3);
        let next_log = EventId::new(EventKind::RemoveLiquidity, &TX, 4);
        let other_kind = EventId::new(EventKind::AddLiquidity, &TX, 3);

        assert_eq!(first, replay);
        assert_ne!(first, next_log);
        assert_ne!(first, other_kind);
    }

    #[test]
    fn test_event_id_parse() {
        let id = EventId::new(EventKind::RemoveLiquidityOne, &TX, 42);
        let parsed: EventId = id.as_str().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(
            parsed.parts().unwrap(),
            (EventKind::RemoveLiquidityOne, TX, 42)
        );
    }

    #[test]
    fn test_event_id_parse_rejects_malformed() {
        assert!("al-0xab".parse::<EventId>().is_err());
        assert!("al-nothex-1".parse::<EventId>().is_err());
        assert!(
            "zz-0x00000000000000000000000000000000000000000000000000000000000000ab-1"
                .parse::<EventId>()
                .is_err()
        );
        assert!(
            "al-0x00000000000000000000000000000000000000000000000000000000000000AB-1"
                .parse::<EventId>()
                .is_err()
        );
        assert!(
            "al-0x00000000000000000000000000000000000000000000000000000000000000ab-x"
                .parse::<EventId>()
                .is_err()
        );
    }
}
