//! Error types for the core crate.

use thiserror::Error;

/// Core error type.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid address format.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Amount string is not a base-10 integer in range.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Event id does not have the `<prefix>-<txHash>-<logIndex>` shape.
    #[error("Invalid event id: {0}")]
    InvalidEventId(String),

    /// Event kind prefix or name not recognized.
    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),
}

/// Result type alias for CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;
