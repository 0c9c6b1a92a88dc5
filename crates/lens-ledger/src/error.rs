use alloy_primitives::TxHash;

use crate::types::SnapshotId;

/// Errors produced by ledger provider operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("failed to decode call result: {0}")]
    Decode(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unknown snapshot {0}")]
    UnknownSnapshot(SnapshotId),

    #[error("unknown transaction {0}")]
    UnknownTransaction(TxHash),

    #[error("snapshot failed: {0}")]
    Snapshot(String),
}

/// Convenience alias for ledger results.
pub type LedgerResult<T> = Result<T, LedgerError>;
