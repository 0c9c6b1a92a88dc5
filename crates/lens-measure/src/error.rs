//! Error types for measurement evaluation.

use lens_types::NodeKey;

/// Failure of a single calculation.
///
/// The registry never propagates these: each one is stored as the error
/// value of the measurement that produced it.
#[derive(Debug, thiserror::Error)]
pub enum MeasureError {
    #[error(transparent)]
    Ledger(#[from] lens_ledger::LedgerError),

    #[error(transparent)]
    Type(#[from] lens_types::TypeError),

    /// The node has no usable address.
    #[error("node {0} has no ledger address")]
    NoAddress(NodeKey),

    /// The node's interface lacks the requested function.
    #[error("{contract} has no function {function}")]
    UnknownFunction { contract: String, function: String },

    /// A relational calculation ran without a target.
    #[error("measurement {0} needs a target node")]
    MissingTarget(String),

    /// The call result has no single-value representation.
    #[error("cannot represent result: {0}")]
    Conversion(String),

    /// A closure calculation failed.
    #[error("{0}")]
    Custom(String),
}

/// Convenience alias for measurement results.
pub type MeasureResult<T> = Result<T, MeasureError>;
