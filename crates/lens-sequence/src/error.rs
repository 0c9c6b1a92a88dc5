//! Error types for action sequencing.

use lens_ledger::LedgerError;

/// Errors raised while preparing or running an action sequence.
///
/// Only snapshot and restore failures abort a running sequence. Invocation
/// failures are recorded on the action's report.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    #[error("failed to capture ledger snapshot: {0}")]
    Snapshot(#[source] LedgerError),

    #[error("failed to restore ledger snapshot: {0}")]
    Restore(#[source] LedgerError),

    #[error("no snapshot has been captured")]
    NoSnapshot,

    #[error("no contract labelled {0:?} in the graph")]
    UnknownContract(String),

    #[error("{contract} has no function {function} taking {arity} argument(s)")]
    UnknownFunction {
        contract: String,
        function: String,
        arity: usize,
    },

    #[error("argument {index} of {function}: {reason}")]
    InvalidArgument {
        function: String,
        index: usize,
        reason: String,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Measure(#[from] lens_measure::MeasureError),
}

/// Convenience alias for sequencing results.
pub type SequenceResult<T> = Result<T, SequenceError>;
