//! Error types for graph discovery.

/// Errors that abort a discovery run.
///
/// Individual probe failures are not errors: the probed link is simply
/// absent from the graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The metadata service failed.
    #[error("metadata error: {0}")]
    Metadata(#[from] lens_metadata::MetadataError),

    /// The ledger could not classify an address.
    #[error("ledger error: {0}")]
    Ledger(#[from] lens_ledger::LedgerError),

    /// A read function was requested that the contract interface lacks.
    #[error("no zero-argument read function named {0:?}")]
    UnknownFunction(String),
}

/// Convenience alias for graph results.
pub type GraphResult<T> = Result<T, GraphError>;
