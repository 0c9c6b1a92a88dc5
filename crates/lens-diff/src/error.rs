//! Error types for measurement and table diffing.

/// Structural violations between two measurement sets.
///
/// Legitimate differences are never errors; these only signal that the two
/// sets were not produced by the same registry ordering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    #[error("measurement sets are not comparable: {0}")]
    ShapeMismatch(String),
}

/// Table construction and codec errors.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("malformed table header: {0}")]
    MalformedHeader(String),

    #[error("row {row} has {found} cells, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("encoding error: {0}")]
    Encoding(String),
}

/// Convenience alias for delta results.
pub type DiffResult<T> = Result<T, DiffError>;

/// Convenience alias for table results.
pub type TableResult<T> = Result<T, TableError>;
