use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("invalid integer {0:?}")]
    InvalidInteger(String),

    #[error("integer out of range: {0}")]
    IntegerOutOfRange(String),

    #[error("mixed element types in array: {first} and {other}")]
    MixedArray { first: &'static str, other: &'static str },
}
