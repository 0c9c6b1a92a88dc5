use alloy_primitives::Address;

/// Errors produced while resolving contract metadata.
///
/// Every variant is fatal to a discovery run. The type is `Clone` so a failed
/// lookup can be cached and returned again to later callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// The metadata service rejected or failed the request.
    #[error("metadata service error for {address}: {reason}")]
    Backend { address: Address, reason: String },

    /// The published ABI could not be parsed.
    #[error("invalid ABI for {address}: {reason}")]
    InvalidAbi { address: Address, reason: String },

    /// Cache read or write failure.
    #[error("metadata cache error: {0}")]
    Cache(String),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MetadataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for MetadataError {
    fn from(err: std::io::Error) -> Self {
        Self::Cache(err.to_string())
    }
}

/// Convenience alias for metadata results.
pub type MetadataResult<T> = Result<T, MetadataError>;
