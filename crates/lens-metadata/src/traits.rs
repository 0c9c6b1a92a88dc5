use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::Value;

use crate::error::MetadataResult;
use crate::types::{CreationInfo, SourceInfo};

/// Source of contract metadata (a block explorer or a stand-in).
///
/// `Ok(None)` means the service knows nothing about the address, which is
/// not an error. `Err` means the service itself failed.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Verified source information for `address`.
    async fn source_info(&self, address: Address) -> MetadataResult<Option<SourceInfo>>;

    /// Creator and creation transaction of `address`.
    async fn creation_info(&self, address: Address) -> MetadataResult<Option<CreationInfo>>;
}

#[async_trait]
impl<T: MetadataResolver + ?Sized> MetadataResolver for Arc<T> {
    async fn source_info(&self, address: Address) -> MetadataResult<Option<SourceInfo>> {
        (**self).source_info(address).await
    }

    async fn creation_info(&self, address: Address) -> MetadataResult<Option<CreationInfo>> {
        (**self).creation_info(address).await
    }
}

/// Persistent key/value cache for metadata responses, keyed by request
/// signature.
///
/// `Ok(None)` means the key has never been stored. A stored JSON `null`
/// records a lookup that found nothing.
pub trait MetadataCache: Send + Sync {
    fn get(&self, key: &str) -> MetadataResult<Option<Value>>;

    fn put(&self, key: &str, value: &Value) -> MetadataResult<()>;
}
