use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy_primitives::Address;
use async_trait::async_trait;
use lens_types::NodeKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{MetadataError, MetadataResult};
use crate::fetch::FetchCell;
use crate::traits::{MetadataCache, MetadataResolver};
use crate::types::{CreationInfo, SourceInfo};

type Cells<T> = Mutex<HashMap<Address, Arc<FetchCell<Option<T>, MetadataError>>>>;

/// Memoizing resolver: a backend resolver fronted by a persistent cache and
/// per-address fetch-once cells.
///
/// Lookup order for an address seen for the first time in this process:
/// persistent cache, then backend (whose answer is written to the cache).
/// Every later lookup of the same address returns the remembered outcome
/// without touching either.
pub struct CachedResolver<B, C> {
    backend: B,
    cache: C,
    sources: Cells<SourceInfo>,
    creations: Cells<CreationInfo>,
}

impl<B: MetadataResolver, C: MetadataCache> CachedResolver<B, C> {
    pub fn new(backend: B, cache: C) -> Self {
        Self {
            backend,
            cache,
            sources: Mutex::new(HashMap::new()),
            creations: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The persistent cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    fn cell<T>(cells: &Cells<T>, address: Address) -> Arc<FetchCell<Option<T>, MetadataError>>
    where
        T: Clone,
    {
        let mut map = cells.lock().expect("lock poisoned");
        Arc::clone(map.entry(address).or_default())
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> MetadataResult<Option<Option<T>>> {
        match self.cache.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn store<T: Serialize>(&self, key: &str, value: &Option<T>) -> MetadataResult<()> {
        self.cache.put(key, &serde_json::to_value(value)?)
    }
}

#[async_trait]
impl<B: MetadataResolver, C: MetadataCache> MetadataResolver for CachedResolver<B, C> {
    async fn source_info(&self, address: Address) -> MetadataResult<Option<SourceInfo>> {
        let cell = Self::cell(&self.sources, address);
        cell.get_or_fetch(|| async {
            let key = format!("source:{}", NodeKey::from_address(address));
            if let Some(hit) = self.cached(&key)? {
                return Ok(hit);
            }
            debug!(%address, "fetching contract source info");
            let info = self.backend.source_info(address).await?;
            self.store(&key, &info)?;
            Ok(info)
        })
        .await
    }

    async fn creation_info(&self, address: Address) -> MetadataResult<Option<CreationInfo>> {
        let cell = Self::cell(&self.creations, address);
        cell.get_or_fetch(|| async {
            let key = format!("creation:{}", NodeKey::from_address(address));
            if let Some(hit) = self.cached(&key)? {
                return Ok(hit);
            }
            debug!(%address, "fetching contract creation info");
            let info = self.backend.creation_info(address).await?;
            self.store(&key, &info)?;
            Ok(info)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{FileMetadataCache, InMemoryMetadataCache};
    use crate::memory::StaticResolver;
    use alloy_json_abi::JsonAbi;
    use alloy_primitives::B256;

    fn addr(b: u8) -> Address {
        Address::repeat_byte(b)
    }

    fn backend() -> StaticResolver {
        let backend = StaticResolver::new();
        backend.insert_source(addr(1), SourceInfo::new("Vault", JsonAbi::default()));
        backend.insert_creation(
            addr(1),
            CreationInfo {
                creator: addr(9),
                tx_hash: B256::repeat_byte(3),
            },
        );
        backend
    }

    #[tokio::test]
    async fn repeated_lookups_hit_backend_once() {
        let resolver = CachedResolver::new(backend(), InMemoryMetadataCache::new());
        for _ in 0..3 {
            let info = resolver.source_info(addr(1)).await.unwrap().unwrap();
            assert_eq!(info.contract_name, "Vault");
        }
        assert_eq!(resolver.backend().lookups(), 1);
    }

    #[tokio::test]
    async fn unknown_addresses_are_cached_as_absent() {
        let resolver = CachedResolver::new(backend(), InMemoryMetadataCache::new());
        assert!(resolver.source_info(addr(2)).await.unwrap().is_none());
        assert!(resolver.source_info(addr(2)).await.unwrap().is_none());
        assert_eq!(resolver.backend().lookups(), 1);
        assert_eq!(
            resolver.cache().get(&format!("source:{}", NodeKey::from_address(addr(2)))).unwrap(),
            Some(serde_json::Value::Null)
        );
    }

    #[tokio::test]
    async fn backend_failures_propagate_and_stick() {
        let failing = backend();
        failing.set_failing(Some("rate limited"));
        let resolver = CachedResolver::new(failing, InMemoryMetadataCache::new());
        let err = resolver.source_info(addr(1)).await.unwrap_err();
        assert!(matches!(err, MetadataError::Backend { .. }));

        resolver.backend().set_failing(None);
        assert!(resolver.source_info(addr(1)).await.is_err());
        assert_eq!(resolver.backend().lookups(), 1);
    }

    #[tokio::test]
    async fn persistent_cache_is_consulted_before_backend() {
        let dir = tempfile::tempdir().unwrap();
        {
            let resolver =
                CachedResolver::new(backend(), FileMetadataCache::open(dir.path()).unwrap());
            resolver.creation_info(addr(1)).await.unwrap();
        }
        let resolver = CachedResolver::new(backend(), FileMetadataCache::open(dir.path()).unwrap());
        let info = resolver.creation_info(addr(1)).await.unwrap().unwrap();
        assert_eq!(info.creator, addr(9));
        assert_eq!(resolver.backend().lookups(), 0);
    }
}
