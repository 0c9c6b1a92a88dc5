use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::error::{MetadataError, MetadataResult};
use crate::traits::MetadataResolver;
use crate::types::{CreationInfo, SourceInfo};

/// Metadata resolver backed by fixed tables.
///
/// Stands in for the explorer in tests and offline demos. Counts every
/// lookup so callers can assert on caching behaviour.
#[derive(Default)]
pub struct StaticResolver {
    sources: RwLock<HashMap<Address, SourceInfo>>,
    creations: RwLock<HashMap<Address, CreationInfo>>,
    failing: RwLock<Option<String>>,
    lookups: AtomicUsize,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register source info for `address`.
    pub fn insert_source(&self, address: Address, info: SourceInfo) {
        self.sources.write().expect("lock poisoned").insert(address, info);
    }

    /// Register creation info for `address`.
    pub fn insert_creation(&self, address: Address, info: CreationInfo) {
        self.creations.write().expect("lock poisoned").insert(address, info);
    }

    /// Make every lookup fail with `reason` (or succeed again with `None`).
    pub fn set_failing(&self, reason: Option<&str>) {
        *self.failing.write().expect("lock poisoned") = reason.map(str::to_string);
    }

    /// Total number of lookups served.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn check(&self, address: Address) -> MetadataResult<()> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.failing.read().expect("lock poisoned").as_ref() {
            Some(reason) => Err(MetadataError::Backend {
                address,
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MetadataResolver for StaticResolver {
    async fn source_info(&self, address: Address) -> MetadataResult<Option<SourceInfo>> {
        self.check(address)?;
        Ok(self.sources.read().expect("lock poisoned").get(&address).cloned())
    }

    async fn creation_info(&self, address: Address) -> MetadataResult<Option<CreationInfo>> {
        self.check(address)?;
        Ok(self.creations.read().expect("lock poisoned").get(&address).cloned())
    }
}
