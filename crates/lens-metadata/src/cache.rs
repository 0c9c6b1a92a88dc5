use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::Value;
use tracing::debug;

use crate::error::MetadataResult;
use crate::traits::MetadataCache;

/// In-memory, HashMap-based metadata cache.
///
/// Intended for tests and single-run use. Values are cloned on read/write.
#[derive(Default)]
pub struct InMemoryMetadataCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryMetadataCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }
}

impl MetadataCache for InMemoryMetadataCache {
    fn get(&self, key: &str) -> MetadataResult<Option<Value>> {
        Ok(self.entries.read().expect("lock poisoned").get(key).cloned())
    }

    fn put(&self, key: &str, value: &Value) -> MetadataResult<()> {
        self.entries
            .write()
            .expect("lock poisoned")
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}

/// Directory-backed metadata cache: one JSON file per key.
///
/// Survives across runs so repeated inspections of the same contracts do not
/// hit the metadata service again.
pub struct FileMetadataCache {
    root: PathBuf,
}

impl FileMetadataCache {
    /// Open (creating if needed) a cache rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> MetadataResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The cache directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{file}.json"))
    }
}

impl MetadataCache for FileMetadataCache {
    fn get(&self, key: &str) -> MetadataResult<Option<Value>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        debug!(key, path = %path.display(), "metadata cache hit");
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn put(&self, key: &str, value: &Value) -> MetadataResult<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
