//! Storage trait and implementations

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub type StorageError = Box<dyn std::error::Error + Send + Sync>;

/// Byte-oriented key/value store. Keys are already namespaced by the caller.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}

/// In-memory storage (for testing and demos).
///
/// Clones share the same map, so one store can back many trees.
#[derive(Clone)]
pub struct InMemoryStorage {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for InMemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let data = self.data.read().map_err(|e| e.to_string())?;
        Ok(data.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut data = self.data.write().map_err(|e| e.to_string())?;
        data.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// JSON file storage: `{ key: hex(value) }`, rewritten on every put.
///
/// Not shared between handles; open one per file.
pub struct FileBackedStorage {
    path: PathBuf,
    data: BTreeMap<String, String>,
}

impl FileBackedStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let raw = fs::read(&path)?;
            serde_json::from_slice(&raw)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_vec_pretty(&self.data)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl Storage for FileBackedStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match self.data.get(key) {
            Some(v) => Ok(Some(hex::decode(v)?)),
            None => Ok(None),
        }
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.data.insert(key.to_string(), hex::encode(value));
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_shared_handles() {
        let mut a = InMemoryStorage::new();
        let b = a.clone();
        a.put("id1:aa", &[1, 2, 3]).unwrap();
        assert_eq!(b.get("id1:aa").unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(b.get("id2:aa").unwrap(), None);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_file_backed_reopen() {
        let path = std::env::temp_dir().join(format!("merkletree-store-{}.json", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut store = FileBackedStorage::open(&path).unwrap();
        store.put("k", &[0xde, 0xad]).unwrap();
        drop(store);

        let reopened = FileBackedStorage::open(&path).unwrap();
        assert_eq!(reopened.path(), path.as_path());
        assert_eq!(reopened.get("k").unwrap(), Some(vec![0xde, 0xad]));
        assert_eq!(reopened.get("missing").unwrap(), None);

        fs::remove_file(&path).unwrap();
    }
}
