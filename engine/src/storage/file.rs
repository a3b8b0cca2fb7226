// Durable store: every record lives in one JSON object file
use super::KeyValueStore;
use crate::error::{EngineError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    records: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| {
                    EngineError::StorageError(format!("Store file '{}' is not a JSON object: {}", path.display(), e))
                })?
            }
        } else {
            BTreeMap::new()
        };
        tracing::debug!(path = %path.display(), records = records.len(), "Opened file store");
        Ok(FileStore { path, records: RwLock::new(records) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, records: &BTreeMap<String, String>) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(records)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F: FnOnce(&mut BTreeMap<String, String>)>(&self, change: F) -> Result<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        change(&mut records);
        self.persist(&records)
    }
}

fn poisoned() -> EngineError {
    EngineError::StorageError("file store lock poisoned".to_string())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|records| {
            records.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|records| {
            records.remove(key);
        })
    }

    fn clear(&self) -> Result<()> {
        self.update(|records| records.clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        {
            let store = FileStore::open(&path).unwrap();
            store.set("journal", "[1,2]").unwrap();
            store.set("session", "{}").unwrap();
            store.remove("session").unwrap();
        }
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("journal").unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(reopened.get("session").unwrap(), None);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_clear_empties_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();
        store.set("a", "1").unwrap();
        store.clear().unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("a").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "[not, an, object").unwrap();
        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, EngineError::StorageError(_)));
    }
}
