// In-memory store for tests and throwaway sessions
use super::KeyValueStore;
use crate::error::{EngineError, Result};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> EngineError {
    EngineError::StorageError("memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.clear();
        Ok(())
    }
}
