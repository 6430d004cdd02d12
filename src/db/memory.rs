use std::collections::HashMap;
use std::sync::Mutex;

use super::KeyValueStore;
use crate::error::{StorageError, StorageResult};

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}
