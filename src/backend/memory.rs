//! Memory backend - capacity-bounded process-memory table.
//!
//! One reader/writer lock guards the table: reads run concurrently,
//! saves and removals take exclusive access. When the table is full an
//! arbitrary entry is dropped, so callers must not rely on entries
//! surviving under pressure.

use super::Result;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

pub(crate) const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub(crate) struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    capacity: usize,
}

impl MemoryCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    pub(crate) fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let encoded = serde_json::to_vec(value)?;
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if !entries.contains_key(key) && entries.len() >= self.capacity {
            // Eviction is non-deterministic: whichever entry the table
            // yields first makes room.
            let evicted = entries.keys().next().cloned();
            if let Some(evicted) = evicted {
                entries.remove(&evicted);
            }
        }
        entries.insert(key.to_string(), encoded);
        Ok(())
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(encoded) => Ok(Some(serde_json::from_slice(encoded)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn remove_keys(&self, keys: &[&str]) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            entries.remove(*key);
        }
    }

    pub(crate) fn remove_all(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub(crate) fn exists(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}
