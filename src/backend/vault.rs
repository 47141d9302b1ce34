//! Vault backend - secure credential storage through the OS keyring.
//!
//! Entries are scoped to one fixed service tag so the adapter never
//! touches keyring items created by other applications. The keyring
//! cannot enumerate items, so a per-service index entry tracks every
//! key written through here; `remove_all` walks that index.

use super::Result;
use crate::error::StoreError;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

#[cfg(not(test))]
use keyring::Entry;

/// Key of the hidden index entry listing live vault keys.
const INDEX_KEY: &str = "__polystore_index__";

#[derive(Debug, Clone)]
pub(crate) struct Vault {
    service: String,
}

impl Vault {
    pub(crate) fn new(service: String) -> Self {
        Self { service }
    }

    /// Add-or-update: an existing entry under the same key is replaced
    /// in place.
    pub(crate) fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let encoded = serde_json::to_string(value)?;
        write_entry(&self.service, key, &encoded)?;
        self.index_add(key)?;
        debug!(key, "saved vault entry");
        Ok(())
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match read_entry(&self.service, key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Delete by key; a no-op without error if the entry is absent.
    pub(crate) fn remove(&self, key: &str) -> Result<()> {
        delete_entry(&self.service, key)?;
        self.index_remove(key)
    }

    /// Delete every entry this adapter has written under its service tag.
    pub(crate) fn remove_all(&self) -> Result<()> {
        for key in self.index()? {
            delete_entry(&self.service, &key)?;
        }
        delete_entry(&self.service, INDEX_KEY)
    }

    pub(crate) fn exists(&self, key: &str) -> bool {
        matches!(read_entry(&self.service, key), Ok(Some(_)))
    }

    fn index(&self) -> Result<Vec<String>> {
        match read_entry(&self.service, INDEX_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn index_add(&self, key: &str) -> Result<()> {
        let mut keys = self.index()?;
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
            write_entry(&self.service, INDEX_KEY, &serde_json::to_string(&keys)?)?;
        }
        Ok(())
    }

    fn index_remove(&self, key: &str) -> Result<()> {
        let mut keys = self.index()?;
        let before = keys.len();
        keys.retain(|k| k != key);
        if keys.len() != before {
            write_entry(&self.service, INDEX_KEY, &serde_json::to_string(&keys)?)?;
        }
        Ok(())
    }
}

#[cfg(not(test))]
fn vault_error(key: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Vault {
        key: key.to_string(),
        message: err.to_string(),
    }
}

#[cfg(not(test))]
fn read_entry(service: &str, key: &str) -> Result<Option<String>> {
    let entry = Entry::new(service, key).map_err(|e| vault_error(key, e))?;
    match entry.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(vault_error(key, e)),
    }
}

#[cfg(not(test))]
fn write_entry(service: &str, key: &str, value: &str) -> Result<()> {
    let entry = Entry::new(service, key).map_err(|e| vault_error(key, e))?;
    // set_password updates an existing item under the same key instead
    // of failing on a duplicate.
    entry.set_password(value).map_err(|e| vault_error(key, e))
}

#[cfg(not(test))]
fn delete_entry(service: &str, key: &str) -> Result<()> {
    let entry = Entry::new(service, key).map_err(|e| vault_error(key, e))?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(vault_error(key, e)),
    }
}

// In-process keyring stand-in so unit tests never touch the real OS
// vault. Tests isolate themselves with distinct service names.
#[cfg(test)]
mod mock {
    use std::collections::HashMap;
    use std::sync::{Mutex, OnceLock, PoisonError};

    static TABLE: OnceLock<Mutex<HashMap<(String, String), String>>> = OnceLock::new();

    pub(super) fn with_table<R>(f: impl FnOnce(&mut HashMap<(String, String), String>) -> R) -> R {
        let mut table = TABLE
            .get_or_init(Default::default)
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut table)
    }
}

#[cfg(test)]
fn read_entry(service: &str, key: &str) -> Result<Option<String>> {
    Ok(mock::with_table(|table| {
        table.get(&(service.to_string(), key.to_string())).cloned()
    }))
}

#[cfg(test)]
fn write_entry(service: &str, key: &str, value: &str) -> Result<()> {
    mock::with_table(|table| {
        table.insert((service.to_string(), key.to_string()), value.to_string());
    });
    Ok(())
}

#[cfg(test)]
fn delete_entry(service: &str, key: &str) -> Result<()> {
    mock::with_table(|table| {
        table.remove(&(service.to_string(), key.to_string()));
    });
    Ok(())
}
