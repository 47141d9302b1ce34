//! Preferences backend - one named JSON domain on disk.
//!
//! Values live in a single key-to-value document under the platform
//! config directory. Scalars are stored as native JSON scalars, richer
//! types as their encoded form, so the document stays readable.

use super::{Result, file_io};
use crate::error::StoreError;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone)]
pub(crate) struct Preferences {
    /// Path of the domain document, `None` when the platform exposes
    /// no config directory.
    path: Option<PathBuf>,
}

impl Preferences {
    pub(crate) fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub(crate) fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut table = self.load_table()?;
        table.insert(key.to_string(), serde_json::to_value(value)?);
        self.store_table(&table)
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut table = self.load_table()?;
        match table.remove(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Remove each key independently; absent keys are not an error.
    pub(crate) fn remove_keys(&self, keys: &[&str]) -> Result<()> {
        let mut table = self.load_table()?;
        let mut dirty = false;
        for key in keys {
            dirty |= table.remove(*key).is_some();
        }
        if dirty {
            self.store_table(&table)?;
        }
        Ok(())
    }

    /// Wipe the whole domain by deleting its document.
    pub(crate) fn remove_all(&self) -> Result<()> {
        let path = self.path()?;
        if path.exists() {
            fs::remove_file(path).map_err(file_io(path))?;
        }
        Ok(())
    }

    pub(crate) fn exists(&self, key: &str) -> bool {
        self.load_table()
            .map(|table| table.contains_key(key))
            .unwrap_or(false)
    }

    fn path(&self) -> Result<&Path> {
        self.path
            .as_deref()
            .ok_or(StoreError::CreatePath { scope: "preferences" })
    }

    fn load_table(&self) -> Result<BTreeMap<String, Value>> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read(path).map_err(file_io(path))?;
        Ok(serde_json::from_slice(&content)?)
    }

    fn store_table(&self, table: &BTreeMap<String, Value>) -> Result<()> {
        let path = self.path()?;
        let parent = path
            .parent()
            .ok_or(StoreError::CreatePath { scope: "preferences" })?;
        fs::create_dir_all(parent).map_err(file_io(parent))?;

        // Write-to-temp-then-rename keeps the domain document whole
        // even if the process dies mid-write.
        let tmp = NamedTempFile::new_in(parent).map_err(file_io(parent))?;
        serde_json::to_writer(&tmp, table)?;
        tmp.persist(path).map_err(|e| StoreError::FileIo {
            path: path.to_string_lossy().to_string(),
            source: e.error,
        })?;
        Ok(())
    }
}
