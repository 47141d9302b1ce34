//! Response-cache backend - request-keyed cache of response bytes.
//!
//! Entries live in a dedicated on-disk subdirectory as a body file plus
//! a metadata document, both named by the request's cache key. Saving
//! also configures the caller's session to prefer cached data and
//! installs the cache with the default capacity bounds.

use super::{Result, file_io};
use crate::error::StoreError;
use crate::location::{CacheConfig, CacheRequest, CacheSession, ResponseMetadata};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub(crate) const DEFAULT_MEMORY_CAPACITY: usize = 10_000_000;
pub(crate) const DEFAULT_DISK_CAPACITY: u64 = 1_000_000_000;

#[derive(Debug, Clone)]
pub(crate) struct ResponseCache {
    /// Dedicated subdirectory under the platform cache root, `None`
    /// when that root could not be resolved.
    dir: Option<PathBuf>,
}

impl ResponseCache {
    pub(crate) fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Store a response for a request. Body, session and metadata must
    /// all be present, otherwise the data is invalid to save.
    pub(crate) fn save(
        &self,
        request: &CacheRequest,
        body: Option<&[u8]>,
        session: Option<&CacheSession>,
        metadata: Option<&ResponseMetadata>,
    ) -> Result<()> {
        let (Some(body), Some(session), Some(metadata)) = (body, session, metadata) else {
            return Err(StoreError::InvalidDataToSave);
        };
        let dir = self.dir()?;

        session.install_cache(CacheConfig {
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            disk_capacity: DEFAULT_DISK_CAPACITY,
            directory: dir.clone(),
        });

        fs::create_dir_all(&dir).map_err(file_io(&dir))?;
        let key = request.cache_key();

        let meta_path = dir.join(format!("{key}.meta.json"));
        fs::write(&meta_path, serde_json::to_vec(metadata)?).map_err(file_io(&meta_path))?;

        let body_path = dir.join(format!("{key}.body"));
        fs::write(&body_path, body).map_err(file_io(&body_path))?;

        debug!(url = %request.url, len = body.len(), "cached response");
        Ok(())
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, request: &CacheRequest) -> Result<Option<T>> {
        match self.get_raw(request)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn get_raw(&self, request: &CacheRequest) -> Result<Option<Vec<u8>>> {
        let path = self.dir()?.join(format!("{}.body", request.cache_key()));
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(file_io(&path)(e)),
        }
    }

    pub(crate) fn metadata(&self, request: &CacheRequest) -> Result<Option<ResponseMetadata>> {
        let path = self
            .dir()?
            .join(format!("{}.meta.json", request.cache_key()));
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(file_io(&path)(e)),
        }
    }

    /// Delete the entry for one request; absent entries are a no-op.
    pub(crate) fn remove(&self, request: &CacheRequest) -> Result<()> {
        let dir = self.dir()?;
        let key = request.cache_key();
        for file in [format!("{key}.body"), format!("{key}.meta.json")] {
            let path = dir.join(file);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(file_io(&path)(e)),
            }
        }
        Ok(())
    }

    /// Wipe the whole cache directory.
    pub(crate) fn remove_all(&self) -> Result<()> {
        let dir = self.dir()?;
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(file_io(&dir))?;
        }
        Ok(())
    }

    pub(crate) fn exists(&self, request: &CacheRequest) -> bool {
        self.dir()
            .map(|dir| dir.join(format!("{}.body", request.cache_key())).exists())
            .unwrap_or(false)
    }

    fn dir(&self) -> Result<PathBuf> {
        self.dir
            .clone()
            .ok_or(StoreError::CreatePath { scope: "response cache" })
    }
}
