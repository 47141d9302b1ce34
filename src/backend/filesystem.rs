//! Filesystem backend - files under the platform directory scopes.
//!
//! A location resolves to `<scope root>/<sanitized name>.<extension>`.
//! Raw kinds (jpg/png/mov/mp4) are written byte-for-byte; everything
//! else goes through the JSON codec and is written atomically.

use super::{Result, file_io};
use crate::error::StoreError;
use crate::location::{FileKind, FileScope};
use crate::utils::path::sanitize;
use serde::{Serialize, de::DeserializeOwned};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::trace;

/// Base directories for the four filesystem scopes. A `None` root means
/// the platform exposed no such directory; using that scope fails with
/// `CreatePath`.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScopeRoots {
    pub disk_cache: Option<PathBuf>,
    pub app_support: Option<PathBuf>,
    pub documents: Option<PathBuf>,
    pub temporary: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub(crate) struct FileStore {
    roots: ScopeRoots,
}

impl FileStore {
    pub(crate) fn new(roots: ScopeRoots) -> Self {
        Self { roots }
    }

    pub(crate) fn save_value<T: Serialize>(
        &self,
        scope: FileScope,
        name: &str,
        kind: FileKind,
        value: &T,
    ) -> Result<()> {
        if kind.is_raw() {
            // Raw kinds carry bytes, not encoded values
            return Err(StoreError::InvalidDataToSave);
        }
        let path = self.resolve(scope, name, kind, true)?;
        let parent = path.parent().ok_or(StoreError::InvalidDestination)?;

        let tmp = NamedTempFile::new_in(parent).map_err(file_io(parent))?;
        serde_json::to_writer(&tmp, value)?;
        tmp.persist(&path).map_err(|e| StoreError::FileIo {
            path: path.to_string_lossy().to_string(),
            source: e.error,
        })?;
        trace!(path = %path.display(), "wrote encoded file");
        Ok(())
    }

    pub(crate) fn save_raw(
        &self,
        scope: FileScope,
        name: &str,
        kind: FileKind,
        bytes: &[u8],
    ) -> Result<()> {
        if !kind.is_raw() {
            // Encoded kinds go through save_value and its atomic write
            return Err(StoreError::InvalidDataToSave);
        }
        let path = self.resolve(scope, name, kind, true)?;
        fs::write(&path, bytes).map_err(file_io(&path))?;
        trace!(path = %path.display(), len = bytes.len(), "wrote raw file");
        Ok(())
    }

    pub(crate) fn get_value<T: DeserializeOwned>(
        &self,
        scope: FileScope,
        name: &str,
        kind: FileKind,
    ) -> Result<Option<T>> {
        if kind.is_raw() {
            // Raw kinds are read through get_raw
            return Err(StoreError::ValueNotRetrievable);
        }
        match self.read_bytes(scope, name, kind)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn get_raw(
        &self,
        scope: FileScope,
        name: &str,
        kind: FileKind,
    ) -> Result<Option<Vec<u8>>> {
        self.read_bytes(scope, name, kind)
    }

    pub(crate) fn remove(&self, scope: FileScope, name: &str, kind: FileKind) -> Result<()> {
        let path = self.resolve(scope, name, kind, false)?;
        fs::remove_file(&path).map_err(file_io(&path))
    }

    /// One flat listing of the scope root; each listed entry is removed,
    /// directories together with their contents.
    pub(crate) fn remove_all(&self, scope: FileScope) -> Result<()> {
        let root = self.root(scope)?;
        if !root.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(root).map_err(file_io(root))? {
            let entry = entry.map_err(file_io(root))?;
            let path = entry.path();
            if path.is_dir() {
                fs::remove_dir_all(&path).map_err(file_io(&path))?;
            } else {
                fs::remove_file(&path).map_err(file_io(&path))?;
            }
        }
        Ok(())
    }

    pub(crate) fn exists(&self, scope: FileScope, name: &str, kind: FileKind) -> bool {
        self.resolve(scope, name, kind, false)
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Filesystem-to-filesystem move. The destination must be
    /// constructible and the source must exist.
    pub(crate) fn move_item(
        &self,
        from: (FileScope, &str, FileKind),
        to: (FileScope, &str, FileKind),
    ) -> Result<()> {
        let source = self.resolve(from.0, from.1, from.2, false)?;
        if !source.exists() {
            return Err(StoreError::SourceNotFound {
                path: source.to_string_lossy().to_string(),
            });
        }

        let dest = self
            .resolve(to.0, to.1, to.2, true)
            .map_err(|_| StoreError::InvalidDestination)?;
        match fs::rename(&source, &dest) {
            Ok(()) => Ok(()),
            // A rename cannot cross filesystem boundaries, and the
            // temporary scope often sits on its own mount; copy the
            // content over and drop the source instead.
            Err(e) if e.kind() == ErrorKind::CrossesDevices => {
                fs::copy(&source, &dest).map_err(file_io(&dest))?;
                fs::remove_file(&source).map_err(file_io(&source))
            }
            Err(e) => Err(StoreError::FileIo {
                path: format!("{} -> {}", source.display(), dest.display()),
                source: e,
            }),
        }
    }

    fn root(&self, scope: FileScope) -> Result<&PathBuf> {
        let root = match scope {
            FileScope::DiskCache => self.roots.disk_cache.as_ref(),
            FileScope::AppSupport => self.roots.app_support.as_ref(),
            FileScope::Documents => self.roots.documents.as_ref(),
            FileScope::Temporary => self.roots.temporary.as_ref(),
        };
        root.ok_or(StoreError::CreatePath {
            scope: scope.label(),
        })
    }

    /// Scope root + sanitized relative path + extension. Ensures the
    /// parent directory chain on every write, not just the first.
    fn resolve(
        &self,
        scope: FileScope,
        name: &str,
        kind: FileKind,
        make_dirs: bool,
    ) -> Result<PathBuf> {
        let root = self.root(scope)?;
        let relative = sanitize(name)?;
        let path = root.join(kind.file_name(&relative));

        if make_dirs {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(file_io(parent))?;
            }
        }
        Ok(path)
    }

    fn read_bytes(&self, scope: FileScope, name: &str, kind: FileKind) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(scope, name, kind, false)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(file_io(&path)(e)),
        }
    }
}
