//! The storage facade - one API over every backend.
//!
//! A [`Store`] routes a [`Location`] to the backend its tag names and
//! applies one typed encode/decode contract at the boundary. It is a
//! cheap cloneable handle; clones share the in-memory table.

use crate::backend::filesystem::{FileStore, ScopeRoots};
use crate::backend::memory::{self, MemoryCache};
use crate::backend::preferences::Preferences;
use crate::backend::response_cache::ResponseCache;
use crate::backend::vault::Vault;
use crate::error::StoreError;
use crate::location::{Backend, ClearLocation, FileScope, Location};
use serde::{Serialize, de::DeserializeOwned};
use std::path::PathBuf;
use tracing::debug;

use crate::Result;

/// Directory name the facade claims under each platform root.
const APP_DIR: &str = "polystore";

/// Service tag scoping vault entries to this crate.
const VAULT_SERVICE: &str = "polystore-vault";

/// Backend roots and settings for a [`Store`]. `resolve` derives them
/// from the platform conventions; tests inject their own.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub preferences_file: Option<PathBuf>,
    pub vault_service: String,
    pub disk_cache_dir: Option<PathBuf>,
    pub app_support_dir: Option<PathBuf>,
    pub documents_dir: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
    pub response_cache_dir: Option<PathBuf>,
    pub memory_capacity: usize,
}

impl StorePaths {
    /// Platform-conventional layout: config, cache, data and documents
    /// directories from the OS, each with a crate-owned subdirectory.
    /// A root the platform does not expose stays `None` and fails only
    /// when its scope is used.
    pub fn resolve() -> Self {
        let cache_dir = dirs::cache_dir().map(|d| d.join(APP_DIR));
        Self {
            preferences_file: dirs::config_dir()
                .map(|d| d.join(APP_DIR).join("preferences.json")),
            vault_service: VAULT_SERVICE.to_string(),
            response_cache_dir: cache_dir.as_ref().map(|d| d.join("response-cache")),
            disk_cache_dir: cache_dir,
            app_support_dir: dirs::data_dir().map(|d| d.join(APP_DIR)),
            documents_dir: dirs::document_dir().map(|d| d.join(APP_DIR)),
            temp_dir: Some(std::env::temp_dir().join(APP_DIR)),
            memory_capacity: memory::DEFAULT_CAPACITY,
        }
    }
}

/// Unified storage facade. Construct once at startup and hand the
/// clone around; there is no implicit global instance.
#[derive(Debug, Clone)]
pub struct Store {
    preferences: Preferences,
    vault: Vault,
    memory: MemoryCache,
    files: FileStore,
    responses: ResponseCache,
}

impl Store {
    /// Store over the platform-conventional directories.
    pub fn new() -> Self {
        Self::with_paths(StorePaths::resolve())
    }

    pub fn with_paths(paths: StorePaths) -> Self {
        Self {
            preferences: Preferences::new(paths.preferences_file),
            vault: Vault::new(paths.vault_service),
            memory: MemoryCache::new(paths.memory_capacity),
            files: FileStore::new(ScopeRoots {
                disk_cache: paths.disk_cache_dir,
                app_support: paths.app_support_dir,
                documents: paths.documents_dir,
                temporary: paths.temp_dir,
            }),
            responses: ResponseCache::new(paths.response_cache_dir),
        }
    }

    /// Save an encodable value to a location.
    ///
    /// Raw file kinds and the response cache take their own entry
    /// points ([`Store::save_raw`], [`Store::save_response`]).
    pub fn save<T: Serialize>(&self, to: &Location, value: &T) -> Result<()> {
        debug!(backend = %to.backend(), "save");
        match to {
            Location::Preferences { key } => self.preferences.save(key, value),
            Location::Vault { key } => self.vault.save(key, value),
            Location::Memory { key } => self.memory.save(key, value),
            Location::ResponseCache { .. } => Err(StoreError::InvalidDataToSave),
            other => {
                // file_target is Some for every remaining variant
                let (scope, name, kind) = other.file_target().ok_or(StoreError::InvalidDataToSave)?;
                self.files.save_value(scope, name, kind, value)
            }
        }
    }

    /// Save raw bytes to a raw-kind filesystem location, as-is, no codec.
    pub fn save_raw(&self, to: &Location, bytes: &[u8]) -> Result<()> {
        let (scope, name, kind) = to.file_target().ok_or(StoreError::InvalidDataToSave)?;
        self.files.save_raw(scope, name, kind, bytes)
    }

    /// Save the response bundle embedded in a response-cache location.
    pub fn save_response(&self, to: &Location) -> Result<()> {
        match to {
            Location::ResponseCache {
                request,
                body,
                session,
                metadata,
            } => self.responses.save(
                request,
                body.as_deref(),
                session.as_ref(),
                metadata.as_ref(),
            ),
            _ => Err(StoreError::InvalidDataToSave),
        }
    }

    /// Get a value, or `None` when the key is missing or the stored
    /// bytes do not decode.
    pub fn get<T: DeserializeOwned>(&self, of: &Location) -> Option<T> {
        self.fetch(of).ok().flatten()
    }

    /// Get a value, falling back to a default.
    pub fn get_or<T: DeserializeOwned>(&self, of: &Location, default: T) -> T {
        self.get(of).unwrap_or(default)
    }

    /// Strict get: a missing value is a `ValueNotRetrievable` failure,
    /// backend faults pass through unchanged.
    pub fn get_strict<T: DeserializeOwned>(&self, of: &Location) -> Result<T> {
        self.fetch(of)?.ok_or(StoreError::ValueNotRetrievable)
    }

    /// Get stored bytes without decoding: raw file kinds and cached
    /// response bodies.
    pub fn get_raw(&self, of: &Location) -> Option<Vec<u8>> {
        match of {
            Location::ResponseCache { request, .. } => {
                self.responses.get_raw(request).ok().flatten()
            }
            other => {
                let (scope, name, kind) = other.file_target()?;
                self.files.get_raw(scope, name, kind).ok().flatten()
            }
        }
    }

    /// Remove the value at a location.
    pub fn remove(&self, of: &Location) -> Result<()> {
        debug!(backend = %of.backend(), "remove");
        match of {
            Location::Preferences { key } => self.preferences.remove_keys(&[key.as_str()]),
            Location::Vault { key } => self.vault.remove(key),
            Location::Memory { key } => {
                self.memory.remove_keys(&[key.as_str()]);
                Ok(())
            }
            Location::ResponseCache { request, .. } => self.responses.remove(request),
            other => {
                let (scope, name, kind) = other.file_target().ok_or(StoreError::InvalidDataToSave)?;
                self.files.remove(scope, name, kind)
            }
        }
    }

    /// Wipe a whole backend or directory scope.
    pub fn remove_all(&self, of: ClearLocation) -> Result<()> {
        debug!(?of, "remove_all");
        match of {
            ClearLocation::Preferences => self.preferences.remove_all(),
            ClearLocation::Vault => self.vault.remove_all(),
            ClearLocation::Memory => {
                self.memory.remove_all();
                Ok(())
            }
            ClearLocation::ResponseCache => self.responses.remove_all(),
            ClearLocation::DiskCache => self.files.remove_all(FileScope::DiskCache),
            ClearLocation::AppSupport => self.files.remove_all(FileScope::AppSupport),
            ClearLocation::Documents => self.files.remove_all(FileScope::Documents),
            ClearLocation::Temporary => self.files.remove_all(FileScope::Temporary),
        }
    }

    /// Whether a value is stored at the location.
    pub fn exists(&self, at: &Location) -> bool {
        match at {
            Location::Preferences { key } => self.preferences.exists(key),
            Location::Vault { key } => self.vault.exists(key),
            Location::Memory { key } => self.memory.exists(key),
            Location::ResponseCache { request, .. } => self.responses.exists(request),
            other => other
                .file_target()
                .map(|(scope, name, kind)| self.files.exists(scope, name, kind))
                .unwrap_or(false),
        }
    }

    /// Move a value between two filesystem locations. Every other
    /// backend refuses to take part; the destination is checked first.
    pub fn move_item(&self, from: &Location, to: &Location) -> Result<()> {
        match to.backend() {
            Backend::Filesystem => {}
            backend => return Err(StoreError::UnsupportedMoveTo(backend)),
        }
        match from.backend() {
            Backend::Filesystem => {}
            backend => return Err(StoreError::UnsupportedMoveFrom(backend)),
        }

        let (Some(source), Some(dest)) = (from.file_target(), to.file_target()) else {
            return Err(StoreError::InvalidDestination);
        };
        self.files.move_item(source, dest)
    }

    fn fetch<T: DeserializeOwned>(&self, of: &Location) -> Result<Option<T>> {
        match of {
            Location::Preferences { key } => self.preferences.get(key),
            Location::Vault { key } => self.vault.get(key),
            Location::Memory { key } => self.memory.get(key),
            Location::ResponseCache { request, .. } => self.responses.get(request),
            other => {
                let (scope, name, kind) = other.file_target().ok_or(StoreError::ValueNotRetrievable)?;
                self.files.get_value(scope, name, kind)
            }
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{CacheRequest, CacheSession, FileKind, ResponseMetadata};
    use serde::{Deserialize, Serialize};
    use tempfile::{TempDir, tempdir};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Settings {
        theme: String,
        font_size: u8,
    }

    fn settings() -> Settings {
        Settings {
            theme: "dark".to_string(),
            font_size: 14,
        }
    }

    fn test_store(vault_service: &str) -> (Store, TempDir) {
        let dir = tempdir().expect("Failed to create temp dir");
        let paths = StorePaths {
            preferences_file: Some(dir.path().join("config/preferences.json")),
            vault_service: vault_service.to_string(),
            disk_cache_dir: Some(dir.path().join("cache")),
            app_support_dir: Some(dir.path().join("support")),
            documents_dir: Some(dir.path().join("documents")),
            temp_dir: Some(dir.path().join("tmp")),
            response_cache_dir: Some(dir.path().join("cache/response-cache")),
            memory_capacity: 64,
        };
        (Store::with_paths(paths), dir)
    }

    #[test]
    fn test_round_trip_across_backends() {
        let (store, _dir) = test_store("polystore-store-roundtrip");
        let value = settings();

        let locations = [
            Location::Preferences {
                key: "settings".to_string(),
            },
            Location::Vault {
                key: "settings".to_string(),
            },
            Location::Memory {
                key: "settings".to_string(),
            },
            Location::Documents {
                name: "settings".to_string(),
                kind: FileKind::Json,
            },
            Location::DiskCache {
                name: "settings".to_string(),
                kind: FileKind::Txt,
            },
        ];

        for location in &locations {
            store.save(location, &value).expect("save should succeed");
            let loaded: Settings = store.get(location).expect("value should be present");
            assert_eq!(loaded, value, "round trip failed for {:?}", location);
            assert!(store.exists(location));
        }
    }

    #[test]
    fn test_get_or_returns_default_when_absent() {
        let (store, _dir) = test_store("polystore-store-default");
        let location = Location::Memory {
            key: "missing".to_string(),
        };

        let loaded = store.get_or(&location, 7u32);
        assert_eq!(loaded, 7);
    }

    #[test]
    fn test_get_strict_fails_on_missing_value() {
        let (store, _dir) = test_store("polystore-store-strict");
        let location = Location::Preferences {
            key: "missing".to_string(),
        };

        let result: Result<String> = store.get_strict(&location);
        assert!(matches!(result, Err(StoreError::ValueNotRetrievable)));

        store.save(&location, &"present").expect("save should succeed");
        let loaded: String = store.get_strict(&location).expect("value should be present");
        assert_eq!(loaded, "present");
    }

    #[test]
    fn test_remove_then_exists_is_false_everywhere() {
        let (store, _dir) = test_store("polystore-store-remove");
        let locations = [
            Location::Preferences {
                key: "k".to_string(),
            },
            Location::Vault { key: "k".to_string() },
            Location::Memory { key: "k".to_string() },
            Location::Temporary {
                name: "k".to_string(),
                kind: FileKind::Json,
            },
        ];

        for location in &locations {
            store.save(location, &1).expect("save should succeed");
            assert!(store.exists(location));
            store.remove(location).expect("remove should succeed");
            assert!(!store.exists(location), "remove left {:?} behind", location);
        }
    }

    #[test]
    fn test_remove_all_clears_every_key_in_scope() {
        let (store, _dir) = test_store("polystore-store-clear");

        let prefs_a = Location::Preferences { key: "a".to_string() };
        let prefs_b = Location::Preferences { key: "b".to_string() };
        let mem = Location::Memory { key: "m".to_string() };
        let doc = Location::Documents {
            name: "folder/report".to_string(),
            kind: FileKind::Json,
        };

        for location in [&prefs_a, &prefs_b, &mem, &doc] {
            store.save(location, &1).expect("save should succeed");
        }

        store
            .remove_all(ClearLocation::Preferences)
            .expect("remove_all should succeed");
        store
            .remove_all(ClearLocation::Memory)
            .expect("remove_all should succeed");
        store
            .remove_all(ClearLocation::Documents)
            .expect("remove_all should succeed");

        for location in [&prefs_a, &prefs_b, &mem, &doc] {
            assert!(!store.exists(location), "{:?} survived remove_all", location);
        }
    }

    #[test]
    fn test_remove_all_vault_scope() {
        let (store, _dir) = test_store("polystore-store-clear-vault");
        let location = Location::Vault {
            key: "token".to_string(),
        };

        store.save(&location, &"secret").expect("save should succeed");
        store
            .remove_all(ClearLocation::Vault)
            .expect("remove_all should succeed");
        assert!(!store.exists(&location));
    }

    #[test]
    fn test_move_between_filesystem_scopes() {
        let (store, dir) = test_store("polystore-store-move");
        let from = Location::Temporary {
            name: "report".to_string(),
            kind: FileKind::Json,
        };
        let to = Location::Documents {
            name: "archive/report".to_string(),
            kind: FileKind::Json,
        };

        store.save(&from, &settings()).expect("save should succeed");
        let original =
            std::fs::read(dir.path().join("tmp/report.json")).expect("source should exist");

        store.move_item(&from, &to).expect("move should succeed");

        assert!(!store.exists(&from));
        let moved = std::fs::read(dir.path().join("documents/archive/report.json"))
            .expect("destination should exist");
        assert_eq!(moved, original, "move must preserve content bytes");
    }

    #[test]
    fn test_move_refuses_non_filesystem_backends() {
        let (store, _dir) = test_store("polystore-store-move-refuse");
        let file = Location::Documents {
            name: "report".to_string(),
            kind: FileKind::Json,
        };
        let memory = Location::Memory { key: "k".to_string() };
        let prefs = Location::Preferences { key: "k".to_string() };
        let vault = Location::Vault { key: "k".to_string() };

        assert!(matches!(
            store.move_item(&file, &memory),
            Err(StoreError::UnsupportedMoveTo(Backend::Memory))
        ));
        assert!(matches!(
            store.move_item(&prefs, &file),
            Err(StoreError::UnsupportedMoveFrom(Backend::Preferences))
        ));
        // Destination is checked before source
        assert!(matches!(
            store.move_item(&prefs, &vault),
            Err(StoreError::UnsupportedMoveTo(Backend::Vault))
        ));
    }

    #[test]
    fn test_move_missing_source_fails() {
        let (store, _dir) = test_store("polystore-store-move-missing");
        let from = Location::Temporary {
            name: "missing".to_string(),
            kind: FileKind::Json,
        };
        let to = Location::Documents {
            name: "report".to_string(),
            kind: FileKind::Json,
        };

        assert!(matches!(
            store.move_item(&from, &to),
            Err(StoreError::SourceNotFound { .. })
        ));
    }

    #[test]
    fn test_raw_jpeg_bytes_round_trip_unmodified() {
        let (store, dir) = test_store("polystore-store-raw");
        let location = Location::DiskCache {
            name: "photos/shot".to_string(),
            kind: FileKind::Jpg,
        };
        let bytes = [0xFFu8, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

        store.save_raw(&location, &bytes).expect("save should succeed");

        let on_disk =
            std::fs::read(dir.path().join("cache/photos/shot.jpg")).expect("file should exist");
        assert_eq!(on_disk, bytes);
        let loaded = store.get_raw(&location).expect("bytes should be present");
        assert_eq!(loaded, bytes);
    }

    #[test]
    fn test_typed_save_on_raw_kind_is_invalid() {
        let (store, _dir) = test_store("polystore-store-raw-invalid");
        let location = Location::Documents {
            name: "clip".to_string(),
            kind: FileKind::Mp4,
        };

        assert!(matches!(
            store.save(&location, &"clip data"),
            Err(StoreError::InvalidDataToSave)
        ));
    }

    #[test]
    fn test_save_raw_targets_filesystem_only() {
        let (store, _dir) = test_store("polystore-store-raw-scope");
        let location = Location::Memory { key: "k".to_string() };

        assert!(matches!(
            store.save_raw(&location, b"bytes"),
            Err(StoreError::InvalidDataToSave)
        ));
    }

    #[test]
    fn test_response_cache_end_to_end() {
        let (store, _dir) = test_store("polystore-store-responses");
        let request = CacheRequest::new("GET", "https://example.test/settings");
        let session = CacheSession::new();
        let body = serde_json::to_vec(&settings()).expect("payload should encode");

        let location = Location::ResponseCache {
            request: request.clone(),
            body: Some(body),
            session: Some(session.clone()),
            metadata: Some(ResponseMetadata {
                status: 200,
                url: "https://example.test/settings".to_string(),
                headers: Vec::new(),
            }),
        };

        store.save_response(&location).expect("save should succeed");
        assert!(session.prefers_cached());

        let lookup = Location::ResponseCache {
            request: request.clone(),
            body: None,
            session: None,
            metadata: None,
        };
        let loaded: Settings = store.get(&lookup).expect("entry should be present");
        assert_eq!(loaded, settings());
        assert!(store.exists(&lookup));

        store.remove(&lookup).expect("remove should succeed");
        assert!(!store.exists(&lookup));
    }

    #[test]
    fn test_save_response_requires_response_cache_location() {
        let (store, _dir) = test_store("polystore-store-responses-wrong");
        let location = Location::Memory { key: "k".to_string() };

        assert!(matches!(
            store.save_response(&location),
            Err(StoreError::InvalidDataToSave)
        ));
    }

    #[test]
    fn test_save_response_requires_full_bundle() {
        let (store, _dir) = test_store("polystore-store-responses-bundle");
        let location = Location::ResponseCache {
            request: CacheRequest::new("GET", "https://example.test/data"),
            body: Some(b"body".to_vec()),
            session: None,
            metadata: None,
        };

        assert!(matches!(
            store.save_response(&location),
            Err(StoreError::InvalidDataToSave)
        ));
    }

    #[test]
    fn test_typed_save_on_response_cache_is_invalid() {
        let (store, _dir) = test_store("polystore-store-responses-typed");
        let location = Location::ResponseCache {
            request: CacheRequest::new("GET", "https://example.test/data"),
            body: None,
            session: None,
            metadata: None,
        };

        assert!(matches!(
            store.save(&location, &1),
            Err(StoreError::InvalidDataToSave)
        ));
    }
}
