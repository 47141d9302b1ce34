//! Location types - addressing for the storage facade
//!
//! A [`Location`] names one storage target and the key/path within it.
//! [`ClearLocation`] names a whole backend or directory scope to wipe.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// File kind of a filesystem location. Determines the extension and
/// whether the payload is raw bytes or an encoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Html,
    Json,
    Txt,
    Jpg,
    Png,
    Mov,
    Mp4,
}

impl FileKind {
    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Html => "html",
            FileKind::Json => "json",
            FileKind::Txt => "txt",
            FileKind::Jpg => "jpg",
            FileKind::Png => "png",
            FileKind::Mov => "mov",
            FileKind::Mp4 => "mp4",
        }
    }

    /// Raw kinds are written and read as-is, with no codec applied.
    pub fn is_raw(&self) -> bool {
        matches!(
            self,
            FileKind::Jpg | FileKind::Png | FileKind::Mov | FileKind::Mp4
        )
    }

    /// Relative file name for a logical name, e.g. `folder/sample` -> `folder/sample.json`
    pub fn file_name(&self, name: &str) -> String {
        format!("{}.{}", name, self.extension())
    }
}

/// Base-directory scope for filesystem locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileScope {
    DiskCache,
    AppSupport,
    Documents,
    Temporary,
}

impl FileScope {
    pub fn label(&self) -> &'static str {
        match self {
            FileScope::DiskCache => "disk cache",
            FileScope::AppSupport => "application support",
            FileScope::Documents => "documents",
            FileScope::Temporary => "temporary",
        }
    }
}

/// Backend tag, used for dispatch errors such as unsupported moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Preferences,
    Vault,
    Memory,
    ResponseCache,
    Filesystem,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::Preferences => "preferences",
            Backend::Vault => "vault",
            Backend::Memory => "memory cache",
            Backend::ResponseCache => "response cache",
            Backend::Filesystem => "filesystem",
        };
        write!(f, "{}", name)
    }
}

/// Descriptor of an outgoing request, the key of the response cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl CacheRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Stable on-disk key derived from method, URL and headers.
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.method.as_bytes());
        hasher.update(b"\n");
        hasher.update(self.url.as_bytes());
        for (name, value) in &self.headers {
            hasher.update(b"\n");
            hasher.update(name.as_bytes());
            hasher.update(b":");
            hasher.update(value.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Response envelope stored next to cached body bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub status: u16,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// Cache settings installed into a [`CacheSession`] on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub memory_capacity: usize,
    pub disk_capacity: u64,
    pub directory: PathBuf,
}

/// Handle to the caller's network session configuration.
///
/// Saving into the response cache flips the session to prefer cached
/// data and records the installed cache location and capacities.
#[derive(Debug, Clone, Default)]
pub struct CacheSession {
    inner: Arc<Mutex<SessionState>>,
}

#[derive(Debug, Default)]
struct SessionState {
    prefer_cached: bool,
    cache: Option<CacheConfig>,
}

impl CacheSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefers_cached(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .prefer_cached
    }

    pub fn cache_config(&self) -> Option<CacheConfig> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cache
            .clone()
    }

    pub(crate) fn install_cache(&self, config: CacheConfig) {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.prefer_cached = true;
        state.cache = Some(config);
    }
}

/// Storage target plus the key/path within it. Exactly one variant is
/// active per value; dispatch in the facade is a match over the tag.
#[derive(Debug, Clone)]
pub enum Location {
    /// Key in the preferences domain
    Preferences { key: String },

    /// Key in the secure credential vault
    Vault { key: String },

    /// Key in the process-memory cache
    Memory { key: String },

    /// Request-keyed entry in the response cache. The save bundle
    /// (body, session, metadata) rides along in the location.
    ResponseCache {
        request: CacheRequest,
        body: Option<Vec<u8>>,
        session: Option<CacheSession>,
        metadata: Option<ResponseMetadata>,
    },

    /// File under the platform cache directory
    DiskCache { name: String, kind: FileKind },

    /// File under the platform application-support directory
    AppSupport { name: String, kind: FileKind },

    /// File under the user documents directory
    Documents { name: String, kind: FileKind },

    /// File under the temporary directory
    Temporary { name: String, kind: FileKind },
}

impl Location {
    pub fn backend(&self) -> Backend {
        match self {
            Location::Preferences { .. } => Backend::Preferences,
            Location::Vault { .. } => Backend::Vault,
            Location::Memory { .. } => Backend::Memory,
            Location::ResponseCache { .. } => Backend::ResponseCache,
            Location::DiskCache { .. }
            | Location::AppSupport { .. }
            | Location::Documents { .. }
            | Location::Temporary { .. } => Backend::Filesystem,
        }
    }

    /// File kind of a filesystem location, `None` for other backends.
    pub fn kind(&self) -> Option<FileKind> {
        self.file_target().map(|(_, _, kind)| kind)
    }

    /// Scope, logical name and kind of a filesystem location.
    pub(crate) fn file_target(&self) -> Option<(FileScope, &str, FileKind)> {
        match self {
            Location::DiskCache { name, kind } => Some((FileScope::DiskCache, name, *kind)),
            Location::AppSupport { name, kind } => Some((FileScope::AppSupport, name, *kind)),
            Location::Documents { name, kind } => Some((FileScope::Documents, name, *kind)),
            Location::Temporary { name, kind } => Some((FileScope::Temporary, name, *kind)),
            Location::Preferences { .. }
            | Location::Vault { .. }
            | Location::Memory { .. }
            | Location::ResponseCache { .. } => None,
        }
    }
}

/// Whole backend or directory scope to wipe. No per-key addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearLocation {
    Preferences,
    Vault,
    Memory,
    ResponseCache,
    DiskCache,
    AppSupport,
    Documents,
    Temporary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_extension_and_rawness() {
        assert_eq!(FileKind::Json.extension(), "json");
        assert_eq!(FileKind::Jpg.extension(), "jpg");
        assert!(!FileKind::Json.is_raw());
        assert!(!FileKind::Html.is_raw());
        assert!(!FileKind::Txt.is_raw());
        assert!(FileKind::Jpg.is_raw());
        assert!(FileKind::Png.is_raw());
        assert!(FileKind::Mov.is_raw());
        assert!(FileKind::Mp4.is_raw());
    }

    #[test]
    fn test_file_kind_file_name() {
        assert_eq!(
            FileKind::Json.file_name("folder/sample"),
            "folder/sample.json"
        );
        assert_eq!(FileKind::Png.file_name("avatar"), "avatar.png");
    }

    #[test]
    fn test_location_backend_tags() {
        let loc = Location::Preferences {
            key: "k".to_string(),
        };
        assert_eq!(loc.backend(), Backend::Preferences);
        let loc = Location::Documents {
            name: "n".to_string(),
            kind: FileKind::Txt,
        };
        assert_eq!(loc.backend(), Backend::Filesystem);
        assert_eq!(loc.kind(), Some(FileKind::Txt));
        let loc = Location::Memory {
            key: "k".to_string(),
        };
        assert_eq!(loc.kind(), None);
    }

    #[test]
    fn test_cache_key_is_stable_and_header_sensitive() {
        let a = CacheRequest::new("GET", "https://example.test/data");
        let b = CacheRequest::new("GET", "https://example.test/data");
        assert_eq!(a.cache_key(), b.cache_key());

        let c = CacheRequest::new("GET", "https://example.test/data").header("Accept", "text/html");
        assert_ne!(a.cache_key(), c.cache_key());

        let d = CacheRequest::new("POST", "https://example.test/data");
        assert_ne!(a.cache_key(), d.cache_key());
    }

    #[test]
    fn test_session_install_cache_flips_preference() {
        let session = CacheSession::new();
        assert!(!session.prefers_cached());
        assert!(session.cache_config().is_none());

        session.install_cache(CacheConfig {
            memory_capacity: 1024,
            disk_capacity: 4096,
            directory: PathBuf::from("/tmp/cache"),
        });

        assert!(session.prefers_cached());
        let config = session
            .cache_config()
            .expect("cache config should be installed");
        assert_eq!(config.memory_capacity, 1024);
        assert_eq!(config.disk_capacity, 4096);
    }
}
