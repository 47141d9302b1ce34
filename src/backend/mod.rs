//! Storage backends behind the facade.
//!
//! One module per medium: preferences domain, secure vault, process
//! memory, filesystem scopes, and the request-keyed response cache.
//! Each backend handles its own marshalling; routing lives in
//! [`crate::store::Store`].

use crate::error::StoreError;
use std::path::Path;

pub mod filesystem;
pub mod memory;
pub mod preferences;
pub mod response_cache;
pub mod vault;

pub(crate) type Result<T> = std::result::Result<T, StoreError>;

/// Maps an I/O error to `StoreError::FileIo`, tagged with the path it hit.
pub(crate) fn file_io(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_string_lossy().to_string();
    move |source| StoreError::FileIo { path, source }
}
