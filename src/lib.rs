//! polystore - one API over several storage media.
//!
//! Save or fetch a typed value against a [`Location`] instead of a
//! backend-specific API: process memory, a preferences domain, the OS
//! keyring, a request-keyed response cache, or the platform directory
//! scopes (cache, application support, documents, temporary).
//!
//! ```no_run
//! use polystore::{Location, Store};
//!
//! let store = Store::new();
//! let location = Location::Preferences { key: "theme".to_string() };
//! store.save(&location, &"dark")?;
//! let theme: Option<String> = store.get(&location);
//! # Ok::<(), polystore::StoreError>(())
//! ```

pub use error::StoreError;

/// Main layers (dependency flow: facade -> backends -> platform)
pub mod location; // Addressing: Location, ClearLocation, file kinds
pub mod store; // The facade and its dispatch

/// Support modules
pub mod error; // Error taxonomy
mod backend; // One adapter per storage medium
mod utils; // Sanitization helpers

pub use location::{
    Backend, CacheConfig, CacheRequest, CacheSession, ClearLocation, FileKind, FileScope, Location,
    ResponseMetadata,
};
pub use store::{Store, StorePaths};

pub type Result<T> = std::result::Result<T, StoreError>;
