//! Shared helpers used across the storage backends.

/// File name sanitization and path validation
pub mod path;
