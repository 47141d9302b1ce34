use crate::location::Backend;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("could not resolve a path for the {scope} directory")]
    CreatePath { scope: &'static str },
    #[error("`{name}` is an invalid file name")]
    InvalidFileName { name: String },
    #[error("invalid data to save")]
    InvalidDataToSave,
    #[error("value could not be retrieved")]
    ValueNotRetrievable,
    #[error("no value exists at source path {path}")]
    SourceNotFound { path: String },
    #[error("destination path could not be constructed")]
    InvalidDestination,
    #[error("values cannot be moved from the {0} backend")]
    UnsupportedMoveFrom(Backend),
    #[error("values cannot be moved to the {0} backend")]
    UnsupportedMoveTo(Backend),
    #[error("file I/O error at {path}: {source}")]
    FileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("vault access failed for key `{key}`: {message}; use a different key or unlock the vault")]
    Vault { key: String, message: String },
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}
