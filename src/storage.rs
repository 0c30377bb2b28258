use std::path::PathBuf;

use thiserror::Error;

use crate::models::session::StoredSession;

pub mod json;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to load session from '{path}': {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from '{path}': {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to save session to '{path}': {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize session to JSON: {source}")]
    SerializeFailed {
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to remove session file '{path}': {source}")]
    ClearFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Session file was written by a newer version of folio (version {0}). Please upgrade folio or log in again."
    )]
    FutureVersion(u32),
}

/// Key-value style persistence for the signed-in session
pub trait SessionStorage {
    fn load(&self) -> Result<StoredSession, StorageError>;
    fn save(&self, session: &StoredSession) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}
