//! Key-value backends for persisted store snapshots.
//!
//! Stores write the persistable subset of their state under namespaced keys
//! (`roomly:room-seeking`) and read it back on startup. The in-memory backend
//! suits tests and short-lived processes; [`FileStorage`] keeps one file per
//! key in a directory.

mod file;
mod memory;

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

pub use file::FileStorage;
pub use memory::InMemoryStorage;

pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Failure of a storage backend.
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    InvalidKey(String),
    /// The value could not be encoded for storage.
    Encode(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "Storage I/O error: {err}"),
            StorageError::InvalidKey(key) => write!(f, "Invalid storage key: '{key}'"),
            StorageError::Encode(msg) => write!(f, "Storage encode error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(err) => Some(err),
            StorageError::InvalidKey(_) | StorageError::Encode(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

/// Pluggable key-value backend for persisted state.
pub trait StateStorage: Send + Sync + 'static {
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<Bytes>>;
    fn set<'a>(&'a self, key: &'a str, value: Bytes) -> StorageFuture<'a, ()>;
    fn remove<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;
    /// Remove every key starting with `prefix` (e.g. all keys of a namespace on logout).
    fn remove_by_prefix<'a>(&'a self, prefix: &'a str) -> StorageFuture<'a, ()>;
}

pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.len() > 200 {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
