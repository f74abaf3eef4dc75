use std::sync::Arc;

use bytes::Bytes;
use roomly_cache::{FileStorage, InMemoryStorage, StateStorage, StorageError};
use roomly_core::ClientConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Persists the durable subset of store state as JSON under
/// `{namespace}:{store}`.
///
/// Snapshot types carry only persistable fields; loading/error flags and
/// request bookkeeping never reach storage.
#[derive(Clone)]
pub struct Snapshots {
    storage: Arc<dyn StateStorage>,
    namespace: String,
}

impl Snapshots {
    pub fn new(storage: Arc<dyn StateStorage>, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    /// In-memory snapshots, lost on exit.
    pub fn in_memory(namespace: impl Into<String>) -> Self {
        Self::new(Arc::new(InMemoryStorage::new()), namespace)
    }

    /// File-backed snapshots when a storage directory is configured,
    /// in-memory otherwise.
    pub async fn from_config(config: &ClientConfig) -> Result<Self, StorageError> {
        let storage: Arc<dyn StateStorage> = match &config.storage_dir {
            Some(dir) => Arc::new(FileStorage::open(dir.clone()).await?),
            None => Arc::new(InMemoryStorage::new()),
        };
        Ok(Self::new(storage, config.storage_namespace.clone()))
    }

    pub fn key(&self, store: &str) -> String {
        format!("{}:{}", self.namespace, store)
    }

    pub async fn save<S: Serialize>(&self, store: &str, snapshot: &S) -> Result<(), StorageError> {
        let json = serde_json::to_vec(snapshot).map_err(|e| StorageError::Encode(e.to_string()))?;
        self.storage.set(&self.key(store), Bytes::from(json)).await
    }

    /// Read a snapshot back. Missing, unreadable and corrupt snapshots all
    /// yield `None`; the latter two are logged.
    pub async fn load<S: DeserializeOwned>(&self, store: &str) -> Option<S> {
        let key = self.key(store);
        let bytes = match self.storage.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "failed to read snapshot");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "ignoring corrupt snapshot");
                None
            }
        }
    }

    pub async fn remove(&self, store: &str) -> Result<(), StorageError> {
        self.storage.remove(&self.key(store)).await
    }

    /// Drop every snapshot of this namespace (e.g. on sign-out).
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage
            .remove_by_prefix(&format!("{}:", self.namespace))
            .await
    }
}
