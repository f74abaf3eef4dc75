use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;

use crate::{check_key, StateStorage, StorageFuture};

/// In-memory storage backed by `DashMap`. Cloning shares the same entries.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    inner: Arc<DashMap<String, Bytes>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl StateStorage for InMemoryStorage {
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<Bytes>> {
        Box::pin(async move { Ok(self.inner.get(key).map(|entry| entry.value().clone())) })
    }

    fn set<'a>(&'a self, key: &'a str, value: Bytes) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            check_key(key)?;
            self.inner.insert(key.to_string(), value);
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.inner.remove(key);
            Ok(())
        })
    }

    fn remove_by_prefix<'a>(&'a self, prefix: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.inner.retain(|k, _| !k.starts_with(prefix));
            Ok(())
        })
    }
}
