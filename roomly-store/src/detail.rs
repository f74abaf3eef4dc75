use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use roomly_core::{extract_error_message, ApiError, DEFAULT_ERROR_MESSAGE};
use roomly_data::{normalize_one, Entity};
use roomly_http::{item_path, ApiCall, ApiRequest};
use tokio::sync::watch;

use crate::state::{RequestState, SyncOutcome};

/// Observable state of a [`DetailSlot`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetailState<T> {
    pub record: Option<T>,
    pub request: RequestState,
}

impl<T> Default for DetailState<T> {
    fn default() -> Self {
        Self {
            record: None,
            request: RequestState::default(),
        }
    }
}

struct Inner<T> {
    api: Arc<dyn ApiCall>,
    path: String,
    fallback: String,
    state: watch::Sender<DetailState<T>>,
    /// Id of the latest load; older responses are dropped.
    latest: Mutex<u64>,
}

impl<T> Inner<T> {
    fn latest(&self) -> MutexGuard<'_, u64> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drops the loading flag if a load future is dropped before settling.
struct Pending<'a, T> {
    inner: &'a Inner<T>,
    id: u64,
    armed: bool,
}

impl<T> Drop for Pending<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let latest = self.inner.latest();
        if *latest == self.id {
            self.inner.state.send_modify(|s| s.request.abandon());
        }
    }
}

/// The currently viewed record, independent of any list.
pub struct DetailSlot<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for DetailSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Entity> DetailSlot<T> {
    /// Slot loading records from `GET {path}/{id}`.
    pub fn new(api: Arc<dyn ApiCall>, path: impl Into<String>) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self {
            inner: Arc::new(Inner {
                api,
                path: path.into(),
                fallback: DEFAULT_ERROR_MESSAGE.to_string(),
                state,
                latest: Mutex::new(0),
            }),
        }
    }

    /// Must be called before the handle is cloned.
    pub fn with_fallback(mut self, message: impl Into<String>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.fallback = message.into();
        }
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState<T>> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> DetailState<T> {
        self.inner.state.borrow().clone()
    }

    pub fn record(&self) -> Option<T> {
        self.inner.state.borrow().record.clone()
    }

    /// Fetch the record with `id`.
    ///
    /// A record for another id is dropped on failure so the slot never
    /// shows the wrong entity next to the error.
    pub async fn load(&self, id: &T::Id) -> SyncOutcome {
        let request = ApiRequest::get(item_path(&self.inner.path, id));
        let outcome = self.load_request(request).await;
        if matches!(outcome, SyncOutcome::Failed(_)) {
            self.inner.state.send_if_modified(|s| {
                if s.record.as_ref().is_some_and(|r| r.id() != id) {
                    s.record = None;
                    return true;
                }
                false
            });
        }
        outcome
    }

    /// Fetch the record with a custom request.
    pub async fn load_request(&self, request: ApiRequest) -> SyncOutcome {
        let inner = &*self.inner;
        let id = {
            let mut latest = inner.latest();
            *latest += 1;
            inner.state.send_modify(|s| s.request.begin());
            *latest
        };

        let what = request.describe();
        let mut pending = Pending {
            inner,
            id,
            armed: true,
        };
        let result = match inner.api.call(request).await {
            Ok(raw) => normalize_one::<T>(raw).map_err(ApiError::from),
            Err(err) => Err(err),
        };
        pending.armed = false;

        let latest = inner.latest();
        if *latest != id {
            tracing::debug!(request = %what, "stale detail response dropped");
            return SyncOutcome::Superseded;
        }
        match result {
            Ok(record) => {
                inner.state.send_modify(|s| {
                    s.record = Some(record);
                    s.request.succeed();
                });
                SyncOutcome::Applied
            }
            Err(err) => {
                let message = extract_error_message(&err, &inner.fallback);
                tracing::warn!(request = %what, error = %err, "detail load failed");
                inner.state.send_modify(|s| s.request.fail(message.clone()));
                SyncOutcome::Failed(message)
            }
        }
    }

    /// Store a record obtained elsewhere (e.g. a mutation response).
    pub fn set(&self, record: T) {
        let mut latest = self.inner.latest();
        *latest += 1;
        self.inner.state.send_replace(DetailState {
            record: Some(record),
            request: RequestState::default(),
        });
    }

    /// Replace the record if it has the same id. Returns whether it did.
    pub fn replace_if_same(&self, record: T) -> bool {
        self.inner.state.send_if_modified(|s| match &s.record {
            Some(current) if current.id() == record.id() => {
                s.record = Some(record);
                true
            }
            _ => false,
        })
    }

    /// Clear the slot if it holds `id`.
    pub fn clear_if(&self, id: &T::Id) -> bool {
        let holds = self
            .inner
            .state
            .borrow()
            .record
            .as_ref()
            .is_some_and(|r| r.id() == id);
        if holds {
            self.clear();
        }
        holds
    }

    /// Reset the slot and drop any pending load.
    pub fn clear(&self) {
        let mut latest = self.inner.latest();
        *latest += 1;
        self.inner.state.send_replace(DetailState::default());
    }
}
