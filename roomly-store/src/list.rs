//! Paginated list slice with replace/append reconciliation.
//!
//! A replace search swaps the collection for a fresh first result; an append
//! extends it with the next page. Identical replace searches are issued once,
//! newer replace searches cancel older ones, and a response that is no longer
//! the latest is dropped on arrival.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use roomly_core::{extract_error_message, ApiError, DEFAULT_ERROR_MESSAGE};
use roomly_data::{normalize_page, Entity, Page, PageRequest, PaginationCursor};
use roomly_http::{ApiCall, ApiRequest};
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::query::ListQuery;
use crate::state::{RequestState, SyncOutcome};

/// Observable state of a [`PagedList`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T, F> {
    /// Items in fetch order: page 1, then page 2, ...
    pub items: Vec<T>,
    /// Cursor of the last applied page; `None` before the first success.
    pub cursor: Option<PaginationCursor>,
    /// Query of the last applied page.
    pub query: Option<ListQuery<F>>,
    /// Replace-search flags. Appends only ever touch `error`.
    pub request: RequestState,
    pub loading_more: bool,
}

impl<T, F> Default for ListState<T, F> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            query: None,
            request: RequestState::default(),
            loading_more: false,
        }
    }
}

impl<T, F> ListState<T, F> {
    pub fn has_next(&self) -> bool {
        self.cursor.as_ref().is_some_and(|c| c.has_next)
    }
}

struct InFlight {
    id: u64,
    key: String,
    token: CancellationToken,
}

struct RunningAppend {
    id: u64,
    token: CancellationToken,
}

enum LastOp<F> {
    Replace(ListQuery<F>),
    Append(ListQuery<F>),
}

/// Bookkeeping that never reaches subscribers.
struct Guard<F> {
    next_id: u64,
    in_flight: Option<InFlight>,
    /// Key of the last replace search that was applied successfully.
    settled_key: Option<String>,
    append: Option<RunningAppend>,
    last_op: Option<LastOp<F>>,
}

impl<F> Guard<F> {
    fn issue_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

struct Inner<T, F> {
    api: Arc<dyn ApiCall>,
    path: String,
    fallback: String,
    state: watch::Sender<ListState<T, F>>,
    guard: Mutex<Guard<F>>,
}

impl<T, F> Inner<T, F> {
    fn guard(&self) -> MutexGuard<'_, Guard<F>> {
        self.guard.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a paginated list. Clones share the same state.
pub struct PagedList<T, F> {
    inner: Arc<Inner<T, F>>,
}

impl<T, F> Clone for PagedList<T, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Resets the owning flag if a request future is dropped before settling.
struct Pending<'a, T, F> {
    inner: &'a Inner<T, F>,
    id: u64,
    append: bool,
    armed: bool,
}

impl<T, F> Pending<'_, T, F> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<T, F> Drop for Pending<'_, T, F> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut guard = self.inner.guard();
        if self.append {
            if guard.append.as_ref().is_some_and(|a| a.id == self.id) {
                guard.append = None;
                self.inner.state.send_modify(|s| s.loading_more = false);
            }
        } else if guard.in_flight.as_ref().is_some_and(|f| f.id == self.id) {
            guard.in_flight = None;
            self.inner.state.send_modify(|s| s.request.abandon());
        }
    }
}

impl<T, F> PagedList<T, F>
where
    T: Entity,
    F: Serialize + Clone + Send + Sync + 'static,
{
    /// List backed by `GET {path}`.
    pub fn new(api: Arc<dyn ApiCall>, path: impl Into<String>) -> Self {
        let (state, _) = watch::channel(ListState::default());
        Self {
            inner: Arc::new(Inner {
                api,
                path: path.into(),
                fallback: DEFAULT_ERROR_MESSAGE.to_string(),
                state,
                guard: Mutex::new(Guard {
                    next_id: 0,
                    in_flight: None,
                    settled_key: None,
                    append: None,
                    last_op: None,
                }),
            }),
        }
    }

    /// Message stored when a failure carries no displayable text.
    ///
    /// Must be called before the handle is cloned.
    pub fn with_fallback(mut self, message: impl Into<String>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.fallback = message.into();
        }
        self
    }

    pub fn path(&self) -> &str {
        &self.inner.path
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<T, F>> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> ListState<T, F> {
        self.inner.state.borrow().clone()
    }

    /// Fetch `query`, replacing the collection or appending to it.
    pub async fn search(&self, query: ListQuery<F>, append: bool) -> SyncOutcome {
        if append {
            self.append(query).await
        } else {
            self.replace(query, false).await
        }
    }

    /// Replace the collection with `query`, or with `append` fetch the page
    /// after the current cursor using `query`'s filters and limit.
    ///
    /// `query.page` is ignored when appending. An append with nothing loaded
    /// yet runs as a replace; one past the last page is skipped.
    pub async fn load(&self, query: ListQuery<F>, append: bool) -> SyncOutcome {
        if !append {
            return self.replace(query, false).await;
        }
        let next = {
            let state = self.inner.state.borrow();
            match &state.cursor {
                Some(cursor) if cursor.has_next => Some(query.at_page(cursor.page + 1)),
                Some(_) => return SyncOutcome::Skipped,
                None => None,
            }
        };
        match next {
            Some(next) => self.append(next).await,
            None => self.replace(query.at_page(1), false).await,
        }
    }

    /// Append the page after the current cursor, if there is one.
    pub async fn load_more(&self) -> SyncOutcome {
        let next = {
            let state = self.inner.state.borrow();
            match (&state.query, &state.cursor) {
                (Some(query), Some(cursor)) if cursor.has_next => query.at_page(cursor.page + 1),
                _ => return SyncOutcome::Skipped,
            }
        };
        self.append(next).await
    }

    /// Re-issue the current query from page 1, bypassing de-duplication.
    pub async fn refresh(&self) -> SyncOutcome {
        let query = {
            let state = self.inner.state.borrow();
            state.query.as_ref().map(|q| q.at_page(1))
        };
        let query = query.or_else(|| match &self.inner.guard().last_op {
            Some(LastOp::Replace(q)) | Some(LastOp::Append(q)) => Some(q.at_page(1)),
            None => None,
        });
        match query {
            Some(query) => self.replace(query, true).await,
            None => SyncOutcome::Skipped,
        }
    }

    /// Re-invoke the last attempted search.
    pub async fn retry(&self) -> SyncOutcome {
        let last = match &self.inner.guard().last_op {
            Some(LastOp::Replace(q)) => Some((q.clone(), false)),
            Some(LastOp::Append(q)) => Some((q.clone(), true)),
            None => None,
        };
        match last {
            Some((query, append)) => self.search(query, append).await,
            None => SyncOutcome::Skipped,
        }
    }

    /// Cancel any request and reset to the empty state.
    pub fn clear(&self) {
        let mut guard = self.inner.guard();
        if let Some(flight) = guard.in_flight.take() {
            flight.token.cancel();
        }
        if let Some(append) = guard.append.take() {
            append.token.cancel();
        }
        guard.settled_key = None;
        guard.last_op = None;
        self.inner.state.send_replace(ListState::default());
    }

    /// Put back a persisted collection. Does not count as a settled search,
    /// so the next search for the same query is still issued.
    pub fn restore(&self, items: Vec<T>, cursor: Option<PaginationCursor>) {
        self.inner.state.send_modify(|s| {
            s.items = items;
            s.cursor = cursor;
        });
    }

    /// Insert a backend-confirmed record at the head of the collection.
    pub fn prepend(&self, item: T) {
        self.inner.state.send_modify(|s| {
            s.items.insert(0, item);
            if let Some(cursor) = s.cursor.as_mut() {
                cursor.adjust_total(1);
            }
        });
    }

    /// Replace the record with the same id. Returns whether one was found.
    pub fn replace_by_id(&self, item: T) -> bool {
        self.inner.state.send_if_modified(|s| {
            match s.items.iter_mut().find(|existing| existing.id() == item.id()) {
                Some(slot) => {
                    *slot = item;
                    true
                }
                None => false,
            }
        })
    }

    /// Remove the record with `id`. Returns whether one was found.
    pub fn remove_by_id(&self, id: &T::Id) -> bool {
        self.inner.state.send_if_modified(|s| {
            let before = s.items.len();
            s.items.retain(|item| item.id() != id);
            let removed = before - s.items.len();
            if removed == 0 {
                return false;
            }
            if let Some(cursor) = s.cursor.as_mut() {
                cursor.adjust_total(-(removed as i64));
            }
            true
        })
    }

    async fn replace(&self, query: ListQuery<F>, force: bool) -> SyncOutcome {
        let inner = &*self.inner;
        let key = match query.fingerprint() {
            Ok(key) => key,
            Err(err) => return self.fail_replace(&err),
        };

        let (id, token) = {
            let mut guard = inner.guard();
            guard.last_op = Some(LastOp::Replace(query.clone()));
            if !force {
                let duplicate = match &guard.in_flight {
                    Some(flight) => flight.key == key,
                    None => guard.settled_key.as_deref() == Some(key.as_str()),
                };
                if duplicate {
                    tracing::debug!(path = %inner.path, key = %key, "duplicate search skipped");
                    return SyncOutcome::Skipped;
                }
            }
            if let Some(previous) = guard.in_flight.take() {
                tracing::debug!(path = %inner.path, superseded = previous.id, "cancelling older search");
                previous.token.cancel();
            }
            if let Some(append) = guard.append.take() {
                append.token.cancel();
            }
            let id = guard.issue_id();
            let token = CancellationToken::new();
            guard.in_flight = Some(InFlight {
                id,
                key: key.clone(),
                token: token.clone(),
            });
            guard.settled_key = None;
            inner.state.send_modify(|s| {
                s.request.begin();
                s.loading_more = false;
            });
            (id, token)
        };

        let mut pending = Pending {
            inner,
            id,
            append: false,
            armed: true,
        };
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                pending.disarm();
                return SyncOutcome::Superseded;
            }
            result = self.fetch(&query) => result,
        };
        pending.disarm();

        let mut guard = inner.guard();
        if !guard.in_flight.as_ref().is_some_and(|f| f.id == id) {
            tracing::debug!(path = %inner.path, id, "stale search response dropped");
            return SyncOutcome::Superseded;
        }
        guard.in_flight = None;

        match result {
            Ok(page) => {
                guard.settled_key = Some(key);
                tracing::debug!(
                    path = %inner.path,
                    page = page.cursor.page,
                    items = page.items.len(),
                    "search applied"
                );
                inner.state.send_modify(|s| {
                    s.items = page.items;
                    s.cursor = Some(page.cursor);
                    s.query = Some(query);
                    s.request.succeed();
                });
                SyncOutcome::Applied
            }
            Err(err) => {
                let outcome = self.fail_replace(&err);
                drop(guard);
                outcome
            }
        }
    }

    fn fail_replace(&self, err: &ApiError) -> SyncOutcome {
        let message = extract_error_message(err, &self.inner.fallback);
        tracing::warn!(path = %self.inner.path, error = %err, "search failed");
        self.inner.state.send_modify(|s| s.request.fail(message.clone()));
        SyncOutcome::Failed(message)
    }

    async fn append(&self, query: ListQuery<F>) -> SyncOutcome {
        let inner = &*self.inner;
        let (id, token) = {
            let mut guard = inner.guard();
            guard.last_op = Some(LastOp::Append(query.clone()));
            let busy = {
                let state = inner.state.borrow();
                state.loading_more || state.request.loading
            };
            if busy {
                tracing::debug!(path = %inner.path, page = query.page, "append skipped: list busy");
                return SyncOutcome::Skipped;
            }
            let id = guard.issue_id();
            let token = CancellationToken::new();
            guard.append = Some(RunningAppend {
                id,
                token: token.clone(),
            });
            inner.state.send_modify(|s| {
                s.loading_more = true;
                s.request.error = None;
            });
            (id, token)
        };

        let mut pending = Pending {
            inner,
            id,
            append: true,
            armed: true,
        };
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                pending.disarm();
                return SyncOutcome::Superseded;
            }
            result = self.fetch(&query) => result,
        };
        pending.disarm();

        let mut guard = inner.guard();
        if !guard.append.as_ref().is_some_and(|a| a.id == id) {
            tracing::debug!(path = %inner.path, id, "stale append response dropped");
            return SyncOutcome::Superseded;
        }
        guard.append = None;

        match result {
            Ok(page) => {
                tracing::debug!(
                    path = %inner.path,
                    page = page.cursor.page,
                    items = page.items.len(),
                    "page appended"
                );
                inner.state.send_modify(|s| {
                    s.items.extend(page.items);
                    match s.cursor.as_mut() {
                        Some(cursor) => cursor.advance_to(&page.cursor),
                        None => s.cursor = Some(page.cursor),
                    }
                    s.query = Some(query);
                    s.loading_more = false;
                });
                SyncOutcome::Applied
            }
            Err(err) => {
                let message = extract_error_message(&err, &inner.fallback);
                tracing::warn!(path = %inner.path, error = %err, "append failed");
                inner.state.send_modify(|s| {
                    s.loading_more = false;
                    s.request.error = Some(message.clone());
                });
                SyncOutcome::Failed(message)
            }
        }
    }

    async fn fetch(&self, query: &ListQuery<F>) -> Result<Page<T>, ApiError> {
        let request: ApiRequest = query.to_request(&self.inner.path)?;
        let requested: PageRequest = query.page_request();
        let raw = self.inner.api.call(request).await?;
        Ok(normalize_page(raw, requested)?)
    }
}
