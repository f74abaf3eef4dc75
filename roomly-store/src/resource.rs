use std::sync::Arc;

use roomly_core::{extract_error_message, ApiError, DEFAULT_ERROR_MESSAGE};
use roomly_data::{normalize_one, Entity};
use roomly_http::{item_path, ApiCall, ApiRequest};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::detail::DetailSlot;
use crate::list::PagedList;
use crate::query::ListQuery;
use crate::state::{RequestState, SyncOutcome};

/// A backend collection exposed as `GET/POST {PATH}` and
/// `GET/PATCH/DELETE {PATH}/{id}`.
///
/// ```ignore
/// impl Resource for Rooms {
///     type Item = Room;
///     type Filters = RoomFilters;
///     type Create = CreateRoom;
///     type Update = UpdateRoom;
///     const NAME: &'static str = "rooms";
///     const PATH: &'static str = "/rooms";
/// }
/// ```
pub trait Resource: Send + Sync + 'static {
    type Item: Entity;
    type Filters: Serialize + Clone + Default + Send + Sync + 'static;
    type Create: Serialize + Send + Sync;
    type Update: Serialize + Send + Sync;

    /// Short name used in logs and persisted snapshot keys.
    const NAME: &'static str;
    const PATH: &'static str;
}

/// Store slice for one [`Resource`]: primary list, detail record, and the
/// flags of the last mutation.
///
/// Mutations change local state only after the backend confirms them.
pub struct EntityStore<R: Resource> {
    api: Arc<dyn ApiCall>,
    list: PagedList<R::Item, R::Filters>,
    detail: DetailSlot<R::Item>,
    mutation: watch::Sender<RequestState>,
    page_limit: u32,
}

impl<R: Resource> Clone for EntityStore<R> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            list: self.list.clone(),
            detail: self.detail.clone(),
            mutation: self.mutation.clone(),
            page_limit: self.page_limit,
        }
    }
}

impl<R: Resource> EntityStore<R> {
    pub fn new(api: Arc<dyn ApiCall>, page_limit: u32) -> Self {
        Self::with_list_path(api, page_limit, R::PATH)
    }

    /// Store whose primary list reads from `list_path` (e.g. `/bookings/me`)
    /// while records and mutations stay under `R::PATH`.
    pub fn with_list_path(api: Arc<dyn ApiCall>, page_limit: u32, list_path: &str) -> Self {
        let (mutation, _) = watch::channel(RequestState::default());
        Self {
            list: PagedList::new(Arc::clone(&api), list_path),
            detail: DetailSlot::new(Arc::clone(&api), R::PATH),
            api,
            mutation,
            page_limit,
        }
    }

    pub fn list(&self) -> &PagedList<R::Item, R::Filters> {
        &self.list
    }

    pub fn detail(&self) -> &DetailSlot<R::Item> {
        &self.detail
    }

    pub fn api(&self) -> &Arc<dyn ApiCall> {
        &self.api
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// First-page query for `filters` with the configured page size.
    pub fn query(&self, filters: R::Filters) -> ListQuery<R::Filters> {
        ListQuery::new(filters, self.page_limit)
    }

    pub async fn search(&self, query: ListQuery<R::Filters>, append: bool) -> SyncOutcome {
        self.list.search(query, append).await
    }

    /// First page of `filters`, or with `append` the page after the cursor.
    pub async fn load(&self, filters: R::Filters, append: bool) -> SyncOutcome {
        self.list.load(self.query(filters), append).await
    }

    pub async fn load_more(&self) -> SyncOutcome {
        self.list.load_more().await
    }

    pub async fn load_detail(&self, id: &<R::Item as Entity>::Id) -> SyncOutcome {
        self.detail.load(id).await
    }

    pub fn clear_detail(&self) {
        self.detail.clear();
    }

    pub fn subscribe_mutation(&self) -> watch::Receiver<RequestState> {
        self.mutation.subscribe()
    }

    pub fn mutation_state(&self) -> RequestState {
        self.mutation.borrow().clone()
    }

    /// `POST {PATH}`, then prepend the created record.
    pub async fn create(&self, data: &R::Create) -> Result<R::Item, ApiError> {
        let request = ApiRequest::post(R::PATH).json(data);
        let created: R::Item = self.mutate(request).await?;
        self.list.prepend(created.clone());
        tracing::info!(resource = R::NAME, id = %created.id(), "created");
        Ok(created)
    }

    /// `PATCH {PATH}/{id}`, then replace the record in the list and detail.
    pub async fn update(
        &self,
        id: &<R::Item as Entity>::Id,
        data: &R::Update,
    ) -> Result<R::Item, ApiError> {
        let request = ApiRequest::patch(item_path(R::PATH, id)).json(data);
        let updated: R::Item = self.mutate(request).await?;
        self.apply_update(updated.clone());
        tracing::info!(resource = R::NAME, id = %id, "updated");
        Ok(updated)
    }

    /// `DELETE {PATH}/{id}`, then drop the record from the list and detail.
    pub async fn delete(&self, id: &<R::Item as Entity>::Id) -> Result<(), ApiError> {
        let request = ApiRequest::delete(item_path(R::PATH, id));
        self.mutate_raw(Ok(request)).await?;
        self.list.remove_by_id(id);
        self.detail.clear_if(id);
        tracing::info!(resource = R::NAME, id = %id, "deleted");
        Ok(())
    }

    /// Reflect a backend-confirmed record in the list and detail slot.
    pub fn apply_update(&self, record: R::Item) {
        self.list.replace_by_id(record.clone());
        self.detail.replace_if_same(record);
    }

    /// Send a mutation and decode the returned record, tracking the
    /// mutation flags. Local state is left to the caller.
    pub async fn mutate<V: DeserializeOwned>(
        &self,
        request: Result<ApiRequest, ApiError>,
    ) -> Result<V, ApiError> {
        let raw = self.mutate_raw(request).await?;
        normalize_one(raw).map_err(|err| {
            let err = ApiError::from(err);
            self.fail(&err);
            err
        })
    }

    /// Like [`mutate`](Self::mutate) but returns the raw body.
    pub async fn mutate_raw(&self, request: Result<ApiRequest, ApiError>) -> Result<Value, ApiError> {
        self.mutation.send_modify(RequestState::begin);
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };
        let what = request.describe();
        match self.api.call(request).await {
            Ok(raw) => {
                self.mutation.send_modify(RequestState::succeed);
                Ok(raw)
            }
            Err(err) => {
                tracing::warn!(resource = R::NAME, request = %what, error = %err, "mutation failed");
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Record a failed mutation (also used for local precondition failures).
    pub fn fail(&self, err: &ApiError) {
        let message = extract_error_message(err, DEFAULT_ERROR_MESSAGE);
        self.mutation.send_modify(|s| s.fail(message));
    }
}
