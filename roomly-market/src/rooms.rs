use std::sync::Arc;

use chrono::{DateTime, Utc};
use roomly_core::ApiError;
use roomly_data::Entity;
use roomly_http::ApiCall;
use roomly_store::{EntityStore, ListQuery, NoFilters, PagedList, Resource, SyncOutcome};
use serde::{Deserialize, Serialize};

/// A listed room. Money and area fields are canonical decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    pub price: String,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub landlord_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Room {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_area: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoom {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoom {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

pub struct Rooms;

impl Resource for Rooms {
    type Item = Room;
    type Filters = RoomFilters;
    type Create = CreateRoom;
    type Update = UpdateRoom;

    const NAME: &'static str = "rooms";
    const PATH: &'static str = "/rooms";
}

/// Room search plus the landlord's own listings.
#[derive(Clone)]
pub struct RoomStore {
    search: EntityStore<Rooms>,
    mine: PagedList<Room, NoFilters>,
}

impl RoomStore {
    pub fn new(api: Arc<dyn ApiCall>, page_limit: u32) -> Self {
        Self {
            mine: PagedList::new(Arc::clone(&api), "/rooms/me")
                .with_fallback("Could not load your rooms"),
            search: EntityStore::new(api, page_limit),
        }
    }

    /// The search store: results list, room detail and mutation flags.
    pub fn search_store(&self) -> &EntityStore<Rooms> {
        &self.search
    }

    pub fn my_rooms(&self) -> &PagedList<Room, NoFilters> {
        &self.mine
    }

    /// Replace the results with page 1 of `filters`.
    pub async fn search(&self, filters: RoomFilters) -> SyncOutcome {
        self.search.search(self.search.query(filters), false).await
    }

    pub async fn load_more(&self) -> SyncOutcome {
        self.search.load_more().await
    }

    pub async fn load_my_rooms(&self) -> SyncOutcome {
        let query = ListQuery::new(NoFilters::default(), self.search.page_limit());
        self.mine.search(query, false).await
    }

    pub async fn load_more_my_rooms(&self) -> SyncOutcome {
        self.mine.load_more().await
    }

    pub async fn load_room(&self, id: &str) -> SyncOutcome {
        self.search.load_detail(&id.to_string()).await
    }

    pub fn clear_room(&self) {
        self.search.clear_detail();
    }

    /// Create a listing; it shows up at the head of both lists.
    pub async fn create(&self, data: &CreateRoom) -> Result<Room, ApiError> {
        let room = self.search.create(data).await?;
        self.mine.prepend(room.clone());
        Ok(room)
    }

    pub async fn update(&self, id: &str, data: &UpdateRoom) -> Result<Room, ApiError> {
        let room = self.search.update(&id.to_string(), data).await?;
        self.mine.replace_by_id(room.clone());
        Ok(room)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let id = id.to_string();
        self.search.delete(&id).await?;
        self.mine.remove_by_id(&id);
        Ok(())
    }

    pub fn reset(&self) {
        self.search.list().clear();
        self.search.clear_detail();
        self.mine.clear();
    }
}
