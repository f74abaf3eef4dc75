use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use roomly_core::ApiError;
use roomly_data::{Entity, PaginationCursor};
use roomly_http::ApiCall;
use roomly_store::{EntityStore, ListQuery, NoFilters, PagedList, Resource, Snapshots, SyncOutcome};
use serde::{Deserialize, Serialize};

/// Snapshot key of the room-seeking store.
pub const SNAPSHOT_KEY: &str = "room-seeking";

/// A tenant's "looking for a room" post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSeekingPost {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub preferred_city: Option<String>,
    #[serde(default)]
    pub budget_min: Option<String>,
    #[serde(default)]
    pub budget_max: Option<String>,
    #[serde(default)]
    pub move_in_date: Option<NaiveDate>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for RoomSeekingPost {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSeekingFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_budget: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSeekingDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_in_date: Option<NaiveDate>,
}

pub struct RoomSeekingPosts;

impl Resource for RoomSeekingPosts {
    type Item = RoomSeekingPost;
    type Filters = RoomSeekingFilters;
    type Create = RoomSeekingDraft;
    type Update = RoomSeekingDraft;

    const NAME: &'static str = "room-seeking-posts";
    const PATH: &'static str = "/room-seeking-posts";
}

/// Persisted part of the store. Flags and request keys are never saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSeekingSnapshot {
    pub user_posts: Vec<RoomSeekingPost>,
    #[serde(default)]
    pub user_posts_cursor: Option<PaginationCursor>,
    #[serde(default)]
    pub current_post: Option<RoomSeekingPost>,
}

/// Public post search, the signed-in user's posts and the post being viewed.
///
/// `user_posts` and `current_post` survive restarts through [`Snapshots`].
#[derive(Clone)]
pub struct RoomSeekingStore {
    posts: EntityStore<RoomSeekingPosts>,
    user_posts: PagedList<RoomSeekingPost, NoFilters>,
    snapshots: Option<Snapshots>,
}

impl RoomSeekingStore {
    pub fn new(api: Arc<dyn ApiCall>, page_limit: u32, snapshots: Option<Snapshots>) -> Self {
        Self {
            user_posts: PagedList::new(Arc::clone(&api), "/room-seeking-posts/me")
                .with_fallback("Could not load your posts"),
            posts: EntityStore::new(api, page_limit),
            snapshots,
        }
    }

    pub fn posts(&self) -> &EntityStore<RoomSeekingPosts> {
        &self.posts
    }

    pub fn user_posts(&self) -> &PagedList<RoomSeekingPost, NoFilters> {
        &self.user_posts
    }

    pub fn current_post(&self) -> Option<RoomSeekingPost> {
        self.posts.detail().record()
    }

    pub async fn search(&self, filters: RoomSeekingFilters, append: bool) -> SyncOutcome {
        self.posts.load(filters, append).await
    }

    pub async fn load_more(&self) -> SyncOutcome {
        self.posts.load_more().await
    }

    pub async fn load_user_posts(&self) -> SyncOutcome {
        let query = ListQuery::new(NoFilters::default(), self.posts.page_limit());
        let outcome = self.user_posts.search(query, false).await;
        if outcome.is_applied() {
            self.persist().await;
        }
        outcome
    }

    pub async fn load_current_post(&self, id: &str) -> SyncOutcome {
        let outcome = self.posts.load_detail(&id.to_string()).await;
        if outcome.is_applied() {
            self.persist().await;
        }
        outcome
    }

    pub async fn clear_current_post(&self) {
        self.posts.clear_detail();
        self.persist().await;
    }

    pub async fn create(&self, draft: &RoomSeekingDraft) -> Result<RoomSeekingPost, ApiError> {
        let post = self.posts.create(draft).await?;
        self.user_posts.prepend(post.clone());
        self.persist().await;
        Ok(post)
    }

    pub async fn update(
        &self,
        id: &str,
        draft: &RoomSeekingDraft,
    ) -> Result<RoomSeekingPost, ApiError> {
        let post = self.posts.update(&id.to_string(), draft).await?;
        self.user_posts.replace_by_id(post.clone());
        self.persist().await;
        Ok(post)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let id = id.to_string();
        self.posts.delete(&id).await?;
        self.user_posts.remove_by_id(&id);
        self.persist().await;
        Ok(())
    }

    pub fn snapshot(&self) -> RoomSeekingSnapshot {
        let user_posts = self.user_posts.snapshot();
        RoomSeekingSnapshot {
            user_posts: user_posts.items,
            user_posts_cursor: user_posts.cursor,
            current_post: self.current_post(),
        }
    }

    /// Write the persisted subset. Failures are logged, never surfaced.
    pub async fn persist(&self) {
        let Some(snapshots) = &self.snapshots else {
            return;
        };
        if let Err(err) = snapshots.save(SNAPSHOT_KEY, &self.snapshot()).await {
            tracing::warn!(store = SNAPSHOT_KEY, error = %err, "failed to persist snapshot");
        }
    }

    /// Load the persisted subset, if any. Returns whether something was restored.
    pub async fn restore(&self) -> bool {
        let Some(snapshots) = &self.snapshots else {
            return false;
        };
        let Some(snapshot) = snapshots.load::<RoomSeekingSnapshot>(SNAPSHOT_KEY).await else {
            return false;
        };
        tracing::debug!(
            store = SNAPSHOT_KEY,
            user_posts = snapshot.user_posts.len(),
            "snapshot restored"
        );
        self.user_posts
            .restore(snapshot.user_posts, snapshot.user_posts_cursor);
        match snapshot.current_post {
            Some(post) => self.posts.detail().set(post),
            None => self.posts.clear_detail(),
        }
        true
    }

    /// Clear in-memory state (the persisted snapshot is left alone).
    pub fn reset(&self) {
        self.posts.list().clear();
        self.posts.clear_detail();
        self.user_posts.clear();
    }
}
