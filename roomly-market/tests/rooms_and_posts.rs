mod common;

use std::sync::Arc;

use common::{persisted_stores, stores};
use http::Method;
use roomly_cache::{InMemoryStorage, StateStorage};
use roomly_market::{CreateRoom, RoomFilters, RoomSeekingDraft};
use roomly_store::{Snapshots, SyncOutcome};
use roomly_test::{enveloped, paginated, MockBackend};
use serde_json::json;

fn room(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Room {id}"),
        "price": { "s": 1, "e": 6, "d": [4, 5] },
        "area": { "s": 1, "e": 1, "d": [2, 5, 5] },
        "amenities": ["wifi"]
    })
}

#[tokio::test]
async fn test_room_search_normalizes_decimal_fields() {
    let backend = MockBackend::new();
    backend.reply(Method::GET, "/rooms", paginated(vec![room("r1"), room("r2")], 1, 20, 2));
    let stores = stores(&backend);

    let outcome = stores
        .rooms
        .search(RoomFilters {
            city: Some("Da Nang".into()),
            amenities: vec!["wifi".into(), "parking".into()],
            ..Default::default()
        })
        .await;
    assert_eq!(outcome, SyncOutcome::Applied);

    let state = stores.rooms.search_store().list().snapshot();
    assert_eq!(state.items[0].price, "4500000");
    assert_eq!(state.items[0].area.as_deref(), Some("25.5"));

    let sent = backend.last_call(Method::GET, "/rooms").unwrap();
    assert!(sent.query.contains(&("city".into(), "Da Nang".into())));
    assert!(sent.query.contains(&("amenities".into(), "wifi,parking".into())));
    assert!(!sent.query.iter().any(|(k, _)| k == "minPrice"));
}

#[tokio::test]
async fn test_created_room_appears_in_search_and_my_rooms() {
    let backend = MockBackend::new();
    backend
        .reply(Method::GET, "/rooms/me", paginated(vec![room("r1")], 1, 20, 1))
        .reply(Method::POST, "/rooms", enveloped(room("r9")));
    let stores = stores(&backend);
    stores.rooms.load_my_rooms().await;

    let created = stores
        .rooms
        .create(&CreateRoom {
            title: "Room r9".into(),
            description: None,
            address: "12 Tran Phu".into(),
            city: None,
            price: "4500000".into(),
            area: None,
            amenities: vec![],
            images: vec![],
        })
        .await
        .unwrap();
    assert_eq!(created.id, "r9");

    let mine = stores.rooms.my_rooms().snapshot();
    assert_eq!(mine.items.len(), 2);
    assert_eq!(mine.items[0].id, "r9");
    assert_eq!(stores.rooms.search_store().list().snapshot().items[0].id, "r9");
}

#[tokio::test]
async fn test_room_delete_failure_keeps_my_rooms() {
    let backend = MockBackend::new();
    backend
        .reply(Method::GET, "/rooms/me", paginated(vec![room("r1")], 1, 20, 1))
        .not_found(Method::DELETE, "/rooms/r1");
    let stores = stores(&backend);
    stores.rooms.load_my_rooms().await;

    assert!(stores.rooms.delete("r1").await.is_err());
    assert_eq!(stores.rooms.my_rooms().snapshot().items.len(), 1);
}

fn post(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Looking near {id}"),
        "budgetMax": { "s": 1, "e": 6, "d": [5] },
        "moveInDate": "2026-11-01"
    })
}

#[tokio::test]
async fn test_user_posts_and_current_post_survive_restart() {
    let storage = InMemoryStorage::new();
    let backend = MockBackend::new();
    backend
        .reply(Method::GET, "/room-seeking-posts/me", paginated(vec![post("p1"), post("p2")], 1, 20, 2))
        .reply(Method::GET, "/room-seeking-posts/p2", enveloped(post("p2")));

    let first = persisted_stores(&backend, Snapshots::new(Arc::new(storage.clone()), "roomly"));
    first.room_seeking.load_user_posts().await;
    first.room_seeking.load_current_post("p2").await;

    let raw = storage.get("roomly:room-seeking").await.unwrap().unwrap();
    let persisted: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(persisted["userPosts"].as_array().unwrap().len(), 2);
    assert!(persisted.get("loading").is_none());
    assert!(persisted.get("error").is_none());

    let second = persisted_stores(&backend, Snapshots::new(Arc::new(storage.clone()), "roomly"));
    second.restore().await;

    let posts = second.room_seeking.user_posts().snapshot();
    assert_eq!(posts.items.len(), 2);
    assert_eq!(posts.items[0].budget_max.as_deref(), Some("5000000"));
    assert!(!posts.request.loading);
    assert_eq!(second.room_seeking.current_post().unwrap().id, "p2");
    assert_eq!(backend.calls().len(), 2);
}

#[tokio::test]
async fn test_created_post_is_persisted() {
    let storage = InMemoryStorage::new();
    let backend = MockBackend::new();
    backend.reply(Method::POST, "/room-seeking-posts", post("p7"));
    let stores = persisted_stores(&backend, Snapshots::new(Arc::new(storage.clone()), "roomly"));

    stores
        .room_seeking
        .create(&RoomSeekingDraft {
            title: Some("Looking near p7".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let snapshot = stores.room_seeking.snapshot();
    assert_eq!(snapshot.user_posts.len(), 1);
    assert!(storage.get("roomly:room-seeking").await.unwrap().is_some());
}

#[tokio::test]
async fn test_reset_clears_state_and_snapshots() {
    let storage = InMemoryStorage::new();
    let backend = MockBackend::new();
    backend.reply(Method::GET, "/room-seeking-posts/me", paginated(vec![post("p1")], 1, 20, 1));
    let stores = persisted_stores(&backend, Snapshots::new(Arc::new(storage.clone()), "roomly"));
    stores.room_seeking.load_user_posts().await;

    stores.reset().await;
    assert!(stores.room_seeking.user_posts().snapshot().items.is_empty());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_corrupt_snapshot_is_ignored_on_restore() {
    let storage = InMemoryStorage::new();
    storage
        .set("roomly:room-seeking", bytes_of("{\"userPosts\": 5}"))
        .await
        .unwrap();
    let backend = MockBackend::new();
    let stores = persisted_stores(&backend, Snapshots::new(Arc::new(storage), "roomly"));

    assert!(!stores.room_seeking.restore().await);
    assert!(stores.room_seeking.user_posts().snapshot().items.is_empty());
}

fn bytes_of(s: &'static str) -> bytes::Bytes {
    bytes::Bytes::from_static(s.as_bytes())
}
