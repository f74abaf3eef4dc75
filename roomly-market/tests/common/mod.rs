#![allow(dead_code)]

use std::sync::Arc;

use roomly_http::ApiCall;
use roomly_market::MarketStores;
use roomly_store::Snapshots;
use roomly_test::MockBackend;
use serde_json::{json, Value};

pub fn api(backend: &MockBackend) -> Arc<dyn ApiCall> {
    Arc::new(backend.clone())
}

pub fn stores(backend: &MockBackend) -> MarketStores {
    MarketStores::new(api(backend), 20)
}

pub fn persisted_stores(backend: &MockBackend, snapshots: Snapshots) -> MarketStores {
    MarketStores::with_snapshots(api(backend), 20, snapshots)
}

pub fn booking(id: &str, status: &str) -> Value {
    json!({ "id": id, "roomId": "room-1", "tenantId": "tenant-1", "status": status })
}

pub fn contract(id: &str, status: &str) -> Value {
    json!({ "id": id, "rentalId": "rental-1", "status": status })
}

pub fn bill(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "contractId": "c-1",
        "amount": { "s": 1, "e": 6, "d": [3, 5] },
        "status": status
    })
}
