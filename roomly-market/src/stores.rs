use std::sync::Arc;

use roomly_cache::StorageError;
use roomly_core::{ApiError, ClientConfig};
use roomly_http::{create_api_call, ApiCall, TokenSource};
use roomly_store::Snapshots;

use crate::bills::BillStore;
use crate::bookings::BookingStore;
use crate::contracts::ContractStore;
use crate::rooms::RoomStore;
use crate::seeking::RoomSeekingStore;

/// Failure while assembling [`MarketStores`] from configuration.
#[derive(Debug)]
pub enum SetupError {
    Http(ApiError),
    Storage(StorageError),
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::Http(err) => write!(f, "HTTP client setup failed: {err}"),
            SetupError::Storage(err) => write!(f, "Snapshot storage setup failed: {err}"),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Http(err) => Some(err),
            SetupError::Storage(err) => Some(err),
        }
    }
}

impl From<ApiError> for SetupError {
    fn from(err: ApiError) -> Self {
        SetupError::Http(err)
    }
}

impl From<StorageError> for SetupError {
    fn from(err: StorageError) -> Self {
        SetupError::Storage(err)
    }
}

/// Every marketplace store behind one handle.
///
/// Built once and passed to the UI layer; there are no global instances.
/// Cloning is cheap and shares state.
#[derive(Clone)]
pub struct MarketStores {
    pub rooms: RoomStore,
    pub room_seeking: RoomSeekingStore,
    pub bookings: BookingStore,
    pub contracts: ContractStore,
    pub bills: BillStore,
    snapshots: Option<Snapshots>,
}

impl MarketStores {
    /// Stores without persistence.
    pub fn new(api: Arc<dyn ApiCall>, page_limit: u32) -> Self {
        Self::build(api, page_limit, None)
    }

    /// Stores persisting their durable state through `snapshots`.
    pub fn with_snapshots(api: Arc<dyn ApiCall>, page_limit: u32, snapshots: Snapshots) -> Self {
        Self::build(api, page_limit, Some(snapshots))
    }

    /// Build the HTTP wrapper and snapshot storage from configuration,
    /// then restore persisted state.
    pub async fn from_config(
        config: &ClientConfig,
        token: Arc<dyn TokenSource>,
    ) -> Result<Self, SetupError> {
        let api = create_api_call(config, token)?;
        let snapshots = Snapshots::from_config(config).await?;
        let stores = Self::with_snapshots(api, config.page_limit, snapshots);
        stores.restore().await;
        tracing::info!(api_url = %config.api_url, "market stores ready");
        Ok(stores)
    }

    fn build(api: Arc<dyn ApiCall>, page_limit: u32, snapshots: Option<Snapshots>) -> Self {
        Self {
            rooms: RoomStore::new(Arc::clone(&api), page_limit),
            room_seeking: RoomSeekingStore::new(Arc::clone(&api), page_limit, snapshots.clone()),
            bookings: BookingStore::new(Arc::clone(&api), page_limit),
            contracts: ContractStore::new(Arc::clone(&api), page_limit),
            bills: BillStore::new(api, page_limit),
            snapshots,
        }
    }

    /// Restore persisted store state.
    pub async fn restore(&self) {
        self.room_seeking.restore().await;
    }

    /// Drop all in-memory state and persisted snapshots (sign-out).
    pub async fn reset(&self) {
        self.rooms.reset();
        self.room_seeking.reset();
        self.bookings.reset();
        self.contracts.reset();
        self.bills.reset();
        if let Some(snapshots) = &self.snapshots {
            if let Err(err) = snapshots.clear().await {
                tracing::warn!(error = %err, "failed to clear snapshots");
            }
        }
    }
}
