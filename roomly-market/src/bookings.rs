use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use roomly_core::ApiError;
use roomly_data::Entity;
use roomly_http::{item_path, ApiCall, ApiRequest};
use roomly_store::{EntityStore, Flow, FlowError, PagedList, Resource, SyncOutcome};
use serde::{Deserialize, Serialize};

use crate::contracts::Contract;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// A tenant's request to rent a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub room_id: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub landlord_id: Option<String>,
    pub status: BookingStatus,
    #[serde(default)]
    pub move_in_date: Option<NaiveDate>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Booking {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub room_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_in_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBooking {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_in_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub struct Bookings;

impl Resource for Bookings {
    type Item = Booking;
    type Filters = BookingFilters;
    type Create = CreateBooking;
    type Update = UpdateBooking;

    const NAME: &'static str = "bookings";
    const PATH: &'static str = "/bookings";
}

/// Terms the landlord sets when approving a booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalTerms {
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub monthly_rent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit: Option<String>,
}

/// Rental created from an approved booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub monthly_rent: Option<String>,
}

/// Everything the approve flow produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Approval {
    pub booking: Booking,
    pub rental: Rental,
    pub contract: Contract,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewRental<'a> {
    booking_id: &'a str,
    room_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tenant_id: Option<&'a str>,
    #[serde(flatten)]
    terms: &'a RentalTerms,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContract<'a> {
    rental_id: &'a str,
}

/// Sent requests (tenant side), received requests (landlord side), the
/// booking being viewed, and the status transitions between them.
#[derive(Clone)]
pub struct BookingStore {
    sent: EntityStore<Bookings>,
    received: PagedList<Booking, BookingFilters>,
}

impl BookingStore {
    pub fn new(api: Arc<dyn ApiCall>, page_limit: u32) -> Self {
        Self {
            received: PagedList::new(Arc::clone(&api), "/bookings/landlord")
                .with_fallback("Could not load booking requests"),
            sent: EntityStore::with_list_path(api, page_limit, "/bookings/me"),
        }
    }

    /// The tenant's bookings, booking detail and mutation flags.
    pub fn sent(&self) -> &EntityStore<Bookings> {
        &self.sent
    }

    pub fn received(&self) -> &PagedList<Booking, BookingFilters> {
        &self.received
    }

    pub async fn load_sent(&self, filters: BookingFilters, append: bool) -> SyncOutcome {
        self.sent.load(filters, append).await
    }

    pub async fn load_received(&self, filters: BookingFilters, append: bool) -> SyncOutcome {
        self.received.load(self.sent.query(filters), append).await
    }

    pub async fn load_booking(&self, id: &str) -> SyncOutcome {
        self.sent.load_detail(&id.to_string()).await
    }

    pub fn clear_booking(&self) {
        self.sent.clear_detail();
    }

    pub async fn create(&self, data: &CreateBooking) -> Result<Booking, ApiError> {
        self.sent.create(data).await
    }

    pub async fn cancel(&self, id: &str) -> Result<Booking, ApiError> {
        self.transition(id, "cancel").await
    }

    pub async fn reject(&self, id: &str) -> Result<Booking, ApiError> {
        self.transition(id, "reject").await
    }

    /// Approve a booking, create its rental, then generate the contract.
    ///
    /// Steps run in order and stop at the first failure. Steps already
    /// completed are not undone; the error lists them.
    pub async fn approve(&self, id: &str, terms: &RentalTerms) -> Result<Approval, FlowError> {
        let mut flow = Flow::new("approve-booking");

        let booking = flow
            .step("approve", async {
                let id = require_id(id, "A booking id is required to approve a booking")?;
                let booking: Booking = self
                    .sent
                    .mutate(Ok(ApiRequest::patch(format!(
                        "{}/approve",
                        item_path("/bookings", id)
                    ))))
                    .await?;
                self.apply(booking.clone());
                Ok(booking)
            })
            .await
            .map_err(|err| self.flow_failed(err))?;

        let rental = flow
            .step("create-rental", async {
                let body = NewRental {
                    booking_id: &booking.id,
                    room_id: &booking.room_id,
                    tenant_id: booking.tenant_id.as_deref(),
                    terms,
                };
                let rental: Rental = self.sent.mutate(ApiRequest::post("/rentals").json(&body)).await?;
                match rental.id.as_deref() {
                    Some(rental_id) if !rental_id.trim().is_empty() => Ok(rental),
                    _ => Err(ApiError::Precondition(
                        "The rental was created without an id".into(),
                    )),
                }
            })
            .await
            .map_err(|err| self.flow_failed(err))?;

        let contract = flow
            .step("generate-contract", async {
                let rental_id = rental.id.as_deref().unwrap_or_default();
                let request = ApiRequest::post("/contracts/generate")
                    .json(&GenerateContract { rental_id });
                self.sent.mutate::<Contract>(request).await
            })
            .await
            .map_err(|err| self.flow_failed(err))?;

        flow.finish();
        Ok(Approval {
            booking,
            rental,
            contract,
        })
    }

    async fn transition(&self, id: &str, action: &str) -> Result<Booking, ApiError> {
        let request = require_id(id, "A booking id is required")
            .map(|id| ApiRequest::patch(format!("{}/{action}", item_path("/bookings", id))));
        let booking: Booking = self.sent.mutate(request).await?;
        self.apply(booking.clone());
        tracing::info!(booking = %booking.id, action, "booking updated");
        Ok(booking)
    }

    fn apply(&self, booking: Booking) {
        self.received.replace_by_id(booking.clone());
        self.sent.apply_update(booking);
    }

    fn flow_failed(&self, err: FlowError) -> FlowError {
        self.sent.fail(&err.error);
        err
    }

    pub fn reset(&self) {
        self.sent.list().clear();
        self.sent.clear_detail();
        self.received.clear();
    }
}

fn require_id<'a>(id: &'a str, message: &str) -> Result<&'a str, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        Err(ApiError::Precondition(message.to_string()))
    } else {
        Ok(id)
    }
}
