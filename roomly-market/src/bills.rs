use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use roomly_core::ApiError;
use roomly_data::Entity;
use roomly_http::{item_path, ApiCall, ApiRequest};
use roomly_store::{EntityStore, Resource, SyncOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Unpaid,
    Paid,
    Overdue,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// A monthly bill issued under a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub contract_id: String,
    pub amount: String,
    pub status: BillStatus,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Entity for Bill {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BillStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBill {
    pub contract_id: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub struct Bills;

impl Resource for Bills {
    type Item = Bill;
    type Filters = BillFilters;
    type Create = CreateBill;
    type Update = UpdateBill;

    const NAME: &'static str = "bills";
    const PATH: &'static str = "/bills";
}

#[derive(Clone)]
pub struct BillStore {
    bills: EntityStore<Bills>,
}

impl BillStore {
    pub fn new(api: Arc<dyn ApiCall>, page_limit: u32) -> Self {
        Self {
            bills: EntityStore::with_list_path(api, page_limit, "/bills/me"),
        }
    }

    pub fn bills(&self) -> &EntityStore<Bills> {
        &self.bills
    }

    pub async fn load(&self, filters: BillFilters, append: bool) -> SyncOutcome {
        self.bills.load(filters, append).await
    }

    pub async fn load_bill(&self, id: &str) -> SyncOutcome {
        self.bills.load_detail(&id.to_string()).await
    }

    pub fn clear_bill(&self) {
        self.bills.clear_detail();
    }

    /// Issue a bill. A contract id is required; without one nothing is sent.
    pub async fn create(&self, data: &CreateBill) -> Result<Bill, ApiError> {
        if data.contract_id.trim().is_empty() {
            let err = ApiError::Precondition("A contract is required to create a bill".into());
            self.bills.fail(&err);
            return Err(err);
        }
        self.bills.create(data).await
    }

    pub async fn update(&self, id: &str, data: &UpdateBill) -> Result<Bill, ApiError> {
        self.bills.update(&id.to_string(), data).await
    }

    /// Mark a bill as paid.
    pub async fn pay(&self, id: &str) -> Result<Bill, ApiError> {
        let request = if id.trim().is_empty() {
            Err(ApiError::Precondition("A bill id is required".into()))
        } else {
            Ok(ApiRequest::patch(format!("{}/pay", item_path("/bills", id))))
        };
        let bill: Bill = self.bills.mutate(request).await?;
        self.bills.apply_update(bill.clone());
        tracing::info!(bill = %bill.id, "bill paid");
        Ok(bill)
    }

    pub fn reset(&self) {
        self.bills.list().clear();
        self.bills.clear_detail();
    }
}
