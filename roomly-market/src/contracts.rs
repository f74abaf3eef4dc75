use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use roomly_core::{extract_error_message, ApiError};
use roomly_data::{normalize_one, Entity};
use roomly_http::{item_path, ApiCall, ApiRequest};
use roomly_store::{EntityStore, RequestState, Resource, SyncOutcome};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    PendingSignature,
    Signed,
    Active,
    Terminated,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    #[serde(default)]
    pub rental_id: Option<String>,
    pub status: ContractStatus,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub monthly_rent: Option<String>,
    #[serde(default)]
    pub deposit: Option<String>,
    #[serde(default)]
    pub signed_at: Option<DateTime<Utc>>,
}

impl Entity for Contract {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ContractStatus>,
}

/// Download link for a contract's PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractPdf {
    pub url: String,
}

/// Contracts are generated by the backend, never created directly, so the
/// create/update payloads carry nothing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NoPayload {}

pub struct Contracts;

impl Resource for Contracts {
    type Item = Contract;
    type Filters = ContractFilters;
    type Create = NoPayload;
    type Update = NoPayload;

    const NAME: &'static str = "contracts";
    const PATH: &'static str = "/contracts";
}

/// Observable state of the PDF link lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfState {
    pub contract_id: Option<String>,
    pub pdf: Option<ContractPdf>,
    pub request: RequestState,
}

#[derive(Clone)]
pub struct ContractStore {
    contracts: EntityStore<Contracts>,
    pdf: watch::Sender<PdfState>,
}

impl ContractStore {
    pub fn new(api: Arc<dyn ApiCall>, page_limit: u32) -> Self {
        let (pdf, _) = watch::channel(PdfState::default());
        Self {
            contracts: EntityStore::with_list_path(api, page_limit, "/contracts/me"),
            pdf,
        }
    }

    pub fn contracts(&self) -> &EntityStore<Contracts> {
        &self.contracts
    }

    pub fn subscribe_pdf(&self) -> watch::Receiver<PdfState> {
        self.pdf.subscribe()
    }

    pub fn pdf_state(&self) -> PdfState {
        self.pdf.borrow().clone()
    }

    pub async fn load(&self, filters: ContractFilters, append: bool) -> SyncOutcome {
        self.contracts.load(filters, append).await
    }

    pub async fn load_contract(&self, id: &str) -> SyncOutcome {
        self.contracts.load_detail(&id.to_string()).await
    }

    pub fn clear_contract(&self) {
        self.contracts.clear_detail();
        self.pdf.send_replace(PdfState::default());
    }

    /// Sign a contract as the current user.
    pub async fn sign(&self, id: &str) -> Result<Contract, ApiError> {
        let request = if id.trim().is_empty() {
            Err(ApiError::Precondition("A contract id is required to sign".into()))
        } else {
            Ok(ApiRequest::patch(format!("{}/sign", item_path("/contracts", id))))
        };
        let contract: Contract = self.contracts.mutate(request).await?;
        self.contracts.apply_update(contract.clone());
        tracing::info!(contract = %contract.id, "contract signed");
        Ok(contract)
    }

    /// Resolve the PDF link of a contract.
    ///
    /// A `404` means the PDF has not been generated yet: it is generated and
    /// fetched once more. Any other failure is returned as-is.
    pub async fn pdf(&self, id: &str) -> Result<ContractPdf, ApiError> {
        self.pdf.send_modify(|s| {
            s.contract_id = Some(id.to_string());
            s.pdf = None;
            s.request.begin();
        });

        let result = self.fetch_pdf(id).await;
        self.pdf.send_if_modified(|s| {
            if s.contract_id.as_deref() != Some(id) {
                return false;
            }
            match &result {
                Ok(pdf) => {
                    s.pdf = Some(pdf.clone());
                    s.request.succeed();
                }
                Err(err) => s
                    .request
                    .fail(extract_error_message(err, "Could not load the contract PDF")),
            }
            true
        });
        result
    }

    async fn fetch_pdf(&self, id: &str) -> Result<ContractPdf, ApiError> {
        if id.trim().is_empty() {
            return Err(ApiError::Precondition("A contract id is required".into()));
        }
        let path = format!("{}/pdf", item_path("/contracts", id));
        let api = self.contracts.api();
        match api.call(ApiRequest::get(&path)).await {
            Ok(raw) => Ok(normalize_one(raw)?),
            Err(err) if err.is_not_found() => {
                tracing::info!(contract = %id, "contract PDF missing, regenerating");
                api.call(ApiRequest::post(&path)).await?;
                let raw = api.call(ApiRequest::get(&path)).await?;
                Ok(normalize_one(raw)?)
            }
            Err(err) => Err(err),
        }
    }

    pub fn reset(&self) {
        self.contracts.list().clear();
        self.contracts.clear_detail();
        self.pdf.send_replace(PdfState::default());
    }
}
