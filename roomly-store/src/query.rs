use roomly_core::ApiError;
use roomly_data::PageRequest;
use roomly_http::ApiRequest;
use serde::{Deserialize, Serialize};

/// Filters for lists that take none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoFilters {}

/// Parameters of one list request: filters plus page position.
///
/// Serialized flat, so `ListQuery { filters: RoomFilters { city }, page, limit }`
/// becomes `?city=..&page=..&limit=..`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListQuery<F> {
    #[serde(flatten)]
    pub filters: F,
    pub page: u32,
    pub limit: u32,
}

impl<F> ListQuery<F> {
    /// First page of `filters`.
    pub fn new(filters: F, limit: u32) -> Self {
        Self {
            filters,
            page: 1,
            limit: limit.max(1),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

impl<F: Clone> ListQuery<F> {
    /// Same filters and limit, different page.
    pub fn at_page(&self, page: u32) -> Self {
        Self {
            filters: self.filters.clone(),
            page: page.max(1),
            limit: self.limit,
        }
    }
}

impl<F: Serialize> ListQuery<F> {
    /// Canonical fingerprint used to recognize identical requests.
    ///
    /// Object keys are sorted, so field order in `F` does not matter.
    pub fn fingerprint(&self) -> Result<String, ApiError> {
        serde_json::to_value(self)
            .map(|value| value.to_string())
            .map_err(|e| ApiError::Precondition(format!("unencodable query: {e}")))
    }

    pub fn to_request(&self, path: &str) -> Result<ApiRequest, ApiError> {
        ApiRequest::get(path).query_from(self)
    }
}
