//! HTTP action wrapper.
//!
//! Every store talks to the backend through [`ApiCall`]: one request in, a
//! raw JSON value or an [`ApiError`](roomly_core::ApiError) out. The wrapper
//! never retries and never caches; both are the caller's business.

mod client;
mod request;
mod token;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use roomly_core::{ApiError, ClientConfig};

pub use client::ApiClient;
pub use request::{item_path, ApiRequest};
pub use token::{NoToken, SessionToken, StaticToken, TokenSource};

pub use http::Method;

pub type ApiFuture<'a> =
    Pin<Box<dyn Future<Output = Result<serde_json::Value, ApiError>> + Send + 'a>>;

/// Performs a single backend request.
///
/// Implementations must not panic: transport failures, non-success statuses
/// and timeouts are all reported as [`ApiError`].
pub trait ApiCall: Send + Sync + 'static {
    fn call(&self, request: ApiRequest) -> ApiFuture<'_>;
}

impl<T: ApiCall + ?Sized> ApiCall for Arc<T> {
    fn call(&self, request: ApiRequest) -> ApiFuture<'_> {
        (**self).call(request)
    }
}

/// Build the shared HTTP wrapper from client settings.
///
/// A configured static token is used as-is; otherwise `token` supplies the
/// bearer token of the current session on every request.
pub fn create_api_call(
    config: &ClientConfig,
    token: Arc<dyn TokenSource>,
) -> Result<Arc<dyn ApiCall>, ApiError> {
    let token: Arc<dyn TokenSource> = match &config.api_token {
        Some(static_token) => Arc::new(StaticToken::new(static_token.clone())),
        None => token,
    };
    let client = ApiClient::new(&config.api_url, config.timeout, token)?;
    Ok(Arc::new(client))
}

pub mod prelude {
    //! Re-exports of the most commonly used HTTP types.
    pub use crate::{
        create_api_call, item_path, ApiCall, ApiClient, ApiRequest, SessionToken, TokenSource,
    };
}
