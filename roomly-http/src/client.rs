use std::sync::Arc;
use std::time::Duration;

use roomly_core::{message_from_body, ApiError};
use serde_json::Value;

use crate::request::ApiRequest;
use crate::token::TokenSource;
use crate::{ApiCall, ApiFuture};

/// reqwest-backed [`ApiCall`] against a fixed base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    token: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        token: Arc<dyn TokenSource>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Transport(err.to_string())
        }
    }

    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.token.token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|body| message_from_body(&body));
            return Err(ApiError::Status { status, message });
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Decode(format!("response body is not JSON: {e}")))
    }
}

impl ApiCall for ApiClient {
    fn call(&self, request: ApiRequest) -> ApiFuture<'_> {
        Box::pin(async move {
            let what = request.describe();
            tracing::debug!(request = %what, "calling backend");
            let result = self.execute(request).await;
            if let Err(err) = &result {
                tracing::warn!(request = %what, error = %err, "backend call failed");
            }
            result
        })
    }
}
