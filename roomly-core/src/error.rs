use std::time::Duration;

use http::StatusCode;

/// Fallback shown to users when a failure carries no displayable message.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Failure of a single backend call, or of a local check guarding one.
///
/// Every store action converts this into a message stored in its own state;
/// it is never raised past the store boundary.
#[derive(Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No response reached the client (DNS, connect, TLS, body read).
    Transport(String),
    /// The backend answered with a non-success status.
    Status {
        status: StatusCode,
        message: Option<String>,
    },
    /// The per-request timeout elapsed.
    Timeout(Duration),
    /// The request was superseded by a newer one or dropped by its owner.
    Cancelled,
    /// The payload could not be normalized into the expected domain shape.
    Decode(String),
    /// A local precondition failed; no request was sent.
    Precondition(String),
}

impl ApiError {
    /// Build a `Status` error from a status code and a backend message.
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: Some(message.into()),
        }
    }

    /// The HTTP status preserved from the backend response, if any.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "Transport error: {msg}"),
            ApiError::Status {
                status,
                message: Some(msg),
            } => write!(f, "Backend returned {status}: {msg}"),
            ApiError::Status {
                status,
                message: None,
            } => write!(f, "Backend returned {status}"),
            ApiError::Timeout(after) => write!(f, "Request timed out after {}ms", after.as_millis()),
            ApiError::Cancelled => write!(f, "Request cancelled"),
            ApiError::Decode(msg) => write!(f, "Invalid response: {msg}"),
            ApiError::Precondition(msg) => write!(f, "Precondition failed: {msg}"),
        }
    }
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

impl std::error::Error for ApiError {}

/// Map a failure to the string shown to the user.
///
/// Backend validation/business messages (4xx) and local precondition
/// messages pass through; transport failures, server errors and anything
/// without a message collapse to `fallback`.
pub fn extract_error_message(error: &ApiError, fallback: &str) -> String {
    match error {
        ApiError::Status {
            status,
            message: Some(msg),
        } if status.is_client_error() && !msg.trim().is_empty() => msg.clone(),
        ApiError::Precondition(msg) => msg.clone(),
        ApiError::Timeout(_) => "Request timed out".to_string(),
        _ => fallback.to_string(),
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// Accepts `{ "message": "..." }`, `{ "error": "..." }` and validation
/// bodies where `message` is an array of strings.
pub fn message_from_body(body: &serde_json::Value) -> Option<String> {
    let field = body.get("message").or_else(|| body.get("error"))?;
    match field {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        // `{ "error": { "message": "..." } }`
        serde_json::Value::Object(_) => message_from_body(field),
        _ => None,
    }
}
