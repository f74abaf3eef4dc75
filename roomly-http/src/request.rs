use std::fmt;

use http::Method;
use roomly_core::ApiError;
use serde::Serialize;
use serde_json::Value;

/// One backend request: method, path relative to the API base URL, query
/// pairs and an optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append the fields of a flat struct as query pairs.
    ///
    /// `null` fields are skipped and arrays are joined with `,`
    /// (`amenities=wifi,parking`).
    pub fn query_from<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self, ApiError> {
        let value = serde_json::to_value(params)
            .map_err(|e| ApiError::Precondition(format!("unencodable query: {e}")))?;
        match value {
            Value::Object(map) => {
                for (key, field) in map {
                    if let Some(rendered) = query_value(&field) {
                        self.query.push((key, rendered));
                    }
                }
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(ApiError::Precondition(format!(
                "query parameters must be an object, got {other}"
            ))),
        }
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::Precondition(format!("unencodable body: {e}")))?;
        self.body = Some(body);
        Ok(self)
    }

    /// `METHOD /path` for logs.
    pub fn describe(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// `{base}/{id}` with `id` percent-encoded as a single path segment.
///
/// An id containing `/`, `?` or `#` stays inside its segment instead of
/// changing the route.
pub fn item_path(base: &str, id: impl fmt::Display) -> String {
    format!("{base}/{}", urlencoding::encode(&id.to_string()))
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(query_value).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(","))
            }
        }
        Value::Object(_) => Some(value.to_string()),
    }
}
