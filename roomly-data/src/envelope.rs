//! Decoding of backend response envelopes into canonical shapes.
//!
//! Endpoints answer with any of:
//!
//! - `{ "data": T }` (possibly wrapped twice),
//! - a bare `T`,
//! - a bare `[T]`,
//! - `{ "data": [T], "pagination": { ... } }` (or `"meta"` instead of `"pagination"`).
//!
//! Each payload is first classified into a [`WireShape`], then decimals are
//! rewritten and the items deserialized. Nothing downstream sees raw JSON.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::decimal::normalize_decimals;
use crate::error::NormalizeError;
use crate::page::{Page, PageRequest, PaginationCursor};

/// How many nested `{ "data": ... }` wrappers are peeled off.
const MAX_UNWRAP_DEPTH: usize = 2;

/// The accepted wire shapes of a backend response.
#[derive(Debug, Clone, PartialEq)]
pub enum WireShape {
    /// A list with a pagination block.
    Paginated { items: Vec<Value>, pagination: Value },
    /// A list without pagination metadata.
    List(Vec<Value>),
    /// A single record (or scalar).
    Single(Value),
}

impl WireShape {
    pub fn classify(raw: Value) -> Self {
        classify_at(raw, 0)
    }
}

fn classify_at(raw: Value, depth: usize) -> WireShape {
    match raw {
        Value::Array(items) => WireShape::List(items),
        Value::Object(mut map) if map.contains_key("data") => {
            let pagination = [map.remove("pagination"), map.remove("meta")]
                .into_iter()
                .flatten()
                .find(|block| !block.is_null());
            let data = map.remove("data").unwrap_or(Value::Null);
            match (data, pagination) {
                (Value::Array(items), Some(pagination)) => WireShape::Paginated { items, pagination },
                (Value::Array(items), None) => WireShape::List(items),
                (inner @ Value::Object(_), None) if depth + 1 < MAX_UNWRAP_DEPTH => {
                    classify_at(inner, depth + 1)
                }
                (other, _) => WireShape::Single(other),
            }
        }
        other => WireShape::Single(other),
    }
}

/// Pagination block as sent by the backend. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct WirePagination {
    #[serde(default, alias = "currentPage", alias = "current_page")]
    page: Option<u32>,
    #[serde(default, alias = "pageSize", alias = "page_size", alias = "perPage", alias = "size")]
    limit: Option<u32>,
    #[serde(default, alias = "totalItems", alias = "total_items", alias = "totalCount")]
    total: Option<u64>,
    #[serde(default, rename = "totalPages", alias = "total_pages")]
    total_pages: Option<u32>,
}

fn cursor_from_wire(
    pagination: Value,
    requested: PageRequest,
    item_count: usize,
) -> Result<PaginationCursor, NormalizeError> {
    let wire: WirePagination = serde_json::from_value(pagination)
        .map_err(|e| NormalizeError::Shape(format!("pagination block: {e}")))?;

    let page = wire.page.unwrap_or(requested.page).max(1);
    let limit = wire.limit.unwrap_or(requested.limit).max(1);
    let total = wire
        .total
        .unwrap_or_else(|| u64::from(page - 1) * u64::from(limit) + item_count as u64);

    Ok(match wire.total_pages {
        Some(total_pages) => {
            PaginationCursor::with_total_pages(page, limit, total, total_pages, item_count)
        }
        None => PaginationCursor::new(page, limit, total, item_count),
    })
}

/// Cursor for a bare array: requested position, array length as total.
fn synthesize_cursor(requested: PageRequest, item_count: usize) -> PaginationCursor {
    PaginationCursor::new(requested.page, requested.limit, item_count as u64, item_count)
}

fn decode<T: DeserializeOwned>(mut value: Value) -> Result<T, NormalizeError> {
    normalize_decimals(&mut value)?;
    serde_json::from_value(value).map_err(|e| NormalizeError::Deserialize(e.to_string()))
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Normalize a single-record response.
pub fn normalize_one<T: DeserializeOwned>(raw: Value) -> Result<T, NormalizeError> {
    match WireShape::classify(raw) {
        WireShape::Single(value) => decode(value),
        WireShape::List(_) | WireShape::Paginated { .. } => Err(NormalizeError::Shape(
            "expected a single record, found a list".into(),
        )),
    }
}

/// Normalize a list response into a page, synthesizing pagination if absent.
pub fn normalize_page<T: DeserializeOwned>(
    raw: Value,
    requested: PageRequest,
) -> Result<Page<T>, NormalizeError> {
    let (items, pagination) = match WireShape::classify(raw) {
        WireShape::Paginated { items, pagination } => (items, Some(pagination)),
        WireShape::List(items) => (items, None),
        WireShape::Single(other) => {
            return Err(NormalizeError::Shape(format!(
                "expected a list, found {}",
                describe(&other)
            )))
        }
    };

    let items = items
        .into_iter()
        .map(decode)
        .collect::<Result<Vec<T>, _>>()?;
    let cursor = match pagination {
        Some(block) => cursor_from_wire(block, requested, items.len())?,
        None => {
            tracing::trace!(items = items.len(), "list without pagination block");
            synthesize_cursor(requested, items.len())
        }
    };
    Ok(Page::new(items, cursor))
}

/// Normalize an unpaginated list response.
pub fn normalize_list<T: DeserializeOwned>(raw: Value) -> Result<Vec<T>, NormalizeError> {
    match WireShape::classify(raw) {
        WireShape::Paginated { items, .. } | WireShape::List(items) => {
            items.into_iter().map(decode).collect()
        }
        WireShape::Single(Value::Null) => Ok(Vec::new()),
        WireShape::Single(other) => Err(NormalizeError::Shape(format!(
            "expected a list, found {}",
            describe(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_shapes() {
        assert_eq!(
            WireShape::classify(json!([1, 2])),
            WireShape::List(vec![json!(1), json!(2)])
        );
        assert_eq!(
            WireShape::classify(json!({ "data": { "id": "a" } })),
            WireShape::Single(json!({ "id": "a" }))
        );
        assert_eq!(
            WireShape::classify(json!({ "id": "a" })),
            WireShape::Single(json!({ "id": "a" }))
        );
        assert_eq!(
            WireShape::classify(json!({ "data": [], "meta": { "page": 1 } })),
            WireShape::Paginated {
                items: vec![],
                pagination: json!({ "page": 1 })
            }
        );
    }

    #[test]
    fn double_wrapped_envelope_is_unwrapped() {
        let raw = json!({
            "data": { "data": [{ "id": "a" }], "pagination": { "page": 2, "limit": 1, "total": 3 } },
            "statusCode": 200
        });
        match WireShape::classify(raw) {
            WireShape::Paginated { items, pagination } => {
                assert_eq!(items.len(), 1);
                assert_eq!(pagination["page"], 2);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn null_pagination_block_counts_as_absent() {
        assert_eq!(
            WireShape::classify(json!({ "data": [1], "pagination": null })),
            WireShape::List(vec![json!(1)])
        );
        assert_eq!(
            WireShape::classify(json!({ "data": [1], "pagination": null, "meta": { "page": 1 } })),
            WireShape::Paginated {
                items: vec![json!(1)],
                pagination: json!({ "page": 1 })
            }
        );
    }

    #[test]
    fn wrapping_stops_at_max_depth() {
        let raw = json!({ "data": { "data": { "data": { "id": "a" } } } });
        assert_eq!(
            WireShape::classify(raw),
            WireShape::Single(json!({ "data": { "id": "a" } }))
        );
    }
}
