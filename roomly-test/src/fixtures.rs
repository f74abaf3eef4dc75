use std::ops::RangeInclusive;

use serde_json::{json, Value};

/// Records `{ "id": "{prefix}-{n}", "title": "{prefix} {n}" }` for each `n`.
pub fn numbered(prefix: &str, range: RangeInclusive<u32>) -> Vec<Value> {
    range
        .map(|n| json!({ "id": format!("{prefix}-{n}"), "title": format!("{prefix} {n}") }))
        .collect()
}

/// `{ "data": items, "pagination": { page, limit, total, totalPages } }`.
pub fn paginated(items: Vec<Value>, page: u32, limit: u32, total: u64) -> Value {
    let total_pages = total.div_ceil(u64::from(limit.max(1)));
    json!({
        "data": items,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "totalPages": total_pages,
        }
    })
}

/// `{ "data": value }`.
pub fn enveloped(value: Value) -> Value {
    json!({ "data": value })
}
