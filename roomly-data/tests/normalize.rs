use roomly_data::{normalize_list, normalize_one, normalize_page, NormalizeError, PageRequest};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Listing {
    id: String,
    title: String,
    monthly_rent: String,
}

fn listing(id: &str) -> serde_json::Value {
    json!({ "id": id, "title": format!("Room {id}"), "monthlyRent": { "s": 1, "e": 6, "d": [3, 5] } })
}

#[test]
fn single_record_wrapped_or_bare() {
    let wrapped: Listing = normalize_one(json!({ "data": listing("a") })).unwrap();
    let bare: Listing = normalize_one(listing("a")).unwrap();
    assert_eq!(wrapped, bare);
    assert_eq!(bare.monthly_rent, "3500000");
}

#[test]
fn single_record_rejects_list() {
    let err = normalize_one::<Listing>(json!([listing("a")])).unwrap_err();
    assert!(matches!(err, NormalizeError::Shape(_)));
}

#[test]
fn paginated_envelope_uses_backend_block() {
    let raw = json!({
        "data": [listing("a"), listing("b")],
        "pagination": { "page": 2, "limit": 2, "total": 5, "totalPages": 3, "hasNext": false }
    });
    let page = normalize_page::<Listing>(raw, PageRequest::new(2, 2)).unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.cursor.page, 2);
    assert_eq!(page.cursor.total, 5);
    assert_eq!(page.cursor.total_pages, 3);
    // Recomputed from page/totalPages, not trusted from the wire.
    assert!(page.cursor.has_next);
    assert!(page.cursor.has_prev);
    assert_eq!(page.cursor.item_count, 2);
}

#[test]
fn snake_case_meta_block_is_accepted() {
    let raw = json!({
        "data": [listing("a")],
        "meta": { "current_page": 1, "page_size": 10, "total_items": 31 }
    });
    let page = normalize_page::<Listing>(raw, PageRequest::default()).unwrap();
    assert_eq!(page.cursor.limit, 10);
    assert_eq!(page.cursor.total, 31);
    assert_eq!(page.cursor.total_pages, 4);
    assert!(page.cursor.has_next);
}

#[test]
fn bare_array_synthesizes_pagination() {
    let raw = json!([listing("a"), listing("b"), listing("c")]);
    let page = normalize_page::<Listing>(raw, PageRequest::new(1, 20)).unwrap();

    assert_eq!(page.cursor.page, 1);
    assert_eq!(page.cursor.limit, 20);
    assert_eq!(page.cursor.total, 3);
    assert_eq!(page.cursor.total_pages, 1);
    assert!(!page.cursor.has_next);
    assert!(!page.cursor.has_prev);
    assert_eq!(page.cursor.item_count, 3);
}

#[test]
fn wrapped_array_without_pagination_synthesizes_too() {
    let raw = json!({ "data": [listing("a")] });
    let page = normalize_page::<Listing>(raw, PageRequest::new(1, 5)).unwrap();
    assert_eq!(page.cursor.total, 1);
}

#[test]
fn page_rejects_single_record() {
    let err = normalize_page::<Listing>(listing("a"), PageRequest::default()).unwrap_err();
    assert_eq!(
        err,
        NormalizeError::Shape("expected a list, found an object".into())
    );
}

#[test]
fn malformed_item_is_a_deserialize_error() {
    let raw = json!([{ "id": "a" }]);
    let err = normalize_page::<Listing>(raw, PageRequest::default()).unwrap_err();
    assert!(matches!(err, NormalizeError::Deserialize(_)));
}

#[test]
fn malformed_decimal_is_reported() {
    let raw = json!({ "id": "a", "title": "x", "monthlyRent": { "s": 1, "e": 0, "d": [42] } });
    let err = normalize_one::<Listing>(raw).unwrap_err();
    assert!(matches!(err, NormalizeError::Decimal(_)));
}

#[test]
fn unpaginated_list_and_null() {
    let items: Vec<Listing> = normalize_list(json!({ "data": [listing("a")] })).unwrap();
    assert_eq!(items.len(), 1);
    let empty: Vec<Listing> = normalize_list(json!(null)).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn normalize_error_converts_to_api_error() {
    let err: roomly_core::ApiError = NormalizeError::Shape("bad".into()).into();
    assert!(matches!(err, roomly_core::ApiError::Decode(_)));
}

#[test]
fn null_pagination_synthesizes_a_cursor() {
    let raw = json!({ "data": [listing("a"), listing("b")], "pagination": null });
    let page = normalize_page::<Listing>(raw, PageRequest::new(1, 20)).unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.cursor.total, 2);
    assert_eq!(page.cursor.item_count, 2);
    assert!(!page.cursor.has_next);
}

#[test]
fn out_of_range_decimal_exponent_is_an_error() {
    let raw = json!({
        "id": "a",
        "title": "Room a",
        "monthlyRent": { "s": 1, "e": i64::MIN, "d": [0, 1] }
    });
    let err = normalize_one::<Listing>(raw).unwrap_err();
    assert!(matches!(err, NormalizeError::Decimal(_)));
}
