mod common;

use common::{bill, contract, stores};
use http::{Method, StatusCode};
use roomly_core::ApiError;
use roomly_market::{BillFilters, BillStatus, ContractPdf, ContractStatus, CreateBill};
use roomly_test::{enveloped, paginated, MockBackend};
use serde_json::json;

#[tokio::test]
async fn test_pdf_link_is_returned_directly() {
    let backend = MockBackend::new();
    backend.reply(Method::GET, "/contracts/c-1/pdf", enveloped(json!({ "url": "https://cdn/c-1.pdf" })));
    let stores = stores(&backend);

    let pdf = stores.contracts.pdf("c-1").await.unwrap();
    assert_eq!(pdf.url, "https://cdn/c-1.pdf");
    assert_eq!(backend.call_count(Method::POST, "/contracts/c-1/pdf"), 0);
    assert_eq!(stores.contracts.pdf_state().pdf, Some(pdf));
}

#[tokio::test]
async fn test_missing_pdf_is_regenerated_then_fetched() {
    let backend = MockBackend::new();
    backend
        .not_found(Method::GET, "/contracts/c-1/pdf")
        .reply(Method::POST, "/contracts/c-1/pdf", json!({ "message": "queued" }))
        .reply(Method::GET, "/contracts/c-1/pdf", json!({ "url": "https://cdn/c-1.pdf" }));
    let stores = stores(&backend);

    let pdf = stores.contracts.pdf("c-1").await.unwrap();
    assert_eq!(
        pdf,
        ContractPdf {
            url: "https://cdn/c-1.pdf".into()
        }
    );
    assert_eq!(backend.call_count(Method::GET, "/contracts/c-1/pdf"), 2);
    assert_eq!(backend.call_count(Method::POST, "/contracts/c-1/pdf"), 1);
}

#[tokio::test]
async fn test_pdf_server_error_is_not_retried() {
    let backend = MockBackend::new();
    backend.fail(
        Method::GET,
        "/contracts/c-1/pdf",
        ApiError::status(StatusCode::INTERNAL_SERVER_ERROR, "renderer down"),
    );
    let stores = stores(&backend);

    let err = stores.contracts.pdf("c-1").await.unwrap_err();
    assert_eq!(err.status_code(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(backend.calls().len(), 1);

    let state = stores.contracts.pdf_state();
    assert_eq!(state.request.error.as_deref(), Some("Could not load the contract PDF"));
    assert!(state.pdf.is_none());
}

#[tokio::test]
async fn test_sign_updates_contract_everywhere() {
    let backend = MockBackend::new();
    backend
        .reply(Method::GET, "/contracts/me", paginated(vec![contract("c-1", "pending_signature")], 1, 20, 1))
        .reply(Method::GET, "/contracts/c-1", contract("c-1", "pending_signature"))
        .reply(Method::PATCH, "/contracts/c-1/sign", contract("c-1", "signed"));
    let stores = stores(&backend);
    stores.contracts.load(Default::default(), false).await;
    stores.contracts.load_contract("c-1").await;

    let signed = stores.contracts.sign("c-1").await.unwrap();
    assert_eq!(signed.status, ContractStatus::Signed);
    assert_eq!(
        stores.contracts.contracts().list().snapshot().items[0].status,
        ContractStatus::Signed
    );
    assert_eq!(
        stores.contracts.contracts().detail().record().unwrap().status,
        ContractStatus::Signed
    );
}

#[tokio::test]
async fn test_bill_requires_contract() {
    let backend = MockBackend::new();
    let stores = stores(&backend);

    let err = stores
        .bills
        .create(&CreateBill {
            contract_id: String::new(),
            amount: "3500000".into(),
            due_date: None,
            description: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Precondition(_)));
    assert!(backend.calls().is_empty());
    assert_eq!(
        stores.bills.bills().mutation_state().error.as_deref(),
        Some("A contract is required to create a bill")
    );
}

#[tokio::test]
async fn test_bill_list_filters_and_pay() {
    let backend = MockBackend::new();
    backend
        .reply(Method::GET, "/bills/me", paginated(vec![bill("bl-1", "unpaid")], 1, 20, 1))
        .reply(Method::PATCH, "/bills/bl-1/pay", bill("bl-1", "paid"));
    let stores = stores(&backend);

    stores
        .bills
        .load(
            BillFilters {
                status: Some(BillStatus::Unpaid),
                contract_id: Some("c-1".into()),
            },
            false,
        )
        .await;
    let call = backend.last_call(Method::GET, "/bills/me").unwrap();
    assert!(call.query.contains(&("status".into(), "unpaid".into())));
    assert!(call.query.contains(&("contractId".into(), "c-1".into())));

    let list = stores.bills.bills().list().snapshot();
    assert_eq!(list.items[0].amount, "3500000");

    let paid = stores.bills.pay("bl-1").await.unwrap();
    assert_eq!(paid.status, BillStatus::Paid);
    assert_eq!(stores.bills.bills().list().snapshot().items[0].status, BillStatus::Paid);
}
