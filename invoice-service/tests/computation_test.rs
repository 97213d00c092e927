//! Invoice computation tests for invoice-service.

use std::str::FromStr;
use std::sync::Arc;

use invoice_service::models::{InvoiceRequest, Party, PendingKind, RawLineItem, Transport};
use invoice_service::services::InvoiceService;
use invoice_service::store::{MemoryStore, ReferenceStore};
use rust_decimal::Decimal;
use service_core::error::AppError;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).expect("valid decimal literal")
}

fn setup() -> (Arc<MemoryStore>, InvoiceService) {
    let store = Arc::new(MemoryStore::new());
    let service = InvoiceService::new(store.clone(), dec("0.05"));
    (store, service)
}

fn item(name: &str, qty: &str, rate: &str) -> RawLineItem {
    RawLineItem {
        name: name.to_string(),
        qty: qty.to_string(),
        unit: String::new(),
        rate: rate.to_string(),
    }
}

fn base_request() -> InvoiceRequest {
    InvoiceRequest {
        invoice_no: "53X2".to_string(),
        date: "2025-06-09".to_string(),
        party_name: "JAVED AHMAD".to_string(),
        place: "MAUNATH BHANJAN U.P.".to_string(),
        gstin: "09APDPA6944B1Z8".to_string(),
        transport: "CALCUTTA EXPRESS".to_string(),
        items: vec![
            item("LINEN", "40.5", "552.5"),
            item("SHRIMAN", "39.5", "473.25"),
        ],
        ..Default::default()
    }
}

#[tokio::test]
async fn end_to_end_totals() {
    let (_store, service) = setup();

    let invoice = service.build_invoice(base_request()).await.unwrap();

    assert_eq!(invoice.items.len(), 2);
    assert_eq!(invoice.items[0].amount, dec("22376.25"));
    assert_eq!(invoice.items[1].amount, dec("18693.375"));
    assert_eq!(invoice.subtotal, dec("41069.625"));
    assert_eq!(invoice.tax, dec("2053.48125"));
    assert_eq!(invoice.grand_total, dec("43123.10625"));
    assert_eq!(
        invoice.grand_total_words,
        "Forty Three Thousand One Hundred Twenty Three Rupees Only"
    );
}

#[tokio::test]
async fn date_is_reformatted_for_display() {
    let (_store, service) = setup();
    let invoice = service.build_invoice(base_request()).await.unwrap();
    assert_eq!(invoice.date, "09/06/2025");
}

#[tokio::test]
async fn unparsable_date_is_a_validation_error() {
    let (_store, service) = setup();
    let mut request = base_request();
    request.date = "09/06/2025".to_string();

    let err = service.build_invoice(request).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn words_follow_the_rounded_grand_total() {
    let (_store, service) = setup();
    let mut request = base_request();
    // 1028.57 * 1.05 = 1079.9985, which rounds to 1080 whole rupees.
    request.items = vec![item("LINEN", "1", "1028.57")];

    let invoice = service.build_invoice(request).await.unwrap();

    assert_eq!(invoice.grand_total, dec("1079.9985"));
    assert_eq!(invoice.grand_total_words, "One Thousand Eighty Rupees Only");
}

#[tokio::test]
async fn incomplete_items_are_dropped_silently() {
    let (_store, service) = setup();
    let mut request = base_request();
    request.items = vec![
        item("LINEN", "40.5", "552.5"),
        item("", "1", "100"),
        item("NO QTY", "", "100"),
        item("NO RATE", "1", ""),
    ];

    let invoice = service.build_invoice(request).await.unwrap();

    assert_eq!(invoice.items.len(), 1);
    assert_eq!(invoice.subtotal, dec("22376.25"));
}

#[tokio::test]
async fn non_numeric_quantity_is_a_validation_error() {
    let (_store, service) = setup();
    let mut request = base_request();
    request.items = vec![item("LINEN", "forty", "552.5")];

    let err = service.build_invoice(request).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn missing_mandatory_field_names_the_field() {
    let (_store, service) = setup();
    let mut request = base_request();
    request.party_name = String::new();

    let err = service.build_invoice(request).await.unwrap_err();
    match err {
        AppError::Validation(msg) => assert!(msg.contains("party_name")),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_tax_id_is_a_validation_error() {
    let (_store, service) = setup();
    let mut request = base_request();
    request.gstin = String::new();

    let err = service.build_invoice(request).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn pan_synthesizes_urp_gstin_and_wins_over_aadhar() {
    let (_store, service) = setup();
    let mut request = base_request();
    request.gstin = String::new();
    request.pan = "APDPA6944B".to_string();
    request.aadhar = "123412341234".to_string();

    let invoice = service.build_invoice(request).await.unwrap();
    assert_eq!(invoice.party_gstin, "URP - APDPA6944B");
}

#[tokio::test]
async fn aadhar_is_used_when_no_pan() {
    let (_store, service) = setup();
    let mut request = base_request();
    request.gstin = String::new();
    request.aadhar = "123412341234".to_string();

    let invoice = service.build_invoice(request).await.unwrap();
    assert_eq!(invoice.party_gstin, "URP - 123412341234");
}

#[tokio::test]
async fn stored_party_supplies_gstin_and_fixed_place() {
    let (store, service) = setup();
    store
        .upsert_party(Party::new("JAVED AHMAD", "09APDPA6944B1Z8", "SURAT", true))
        .await
        .unwrap();

    let mut request = base_request();
    request.gstin = String::new();

    let invoice = service.build_invoice(request).await.unwrap();
    assert_eq!(invoice.party_gstin, "09APDPA6944B1Z8");
    assert_eq!(invoice.place, "SURAT");
}

#[tokio::test]
async fn unknown_party_and_transport_are_queued_once() {
    let (store, service) = setup();

    service.build_invoice(base_request()).await.unwrap();
    // A second render of the same invoice must not duplicate the queue.
    service.build_invoice(base_request()).await.unwrap();

    let pending = store.pending_requests().await.unwrap();
    assert_eq!(pending.len(), 2);
    assert!(pending
        .iter()
        .any(|p| p.kind == PendingKind::Party && p.name == "JAVED AHMAD"));
    assert!(pending
        .iter()
        .any(|p| p.kind == PendingKind::Transport && p.name == "CALCUTTA EXPRESS"));
}

#[tokio::test]
async fn known_party_and_transport_queue_nothing() {
    let (store, service) = setup();
    store
        .upsert_party(Party::new("JAVED AHMAD", "09APDPA6944B1Z8", "", false))
        .await
        .unwrap();
    store
        .upsert_transport(Transport::new("CALCUTTA EXPRESS", ""))
        .await
        .unwrap();

    service.build_invoice(base_request()).await.unwrap();

    assert!(store.pending_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_item_list_totals_to_zero() {
    let (_store, service) = setup();
    let mut request = base_request();
    request.items.clear();

    let invoice = service.build_invoice(request).await.unwrap();
    assert_eq!(invoice.subtotal, Decimal::ZERO);
    assert_eq!(invoice.grand_total_words, "Zero Rupees Only");
}
