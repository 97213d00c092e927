//! HTTP integration tests for invoice-service, run against the
//! in-memory store on a random port.

mod common;

use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.url("/health")).send().await.unwrap();

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn json_invoice_download_returns_pdf_attachment() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/invoice/download"))
        .json(&json!({
            "invoice_no": "53X2",
            "date": "2025-06-09",
            "party_name": "JAVED AHMAD",
            "place": "MAUNATH BHANJAN U.P.",
            "gstin": "09APDPA6944B1Z8",
            "transport": "CALCUTTA EXPRESS",
            "items": [
                { "name": "LINEN", "qty": "40.5", "rate": "552.5" },
                { "name": "SHRIMAN", "qty": "39.5", "rate": "473.25" }
            ]
        }))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/pdf"
    );
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("53X2_ANANT CREATION.pdf"));

    let body = response.bytes().await.unwrap();
    assert!(body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn form_invoice_download_zips_parallel_arrays() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/invoice/download"))
        .form(&[
            ("invoice_no", "17"),
            ("date", "2025-06-09"),
            ("party_name", "JAVED AHMAD"),
            ("place", "MAU"),
            ("gstin", "09APDPA6944B1Z8"),
            ("transport", "CALCUTTA EXPRESS"),
            ("item_name[]", "LINEN"),
            ("qty[]", "40.5"),
            ("rate[]", "552.5"),
            ("item_name[]", "SHRIMAN"),
            ("qty[]", "39.5"),
            ("rate[]", "473.25"),
        ])
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let body = response.bytes().await.unwrap();
    assert!(body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn missing_mandatory_field_is_a_400_naming_it() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/invoice/download"))
        .json(&json!({
            "invoice_no": "53X2",
            "date": "2025-06-09",
            "place": "MAU",
            "gstin": "09APDPA6944B1Z8",
            "transport": "CALCUTTA EXPRESS"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("party_name"));
}

#[tokio::test]
async fn missing_tax_id_is_a_400() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/invoice/download"))
        .json(&json!({
            "invoice_no": "53X2",
            "date": "2025-06-09",
            "party_name": "JAVED AHMAD",
            "place": "MAU",
            "transport": "CALCUTTA EXPRESS"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn party_lookup_miss_returns_empty_defaults() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/parties/NOBODY"))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "");
    assert_eq!(body["gstin"], "");
    assert_eq!(body["place"], "");
    assert_eq!(body["fixed_place"], false);
}

#[tokio::test]
async fn invalid_admin_table_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/admin/tables/users"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid table");
}

#[tokio::test]
async fn admin_table_insert_and_list() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/admin/tables/bank_details"))
        .json(&json!({
            "bank_name": "State Bank of India",
            "account_number": "12345678901",
            "ifsc": "SBIN0001234"
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let rows: Value = app
        .client
        .get(app.url("/admin/tables/bank_details"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["ifsc"], "SBIN0001234");
}

#[tokio::test]
async fn pending_workflow_over_http() {
    let app = TestApp::spawn().await;

    // Propose a new party.
    let response = app
        .client
        .post(app.url("/pending"))
        .json(&json!({
            "type": "party",
            "name": "NEW PARTY",
            "gstin": "URP - APDPA6944B",
            "place": "MAU"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "created");

    // Duplicate proposal is acknowledged, not repeated.
    let body: Value = app
        .client
        .post(app.url("/pending"))
        .json(&json!({ "type": "party", "name": "new party" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "exists");

    let pending: Value = app
        .client
        .get(app.url("/admin/pending"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pending.as_array().unwrap().len(), 1);

    // Approve it; the party becomes discoverable with the same attributes.
    let body: Value = app
        .client
        .post(app.url("/admin/pending/party/NEW%20PARTY/approve"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "approved");

    let party: Value = app
        .client
        .get(app.url("/parties/NEW%20PARTY"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(party["gstin"], "URP - APDPA6944B");
    assert_eq!(party["place"], "MAU");

    let pending: Value = app
        .client
        .get(app.url("/admin/pending"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(pending.as_array().unwrap().is_empty());

    // Rejecting the now-missing key reports "nothing to do".
    let body: Value = app
        .client
        .post(app.url("/admin/pending/party/NEW%20PARTY/reject"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "missing");
}

#[tokio::test]
async fn unknown_invoice_party_lands_in_pending_queue() {
    let app = TestApp::spawn().await;

    app.client
        .post(app.url("/invoice/download"))
        .json(&json!({
            "invoice_no": "53X2",
            "date": "2025-06-09",
            "party_name": "JAVED AHMAD",
            "place": "MAU",
            "gstin": "09APDPA6944B1Z8",
            "transport": "CALCUTTA EXPRESS",
            "items": [{ "name": "LINEN", "qty": "40.5", "rate": "552.5" }]
        }))
        .send()
        .await
        .unwrap();

    let pending: Value = app
        .client
        .get(app.url("/admin/pending"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entries = pending.as_array().unwrap();
    assert!(entries
        .iter()
        .any(|p| p["type"] == "party" && p["name"] == "JAVED AHMAD"));
    assert!(entries
        .iter()
        .any(|p| p["type"] == "transport" && p["name"] == "CALCUTTA EXPRESS"));
}
