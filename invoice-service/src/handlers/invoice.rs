//! Invoice generation handler.
//!
//! Accepts either the original form post (parallel `item_name[]` /
//! `qty[]` / `unit[]` / `rate[]` arrays) or the same request as JSON,
//! and responds with the rendered PDF as a download.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
};
use service_core::error::AppError;

use crate::models::{InvoiceRequest, RawLineItem};
use crate::services::{render_invoice, DEFAULT_TERMS};
use crate::AppState;

pub async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let request = parse_request(&headers, &body)?;

    let invoice = state.invoices.build_invoice(request).await?;
    let bank_details = state.store.bank_details().await?;
    let pdf = render_invoice(&invoice, &bank_details, &state.config.business, DEFAULT_TERMS)?;

    tracing::info!(
        invoice_no = %invoice.invoice_no,
        bytes = pdf.len(),
        "Invoice rendered"
    );

    let filename = format!("{}_{}.pdf", invoice.invoice_no, state.config.business.name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        pdf,
    ))
}

fn parse_request(headers: &HeaderMap, body: &Bytes) -> Result<InvoiceRequest, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/json") {
        serde_json::from_slice(body)
            .map_err(|e| AppError::Validation(format!("invalid JSON body: {}", e)))
    } else {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| AppError::Validation(format!("invalid form body: {}", e)))?;
        Ok(request_from_form(pairs))
    }
}

/// Fold the flat form pairs into a request. Item fields arrive as
/// parallel arrays zipped positionally; trailing mismatched-length
/// entries are ignored. Legacy field names from older form revisions
/// (`bill_no`, `customer_name`, `ch_no`) are accepted as aliases.
fn request_from_form(pairs: Vec<(String, String)>) -> InvoiceRequest {
    let mut request = InvoiceRequest::default();
    let mut names = Vec::new();
    let mut quantities = Vec::new();
    let mut units = Vec::new();
    let mut rates = Vec::new();

    for (key, value) in pairs {
        match key.trim_end_matches("[]") {
            "invoice_no" | "bill_no" => request.invoice_no = value,
            "date" => request.date = value,
            "party_name" | "customer_name" => request.party_name = value,
            "place" | "ch_no" => request.place = value,
            "gstin" => request.gstin = value,
            "pan" => request.pan = value,
            "aadhar" => request.aadhar = value,
            "transport" => request.transport = value,
            "transport_gstin" => request.transport_gstin = value,
            "item_name" => names.push(value),
            "qty" => quantities.push(value),
            "unit" => units.push(value),
            "rate" => rates.push(value),
            _ => {}
        }
    }

    let count = names.len().min(quantities.len()).min(rates.len());
    for index in 0..count {
        request.items.push(RawLineItem {
            name: names[index].clone(),
            qty: quantities[index].clone(),
            unit: units.get(index).cloned().unwrap_or_default(),
            rate: rates[index].clone(),
        });
    }
    request
}

#[cfg(test)]
mod tests {
    use super::request_from_form;

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn zips_parallel_item_arrays() {
        let request = request_from_form(vec![
            pair("invoice_no", "53X2"),
            pair("item_name[]", "LINEN"),
            pair("item_name[]", "SHRIMAN"),
            pair("qty[]", "40.5"),
            pair("qty[]", "39.5"),
            pair("rate[]", "552.5"),
            pair("rate[]", "473.25"),
        ]);
        assert_eq!(request.invoice_no, "53X2");
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[1].name, "SHRIMAN");
        assert_eq!(request.items[1].rate, "473.25");
    }

    #[test]
    fn ignores_trailing_mismatched_entries() {
        let request = request_from_form(vec![
            pair("item_name", "LINEN"),
            pair("item_name", "SHRIMAN"),
            pair("qty", "40.5"),
            pair("rate", "552.5"),
        ]);
        assert_eq!(request.items.len(), 1);
        assert_eq!(request.items[0].name, "LINEN");
    }

    #[test]
    fn accepts_legacy_field_names() {
        let request = request_from_form(vec![
            pair("bill_no", "17"),
            pair("customer_name", "JAVED AHMAD"),
            pair("ch_no", "MAUNATH BHANJAN U.P."),
        ]);
        assert_eq!(request.invoice_no, "17");
        assert_eq!(request.party_name, "JAVED AHMAD");
        assert_eq!(request.place, "MAUNATH BHANJAN U.P.");
    }
}
