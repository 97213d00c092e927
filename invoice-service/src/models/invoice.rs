//! Invoice models for invoice-service.
//!
//! Invoices are transient: they exist for the duration of one render
//! request and are never persisted. Re-rendering the same invoice number
//! produces an independent document.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw line-item input exactly as submitted. Numeric fields stay strings
/// until the computation step parses them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLineItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub qty: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub rate: String,
}

/// Invoice generation input, from a form post or a JSON body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceRequest {
    #[serde(default)]
    pub invoice_no: String,
    /// `YYYY-MM-DD`; reformatted to `DD/MM/YYYY` for display.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub party_name: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub gstin: String,
    #[serde(default)]
    pub pan: String,
    #[serde(default)]
    pub aadhar: String,
    #[serde(default)]
    pub transport: String,
    #[serde(default)]
    pub transport_gstin: String,
    #[serde(default)]
    pub items: Vec<RawLineItem>,
}

/// A validated, priced line item.
#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub rate: Decimal,
    /// `quantity * rate` at full precision.
    pub amount: Decimal,
}

/// A fully computed invoice ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct Invoice {
    pub invoice_no: String,
    /// Display date, `DD/MM/YYYY`.
    pub date: String,
    pub party_name: String,
    /// Resolved GSTIN, possibly a synthesized `URP - <id>` value.
    pub party_gstin: String,
    pub place: String,
    pub transport: String,
    pub transport_gstin: String,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub grand_total: Decimal,
    pub grand_total_words: String,
}
