//! Invoice computation engine.
//!
//! Validates a raw invoice request, resolves the party and transport
//! against the reference store, totals the line items, and converts the
//! grand total to words. Unknown parties and transports are queued for
//! admin approval as a best-effort side effect that never blocks the
//! render.

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use service_core::error::AppError;
use tracing::{debug, info, instrument, warn};

use crate::models::{
    Invoice, InvoiceRequest, LineItem, PendingRequest, ProposalOutcome, RawLineItem,
};
use crate::services::words::rupees_in_words;
use crate::store::ReferenceStore;

pub struct InvoiceService {
    store: Arc<dyn ReferenceStore>,
    tax_rate: Decimal,
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

fn parse_decimal(value: &str, field: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(value.trim())
        .map_err(|_| AppError::Validation(format!("{} must be a number", field)))
}

/// An item counts only when name, quantity, and rate are all present;
/// incomplete rows are dropped without failing the request. Present but
/// non-numeric quantity/rate is a validation error.
fn parse_items(raw: &[RawLineItem]) -> Result<Vec<LineItem>, AppError> {
    let mut items = Vec::with_capacity(raw.len());
    for entry in raw {
        let name = entry.name.trim();
        if name.is_empty() || entry.qty.trim().is_empty() || entry.rate.trim().is_empty() {
            continue;
        }

        let quantity = parse_decimal(&entry.qty, "qty")?;
        let rate = parse_decimal(&entry.rate, "rate")?;
        let unit = match entry.unit.trim() {
            "" => None,
            unit => Some(unit.to_string()),
        };

        items.push(LineItem {
            name: name.to_string(),
            quantity,
            unit,
            rate,
            amount: quantity * rate,
        });
    }
    Ok(items)
}

impl InvoiceService {
    pub fn new(store: Arc<dyn ReferenceStore>, tax_rate: Decimal) -> Self {
        Self { store, tax_rate }
    }

    /// Validate and total an invoice request.
    ///
    /// Subtotal and tax are kept at full precision; only the grand total
    /// is rounded (to whole rupees) as input to the words conversion.
    #[instrument(skip(self, request), fields(invoice_no = %request.invoice_no))]
    pub async fn build_invoice(&self, request: InvoiceRequest) -> Result<Invoice, AppError> {
        let invoice_no = required(&request.invoice_no, "invoice_no")?;
        let date_raw = required(&request.date, "date")?;
        let party_name = required(&request.party_name, "party_name")?;
        let transport_name = required(&request.transport, "transport")?;
        let mut place = required(&request.place, "place")?.to_string();

        let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d")
            .map_err(|_| AppError::Validation("date must be YYYY-MM-DD".to_string()))?
            .format("%d/%m/%Y")
            .to_string();

        let party = self.store.get_party(party_name).await?;
        if let Some(stored) = &party {
            if stored.fixed_place && !stored.place.is_empty() {
                place = stored.place.clone();
            }
        }

        let gstin = request.gstin.trim();
        let pan = request.pan.trim();
        let aadhar = request.aadhar.trim();
        let party_gstin = if !gstin.is_empty() {
            gstin.to_string()
        } else if let Some(stored) = party.as_ref().filter(|p| !p.gstin.is_empty()) {
            stored.gstin.clone()
        } else if !pan.is_empty() {
            format!("URP - {}", pan)
        } else if !aadhar.is_empty() {
            format!("URP - {}", aadhar)
        } else {
            return Err(AppError::Validation(
                "one of gstin, pan or aadhar is required".to_string(),
            ));
        };

        let transport = self.store.get_transport(transport_name).await?;
        let transport_gstin = match request.transport_gstin.trim() {
            "" => transport.as_ref().map(|t| t.gstin.clone()).unwrap_or_default(),
            supplied => supplied.to_string(),
        };

        if party.is_none() {
            self.queue_pending(PendingRequest::party(party_name, &party_gstin, &place))
                .await;
        }
        if transport.is_none() {
            self.queue_pending(PendingRequest::transport(transport_name, &transport_gstin))
                .await;
        }

        let items = parse_items(&request.items)?;
        let subtotal: Decimal = items.iter().map(|item| item.amount).sum();
        let tax = subtotal * self.tax_rate;
        let grand_total = subtotal + tax;

        let whole_rupees = grand_total.round().to_u64().ok_or_else(|| {
            AppError::Validation("grand total must be a non-negative amount".to_string())
        })?;
        let grand_total_words = rupees_in_words(whole_rupees);

        info!(
            invoice_no = invoice_no,
            party = party_name,
            items = items.len(),
            grand_total = %grand_total,
            "Invoice computed"
        );

        Ok(Invoice {
            invoice_no: invoice_no.to_string(),
            date,
            party_name: party_name.to_string(),
            party_gstin,
            place,
            transport: transport_name.to_string(),
            transport_gstin,
            items,
            subtotal,
            tax,
            grand_total,
            grand_total_words,
        })
    }

    /// Best effort: a failed or duplicate proposal never aborts the render.
    async fn queue_pending(&self, proposal: PendingRequest) {
        let kind = proposal.kind.as_str();
        let name = proposal.name.clone();
        match self.store.propose_pending(proposal).await {
            Ok(ProposalOutcome::Created) => {
                info!(kind = kind, name = %name, "Queued new record for approval");
            }
            Ok(ProposalOutcome::AlreadyExists) => {
                debug!(kind = kind, name = %name, "Record already pending approval");
            }
            Err(err) => {
                warn!(kind = kind, name = %name, error = %err, "Failed to queue pending record");
            }
        }
    }
}
