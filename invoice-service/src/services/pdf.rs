//! Fixed-layout A4 tax-invoice renderer.
//!
//! A pure function from a computed invoice (plus the bank-account list
//! and terms strings) to PDF bytes. All coordinates are fixed; nothing
//! here makes business decisions.

use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use rust_decimal::Decimal;
use service_core::error::AppError;

use crate::config::BusinessProfile;
use crate::models::{BankDetail, Invoice};

/// Terms printed on every invoice.
pub const DEFAULT_TERMS: &[&str] = &[
    "Goods once sold will not be taken back.",
    "Interest @18% p.a. will be charged on overdue payment.",
    "Subject to Surat jurisdiction only. E.& O.E.",
];

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;

/// Item-table column text positions and the vertical rules between them.
const COL_TEXT: [f32; 5] = [12.0, 74.0, 102.0, 128.0, 163.0];
const COL_RULES: [f32; 6] = [10.0, 72.0, 100.0, 126.0, 161.0, 200.0];
const ITEM_ROWS: usize = 15;
const ROW_PITCH: f32 = 5.2;

fn money(value: &Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn text(layer: &PdfLayerReference, font: &IndirectFontRef, s: &str, size: f32, x: f32, y: f32) {
    layer.use_text(s, size, Mm(x), Mm(y), font);
}

fn horizontal_line(layer: &PdfLayerReference, x1: f32, x2: f32, y: f32) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y)), false),
            (Point::new(Mm(x2), Mm(y)), false),
        ],
        is_closed: false,
    });
}

fn vertical_line(layer: &PdfLayerReference, x: f32, y1: f32, y2: f32) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x), Mm(y1)), false),
            (Point::new(Mm(x), Mm(y2)), false),
        ],
        is_closed: false,
    });
}

pub fn render_invoice(
    invoice: &Invoice,
    bank_details: &[BankDetail],
    business: &BusinessProfile,
    terms: &[&str],
) -> Result<Vec<u8>, AppError> {
    let (doc, page, layer) = PdfDocument::new("Tax Invoice", Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let layer = doc.get_page(page).get_layer(layer);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("PDF font error: {}", e)))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("PDF font error: {}", e)))?;

    layer.set_outline_thickness(0.4);

    // Outer border
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(7.0), Mm(7.0)), false),
            (Point::new(Mm(PAGE_W - 7.0), Mm(7.0)), false),
            (Point::new(Mm(PAGE_W - 7.0), Mm(PAGE_H - 7.0)), false),
            (Point::new(Mm(7.0), Mm(PAGE_H - 7.0)), false),
        ],
        is_closed: true,
    });

    // Header
    text(&layer, &bold, "TAX INVOICE", 14.0, 87.0, 283.0);
    text(&layer, &bold, &business.name, 10.0, 12.0, 275.0);
    text(&layer, &font, &business.address, 9.0, 12.0, 270.0);
    text(
        &layer,
        &font,
        &format!("GSTIN: {}    MO: {}", business.gstin, business.phone),
        9.0,
        12.0,
        265.0,
    );
    text(
        &layer,
        &bold,
        &format!("Invoice No: {}", invoice.invoice_no),
        9.0,
        150.0,
        275.0,
    );
    text(&layer, &bold, &format!("Date: {}", invoice.date), 9.0, 150.0, 270.0);
    horizontal_line(&layer, 10.0, 200.0, 262.0);

    // Party block
    text(&layer, &bold, "Party's Name:", 9.0, 12.0, 256.0);
    text(&layer, &font, &invoice.party_name, 9.0, 40.0, 256.0);
    text(&layer, &bold, "Transport:", 9.0, 105.0, 256.0);
    text(&layer, &font, &invoice.transport, 9.0, 130.0, 256.0);
    text(&layer, &bold, "Place:", 9.0, 12.0, 251.0);
    text(&layer, &font, &invoice.place, 9.0, 40.0, 251.0);
    if !invoice.transport_gstin.is_empty() {
        text(&layer, &bold, "GSTIN:", 9.0, 105.0, 251.0);
        text(&layer, &font, &invoice.transport_gstin, 9.0, 130.0, 251.0);
    }
    text(&layer, &bold, "GSTIN No:", 9.0, 12.0, 246.0);
    text(&layer, &font, &invoice.party_gstin, 9.0, 40.0, 246.0);
    horizontal_line(&layer, 10.0, 200.0, 242.0);

    // Item table header
    let table_top = 240.0;
    text(&layer, &bold, "Item", 9.0, COL_TEXT[0], 236.0);
    text(&layer, &bold, "HSN/SAC", 9.0, COL_TEXT[1], 236.0);
    text(&layer, &bold, "Qty", 9.0, COL_TEXT[2], 236.0);
    text(&layer, &bold, "Rate", 9.0, COL_TEXT[3], 236.0);
    text(&layer, &bold, "Amount", 9.0, COL_TEXT[4], 236.0);
    horizontal_line(&layer, 10.0, 200.0, 233.5);

    // Body rows, padded to a fixed height
    let mut y = 228.5;
    for item in invoice.items.iter().take(ITEM_ROWS) {
        let name = match &item.unit {
            Some(unit) => format!("{} ({})", item.name, unit),
            None => item.name.clone(),
        };
        text(&layer, &font, &name, 9.0, COL_TEXT[0], y);
        text(&layer, &font, &business.hsn_code, 9.0, COL_TEXT[1], y);
        text(&layer, &font, &money(&item.quantity), 9.0, COL_TEXT[2], y);
        text(&layer, &font, &money(&item.rate), 9.0, COL_TEXT[3], y);
        text(&layer, &font, &money(&item.amount), 9.0, COL_TEXT[4], y);
        y -= ROW_PITCH;
    }
    let body_bottom = 228.5 - ITEM_ROWS as f32 * ROW_PITCH + 2.0;
    horizontal_line(&layer, 10.0, 200.0, body_bottom);

    // Totals
    let tax_percent = (business.tax_rate * Decimal::from(100)).normalize();
    let igst_label = format!("Add IGST @{}%", tax_percent);
    let mut total_y = body_bottom - 4.5;
    for (label, value) in [
        ("Total", &invoice.subtotal),
        (igst_label.as_str(), &invoice.tax),
        ("Grand Total", &invoice.grand_total),
    ] {
        text(&layer, &bold, label, 9.0, COL_TEXT[3], total_y);
        text(&layer, &bold, &money(value), 9.0, COL_TEXT[4], total_y);
        total_y -= ROW_PITCH;
    }
    let totals_bottom = total_y + ROW_PITCH - 2.5;
    horizontal_line(&layer, 10.0, 200.0, totals_bottom);

    for x in COL_RULES {
        vertical_line(&layer, x, table_top, totals_bottom);
    }
    horizontal_line(&layer, 10.0, 200.0, table_top);

    // Amount in words
    let words_bottom = totals_bottom - 8.0;
    text(&layer, &bold, "Grand Total (in Words)", 9.0, 12.0, words_bottom + 2.5);
    text(&layer, &font, &invoice.grand_total_words, 9.0, 62.0, words_bottom + 2.5);
    horizontal_line(&layer, 10.0, 200.0, words_bottom);
    vertical_line(&layer, 10.0, totals_bottom, words_bottom);
    vertical_line(&layer, 60.0, totals_bottom, words_bottom);
    vertical_line(&layer, 200.0, totals_bottom, words_bottom);

    // Bank details
    let mut bank_y = words_bottom - 7.0;
    text(&layer, &bold, "Bank Details", 9.0, 12.0, bank_y);
    bank_y -= 5.0;
    if !bank_details.is_empty() {
        text(&layer, &bold, "Bank Name", 8.0, 12.0, bank_y);
        text(&layer, &bold, "Account No", 8.0, 80.0, bank_y);
        text(&layer, &bold, "IFSC", 8.0, 140.0, bank_y);
        bank_y -= 4.5;
        for bank in bank_details {
            text(&layer, &font, &bank.bank_name, 8.0, 12.0, bank_y);
            text(&layer, &font, &bank.account_number, 8.0, 80.0, bank_y);
            text(&layer, &font, &bank.ifsc, 8.0, 140.0, bank_y);
            bank_y -= 4.5;
        }
    }

    // Terms
    let mut terms_y = bank_y - 6.0;
    text(&layer, &bold, "Terms & Conditions", 9.0, 12.0, terms_y);
    terms_y -= 4.5;
    for (index, term) in terms.iter().enumerate() {
        text(
            &layer,
            &font,
            &format!("{}. {}", index + 1, term),
            8.0,
            12.0,
            terms_y,
        );
        terms_y -= 4.0;
    }

    // Signature block
    text(&layer, &bold, &format!("For {}", business.name), 9.0, 150.0, 20.0);
    text(&layer, &font, "Authorised Signatory", 9.0, 150.0, 13.0);

    let mut writer = std::io::BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("PDF write error: {}", e)))?;
    writer
        .into_inner()
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("PDF buffer error: {}", e)))
}
