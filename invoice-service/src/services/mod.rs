//! Business services for invoice-service.

mod invoice;
mod pdf;
mod words;

pub use invoice::InvoiceService;
pub use pdf::{render_invoice, DEFAULT_TERMS};
pub use words::{number_to_words, rupees_in_words};
