//! Domain models for invoice-service.

mod bank_detail;
mod city;
mod invoice;
mod party;
mod pending;
mod transport;

pub use bank_detail::BankDetail;
pub use city::City;
pub use invoice::{Invoice, InvoiceRequest, LineItem, RawLineItem};
pub use party::Party;
pub use pending::{PendingKind, PendingRequest, ProposalOutcome};
pub use transport::Transport;
