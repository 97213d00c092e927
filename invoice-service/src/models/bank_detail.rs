//! Bank account model for invoice-service.

use serde::{Deserialize, Serialize};

/// A bank account printed verbatim into every invoice's bank section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetail {
    pub bank_name: String,
    pub account_number: String,
    pub ifsc: String,
}
