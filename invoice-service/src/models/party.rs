//! Party model for invoice-service.

use serde::{Deserialize, Serialize};

/// A customer the business bills.
///
/// `name` is the unique key; comparisons are done on the trimmed,
/// uppercased form while the originally-cased name is stored and shown.
/// `gstin` may also carry a synthesized `URP - <PAN/Aadhaar>` value for
/// unregistered persons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    #[serde(default)]
    pub gstin: String,
    #[serde(default)]
    pub place: String,
    /// When true, the stored place overrides whatever the invoice form sent.
    #[serde(default)]
    pub fixed_place: bool,
}

impl Party {
    pub fn new(name: &str, gstin: &str, place: &str, fixed_place: bool) -> Self {
        Self {
            name: name.trim().to_string(),
            gstin: gstin.trim().to_string(),
            place: place.trim().to_string(),
            fixed_place,
        }
    }
}
