//! Transport model for invoice-service.

use serde::{Deserialize, Serialize};

/// A goods carrier. Same lifecycle as [`super::Party`], simpler schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transport {
    pub name: String,
    #[serde(default)]
    pub gstin: String,
}

impl Transport {
    pub fn new(name: &str, gstin: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            gstin: gstin.trim().to_string(),
        }
    }
}
