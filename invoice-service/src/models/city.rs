//! City reference model for invoice-service.

use serde::{Deserialize, Serialize};

/// A `(city, state)` pair used for place auto-complete.
/// Append-only; unique by the pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub city: String,
    pub state: String,
}

impl City {
    pub fn new(city: &str, state: &str) -> Self {
        Self {
            city: city.trim().to_string(),
            state: state.trim().to_string(),
        }
    }

    /// Display label: the city followed by the state abbreviated to the
    /// first letter of each word, e.g. `MAU (U.P.)` for "Uttar Pradesh".
    pub fn label(&self) -> String {
        let abbrev: String = self
            .state
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .map(|ch| format!("{}.", ch.to_uppercase()))
            .collect();
        format!("{} ({})", self.city, abbrev)
    }
}
