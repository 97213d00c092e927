//! Pending-approval queue models for invoice-service.

use serde::{Deserialize, Serialize};

/// Which reference table a pending request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingKind {
    Party,
    Transport,
}

impl PendingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PendingKind::Party => "party",
            PendingKind::Transport => "transport",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "party" => Some(PendingKind::Party),
            "transport" => Some(PendingKind::Transport),
            _ => None,
        }
    }
}

/// A proposed party or transport awaiting admin confirmation.
///
/// At most one pending entry may exist per `(kind, normalized name)`,
/// and none may exist while a confirmed record with that key does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    #[serde(rename = "type")]
    pub kind: PendingKind,
    pub name: String,
    #[serde(default)]
    pub gstin: String,
    #[serde(default)]
    pub place: String,
}

impl PendingRequest {
    pub fn party(name: &str, gstin: &str, place: &str) -> Self {
        Self {
            kind: PendingKind::Party,
            name: name.trim().to_string(),
            gstin: gstin.trim().to_string(),
            place: place.trim().to_string(),
        }
    }

    pub fn transport(name: &str, gstin: &str) -> Self {
        Self {
            kind: PendingKind::Transport,
            name: name.trim().to_string(),
            gstin: gstin.trim().to_string(),
            place: String::new(),
        }
    }
}

/// Result of proposing a pending entry. A duplicate (pending or already
/// confirmed) is a legitimate outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalOutcome {
    Created,
    AlreadyExists,
}
