//! Pending-approval queue handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use service_core::error::AppError;

use crate::models::{PendingKind, PendingRequest, ProposalOutcome};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProposeRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub gstin: String,
    #[serde(default)]
    pub place: String,
}

fn parse_kind(kind: &str) -> Result<PendingKind, AppError> {
    PendingKind::parse(kind)
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid kind '{}'", kind)))
}

pub async fn propose(
    State(state): State<AppState>,
    Json(body): Json<ProposeRequest>,
) -> Result<Json<Value>, AppError> {
    let kind = parse_kind(&body.kind)?;
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }

    let request = match kind {
        PendingKind::Party => PendingRequest::party(&body.name, &body.gstin, &body.place),
        PendingKind::Transport => PendingRequest::transport(&body.name, &body.gstin),
    };

    let status = match state.store.propose_pending(request).await? {
        ProposalOutcome::Created => "created",
        ProposalOutcome::AlreadyExists => "exists",
    };
    Ok(Json(json!({ "status": status })))
}

pub async fn list_pending(
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingRequest>>, AppError> {
    Ok(Json(state.store.pending_requests().await?))
}

pub async fn approve(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let kind = parse_kind(&kind)?;
    let status = if state.store.approve_pending(kind, &name).await? {
        "approved"
    } else {
        "missing"
    };
    Ok(Json(json!({ "status": status })))
}

pub async fn reject(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let kind = parse_kind(&kind)?;
    let status = if state.store.reject_pending(kind, &name).await? {
        "rejected"
    } else {
        "missing"
    };
    Ok(Json(json!({ "status": status })))
}
