//! Reference-data lookup handlers.
//!
//! Lookups return an empty-string-default object on a miss, never a 404;
//! the form frontend treats absence as "nothing to pre-fill".

use axum::{
    extract::{Path, State},
    Json,
};
use service_core::error::AppError;

use crate::models::{Party, Transport};
use crate::AppState;

pub async fn list_parties(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.store.party_names().await?))
}

pub async fn get_party(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Party>, AppError> {
    let party = state.store.get_party(&name).await?.unwrap_or_default();
    Ok(Json(party))
}

pub async fn list_transports(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.store.transport_names().await?))
}

pub async fn get_transport(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Transport>, AppError> {
    let transport = state.store.get_transport(&name).await?.unwrap_or_default();
    Ok(Json(transport))
}

/// City labels for place auto-complete, e.g. `MAU (U.P.)`, sorted.
pub async fn list_cities(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let mut labels: Vec<String> = state
        .store
        .cities()
        .await?
        .iter()
        .map(|city| city.label())
        .collect();
    labels.sort();
    Ok(Json(labels))
}
