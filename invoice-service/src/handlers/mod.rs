//! HTTP handlers for invoice-service.

pub mod admin;
pub mod invoice;
pub mod pending;
pub mod reference;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "invoice-service" })),
    )
}
