//! Generic admin table handlers.
//!
//! List/insert/delete against a fixed allow-list of table names; any
//! other name is rejected with a 400 `{"error": "Invalid table"}`.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use service_core::error::AppError;

use crate::models::{BankDetail, Party, Transport};
use crate::AppState;

#[derive(Debug, Clone, Copy)]
enum AdminTable {
    Parties,
    Transports,
    Cities,
    BankDetails,
}

impl AdminTable {
    fn parse(name: &str) -> Result<Self, AppError> {
        match name {
            "parties" => Ok(AdminTable::Parties),
            "transports" => Ok(AdminTable::Transports),
            "cities" => Ok(AdminTable::Cities),
            "bank_details" => Ok(AdminTable::BankDetails),
            _ => Err(AppError::BadRequest(anyhow::anyhow!("Invalid table"))),
        }
    }
}

pub async fn list_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<Value>, AppError> {
    let rows = match AdminTable::parse(&table)? {
        AdminTable::Parties => json!(state.store.parties().await?),
        AdminTable::Transports => json!(state.store.transports().await?),
        AdminTable::Cities => json!(state.store.cities().await?),
        AdminTable::BankDetails => json!(state.store.bank_details().await?),
    };
    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
struct CityInsert {
    city: String,
    state: String,
}

fn decode<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::Validation(format!("invalid record: {}", e)))
}

pub async fn insert_record(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    match AdminTable::parse(&table)? {
        AdminTable::Parties => {
            let party: Party = decode(body)?;
            if party.name.trim().is_empty() {
                return Err(AppError::Validation("name is required".to_string()));
            }
            state
                .store
                .upsert_party(Party::new(
                    &party.name,
                    &party.gstin,
                    &party.place,
                    party.fixed_place,
                ))
                .await?;
        }
        AdminTable::Transports => {
            let transport: Transport = decode(body)?;
            if transport.name.trim().is_empty() {
                return Err(AppError::Validation("name is required".to_string()));
            }
            state
                .store
                .upsert_transport(Transport::new(&transport.name, &transport.gstin))
                .await?;
        }
        AdminTable::Cities => {
            let city: CityInsert = decode(body)?;
            if city.city.trim().is_empty() || city.state.trim().is_empty() {
                return Err(AppError::Validation("city and state are required".to_string()));
            }
            state.store.add_city(&city.city, &city.state).await?;
        }
        AdminTable::BankDetails => {
            let bank: BankDetail = decode(body)?;
            if bank.bank_name.trim().is_empty() || bank.account_number.trim().is_empty() {
                return Err(AppError::Validation(
                    "bank_name and account_number are required".to_string(),
                ));
            }
            state.store.add_bank_detail(bank).await?;
        }
    }
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path((table, name)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let removed = match AdminTable::parse(&table)? {
        AdminTable::Parties => state.store.delete_party(&name).await?,
        AdminTable::Transports => state.store.delete_transport(&name).await?,
        AdminTable::Cities | AdminTable::BankDetails => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Delete is not supported for this table"
            )));
        }
    };
    let status = if removed { "deleted" } else { "missing" };
    Ok(Json(json!({ "status": status })))
}
