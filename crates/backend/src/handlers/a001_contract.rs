use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_contract::aggregate::{
    Contract, ContractDto, ContractFilter, ContractStatusUpdate,
};
use serde_json::json;

use crate::domain::a001_contract;
use crate::shared::error::log_status;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/contract
pub async fn list(
    CurrentUser(claims): CurrentUser,
    Query(filter): Query<ContractFilter>,
) -> Result<Json<Vec<Contract>>, StatusCode> {
    let filter = a001_contract::service::scope_filter(filter, &claims)
        .map_err(|e| log_status("Contract list denied", e.into()))?;
    a001_contract::service::list(&filter)
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to list contracts", e))
}

/// GET /api/contract/:id
pub async fn get_by_id(
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Contract>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    let contract = a001_contract::service::get_by_id(uuid)
        .await
        .map_err(|e| log_status("Failed to load contract", e))?
        .ok_or(StatusCode::NOT_FOUND)?;
    a001_contract::service::ensure_access(&contract, &claims)
        .map_err(|e| log_status("Contract access denied", e.into()))?;
    Ok(Json(contract))
}

/// POST /api/contract
pub async fn upsert(Json(dto): Json<ContractDto>) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = match dto.id.clone() {
        Some(id) => a001_contract::service::update(dto).await.map(|_| id),
        None => a001_contract::service::create(dto)
            .await
            .map(|id| id.to_string()),
    };

    result
        .map(|id| Json(json!({ "id": id })))
        .map_err(|e| log_status("Failed to save contract", e))
}

/// POST /api/contract/:id/status
pub async fn set_status(
    Path(id): Path<String>,
    Json(update): Json<ContractStatusUpdate>,
) -> Result<Json<Contract>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a001_contract::service::set_status(uuid, update.status)
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to change contract status", e))
}

/// DELETE /api/contract/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a001_contract::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(log_status("Failed to delete contract", e)),
    }
}
