use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a003_customer::aggregate::{Customer, CustomerDto};
use serde_json::json;

use crate::domain::a003_customer;
use crate::shared::error::log_status;

/// GET /api/customer
pub async fn list_all() -> Result<Json<Vec<Customer>>, StatusCode> {
    a003_customer::service::list_all()
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to list customers", e))
}

/// GET /api/customer/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Customer>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a003_customer::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(log_status("Failed to load customer", e)),
    }
}

/// POST /api/customer
pub async fn upsert(Json(dto): Json<CustomerDto>) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = match dto.id.clone() {
        Some(id) => a003_customer::service::update(dto).await.map(|_| id),
        None => a003_customer::service::create(dto).await.map(|id| id.to_string()),
    };

    result
        .map(|id| Json(json!({ "id": id })))
        .map_err(|e| log_status("Failed to save customer", e))
}

/// DELETE /api/customer/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a003_customer::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(log_status("Failed to delete customer", e)),
    }
}
