use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a004_technician::aggregate::{Technician, TechnicianDto};
use serde_json::json;

use crate::domain::a004_technician;
use crate::shared::error::log_status;

/// GET /api/technician
pub async fn list_all() -> Result<Json<Vec<Technician>>, StatusCode> {
    a004_technician::service::list_all()
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to list technicians", e))
}

/// GET /api/technician/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Technician>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a004_technician::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(log_status("Failed to load technician", e)),
    }
}

/// POST /api/technician
pub async fn upsert(Json(dto): Json<TechnicianDto>) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = match dto.id.clone() {
        Some(id) => a004_technician::service::update(dto).await.map(|_| id),
        None => a004_technician::service::create(dto).await.map(|id| id.to_string()),
    };

    result
        .map(|id| Json(json!({ "id": id })))
        .map_err(|e| log_status("Failed to save technician", e))
}

/// DELETE /api/technician/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a004_technician::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(log_status("Failed to delete technician", e)),
    }
}
