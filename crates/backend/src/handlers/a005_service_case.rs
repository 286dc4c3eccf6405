use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a005_service_case::aggregate::{CaseFilter, ServiceCase, ServiceCaseDto};
use serde_json::json;

use crate::domain::a005_service_case;
use crate::shared::error::log_status;

/// GET /api/service_case
pub async fn list(Query(filter): Query<CaseFilter>) -> Result<Json<Vec<ServiceCase>>, StatusCode> {
    a005_service_case::service::list(&filter)
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to list service cases", e))
}

/// GET /api/service_case/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<ServiceCase>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a005_service_case::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(log_status("Failed to load service case", e)),
    }
}

/// POST /api/service_case
pub async fn upsert(Json(dto): Json<ServiceCaseDto>) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = match dto.id.clone() {
        Some(id) => a005_service_case::service::update(dto).await.map(|_| id),
        None => a005_service_case::service::create(dto).await.map(|id| id.to_string()),
    };

    result
        .map(|id| Json(json!({ "id": id })))
        .map_err(|e| log_status("Failed to save service case", e))
}

/// DELETE /api/service_case/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    match a005_service_case::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(log_status("Failed to delete service case", e)),
    }
}
