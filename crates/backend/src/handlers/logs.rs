use axum::{extract::Query, http::StatusCode, Json};
use contracts::shared::logger::{CreateLogRequest, LogEntry};
use serde::Deserialize;

use crate::shared::error::log_status;
use crate::shared::logger;

const DEFAULT_LIMIT: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    #[serde(default)]
    pub limit: Option<u64>,
}

/// GET /api/logs
pub async fn list_all(Query(query): Query<LogsQuery>) -> Result<Json<Vec<LogEntry>>, StatusCode> {
    logger::repository::get_recent_logs(query.limit.unwrap_or(DEFAULT_LIMIT))
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to load logs", e))
}

/// POST /api/logs
pub async fn create(Json(req): Json<CreateLogRequest>) -> StatusCode {
    match logger::repository::log_event(&req.source, &req.level, &req.category, &req.message).await {
        Ok(_) => StatusCode::OK,
        Err(e) => log_status("Failed to write log", e),
    }
}

/// DELETE /api/logs
pub async fn clear_all() -> StatusCode {
    match logger::repository::clear_all_logs().await {
        Ok(_) => StatusCode::OK,
        Err(e) => log_status("Failed to clear logs", e),
    }
}
