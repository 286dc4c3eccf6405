use axum::{
    extract::{Path, Query},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use contracts::domain::a002_contract_file::aggregate::{
    ContractFile, FileDisposition, FileLink, FileLinkRequest, FileSyncResult,
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;

use crate::domain::a002_contract_file::service::{self, ContentQuery};
use crate::shared::error::log_status;
use crate::shared::events;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/contract/:id/files
pub async fn list_files(
    CurrentUser(claims): CurrentUser,
    Path(contract_id): Path<String>,
) -> Result<Json<Vec<ContractFile>>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&contract_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    service::list_files(uuid, &claims)
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to list contract files", e))
}

/// POST /api/contract/:id/files/sync
pub async fn sync(
    CurrentUser(claims): CurrentUser,
    Path(contract_id): Path<String>,
) -> Result<Json<FileSyncResult>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&contract_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    service::sync_from_provider(uuid, &claims)
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to sync contract files", e))
}

/// POST /api/contract_file/:id/link
pub async fn create_link(
    CurrentUser(claims): CurrentUser,
    Path(file_id): Path<String>,
    Json(request): Json<FileLinkRequest>,
) -> Result<Json<FileLink>, StatusCode> {
    service::create_link(&file_id, request.disposition, &claims)
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to create file link", e))
}

/// POST /api/contract_file/:id/confirm
pub async fn confirm(
    CurrentUser(claims): CurrentUser,
    Path(file_id): Path<String>,
) -> Result<Json<ContractFile>, StatusCode> {
    service::confirm_download(&file_id, &claims)
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to confirm download", e))
}

fn content_disposition(disposition: FileDisposition, name: &str) -> String {
    format!(
        "{}; filename*=UTF-8''{}",
        disposition.as_str(),
        urlencoding::encode(name)
    )
}

/// GET /api/contract_file/:id/content?disposition=..&expires=..&sig=..
pub async fn content(
    Path(file_id): Path<String>,
    Query(query): Query<ContentQuery>,
) -> Result<Response, StatusCode> {
    let (file, bytes) = service::serve_content(&file_id, &query)
        .await
        .map_err(|e| log_status("Failed to serve file content", e))?;

    Ok((
        [
            (header::CONTENT_TYPE, service::content_type_for(&file.name).to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(query.disposition, &file.name),
            ),
            (header::CACHE_CONTROL, "private, no-store".to_string()),
        ],
        bytes,
    )
        .into_response())
}

/// HEAD /api/contract_file/:id/content?..
///
/// Проверка ссылки перед скачиванием: без содержимого и без смены статуса.
pub async fn content_head(
    Path(file_id): Path<String>,
    Query(query): Query<ContentQuery>,
) -> Result<Response, StatusCode> {
    let file = service::check_content(&file_id, &query)
        .await
        .map_err(|e| log_status("Failed to check file link", e))?;

    Ok([
        (header::CONTENT_TYPE, service::content_type_for(&file.name).to_string()),
        (
            header::CONTENT_DISPOSITION,
            content_disposition(query.disposition, &file.name),
        ),
        (header::CACHE_CONTROL, "private, no-store".to_string()),
    ]
    .into_response())
}

/// GET /api/contract_file/events (SSE)
pub async fn events() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = events::hub().stream().filter_map(|event| async move {
        match Event::default().event("contract_file").json_data(&event) {
            Ok(sse_event) => Some(Ok(sse_event)),
            Err(e) => {
                tracing::warn!("Failed to encode contract file event: {}", e);
                None
            }
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_encodes_name() {
        assert_eq!(
            content_disposition(FileDisposition::Attachment, "Договор 1.pdf"),
            "attachment; filename*=UTF-8''%D0%94%D0%BE%D0%B3%D0%BE%D0%B2%D0%BE%D1%80%201.pdf"
        );
        assert!(content_disposition(FileDisposition::Inline, "a.pdf").starts_with("inline;"));
    }
}
