use chrono::{DateTime, Duration, TimeZone, Utc};
use contracts::domain::a001_contract::aggregate::Contract;
use contracts::domain::a002_contract_file::aggregate::{
    dedup_by_external_id, ContractFile, ContractFileEvent, DownloadStatus, FileDisposition,
    FileLink, FileSyncResult,
};
use contracts::system::auth::TokenClaims;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::repository;
use crate::domain::a001_contract;
use crate::shared::error::DomainError;
use crate::shared::esign::{self, ESignClient, RemoteFile};
use crate::shared::format::format_size;
use crate::shared::storage::{self, FileStorage};
use crate::shared::{events, logger};
use crate::system::auth::jwt;

/// Время жизни подписанной ссылки
pub const LINK_LIFETIME_SECONDS: i64 = 5 * 60;

/// Параметры подписанной ссылки на содержимое
#[derive(Debug, Clone, Deserialize)]
pub struct ContentQuery {
    pub disposition: FileDisposition,
    pub expires: i64,
    pub sig: String,
}

// ============================================================================
// Подпись ссылок
// ============================================================================

/// SHA-256 от секрета, id файла, способа выдачи и срока действия
pub fn sign(secret: &str, file_id: &str, disposition: FileDisposition, expires: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b"\n");
    hasher.update(file_id.as_bytes());
    hasher.update(b"\n");
    hasher.update(disposition.as_str().as_bytes());
    hasher.update(b"\n");
    hasher.update(expires.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn build_link(
    secret: &str,
    file_id: &str,
    disposition: FileDisposition,
    now: DateTime<Utc>,
) -> FileLink {
    let expires_at = now + Duration::seconds(LINK_LIFETIME_SECONDS);
    let expires = expires_at.timestamp();
    let sig = sign(secret, file_id, disposition, expires);
    FileLink {
        url: format!(
            "/api/contract_file/{}/content?disposition={}&expires={}&sig={}",
            urlencoding::encode(file_id),
            disposition.as_str(),
            expires,
            sig
        ),
        expires_at: Utc
            .timestamp_opt(expires, 0)
            .single()
            .unwrap_or(expires_at),
    }
}

pub fn verify_link(
    secret: &str,
    file_id: &str,
    query: &ContentQuery,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    if query.expires < now.timestamp() {
        return Err(DomainError::InvalidLink);
    }
    let expected = sign(secret, file_id, query.disposition, query.expires);
    if expected != query.sig {
        return Err(DomainError::InvalidLink);
    }
    Ok(())
}

// ============================================================================
// Доступ
// ============================================================================

async fn load_contract(contract_id: &str) -> anyhow::Result<Contract> {
    let id = Uuid::parse_str(contract_id)
        .map_err(|_| DomainError::Validation("Invalid contract ID".into()))?;
    let contract = a001_contract::repository::get_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("contract"))?;
    Ok(contract)
}

async fn load_file(file_id: &str) -> anyhow::Result<repository::Model> {
    let model = repository::get_model(file_id)
        .await?
        .ok_or(DomainError::NotFound("file"))?;
    Ok(model)
}

/// Файл с проверкой, что пользователь имеет доступ к его договору
async fn load_file_for(file_id: &str, claims: &TokenClaims) -> anyhow::Result<repository::Model> {
    let model = load_file(file_id).await?;
    let contract = load_contract(&model.contract_id).await?;
    a001_contract::service::ensure_access(&contract, claims)?;
    Ok(model)
}

// ============================================================================
// Операции
// ============================================================================

/// Файлы договора (не более одного на внешний id)
pub async fn list_files(contract_id: Uuid, claims: &TokenClaims) -> anyhow::Result<Vec<ContractFile>> {
    let contract = load_contract(&contract_id.to_string()).await?;
    a001_contract::service::ensure_access(&contract, claims)?;
    let files = repository::list_by_contract(&contract.to_string_id()).await?;
    Ok(dedup_by_external_id(files))
}

/// Новые записи для файлов, которых ещё нет у договора.
/// Дубли внутри ответа сервиса отбрасываются (побеждает первый).
pub fn plan_sync(
    contract_id: &str,
    remote: Vec<RemoteFile>,
    existing: &[ContractFile],
    now: DateTime<Utc>,
) -> (Vec<ContractFile>, usize) {
    let fetched = remote.len();
    let candidates: Vec<ContractFile> = remote
        .into_iter()
        .map(|r| ContractFile {
            id: Uuid::new_v4().to_string(),
            contract_id: contract_id.to_string(),
            external_file_id: r.external_file_id,
            name: r.name,
            kind: r.kind,
            download_status: DownloadStatus::Pending,
            size: 0,
            downloaded_at: None,
            created_at: now,
        })
        .collect();
    let unique = dedup_by_external_id(candidates);
    let duplicates = fetched - unique.len();
    let fresh = unique
        .into_iter()
        .filter(|f| {
            !existing
                .iter()
                .any(|e| e.external_file_id == f.external_file_id)
        })
        .collect();
    (fresh, duplicates)
}

/// Зеркалировать список файлов документа из сервиса подписи
pub async fn sync_from_provider(
    contract_id: Uuid,
    claims: &TokenClaims,
) -> anyhow::Result<FileSyncResult> {
    sync_with(esign::client().as_ref(), contract_id, claims).await
}

async fn sync_with(
    client: &dyn ESignClient,
    contract_id: Uuid,
    claims: &TokenClaims,
) -> anyhow::Result<FileSyncResult> {
    let contract = load_contract(&contract_id.to_string()).await?;
    a001_contract::service::ensure_access(&contract, claims)?;
    let document_id = contract
        .external_ref
        .clone()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| DomainError::Validation("У договора нет документа в сервисе подписи".into()))?;

    let remote = client.list_files(&document_id).await?;
    let fetched = remote.len();
    let existing = repository::list_by_contract(&contract.to_string_id()).await?;
    let (fresh, duplicates) = plan_sync(&contract.to_string_id(), remote, &existing, Utc::now());

    let mut inserted = 0;
    for file in fresh {
        if repository::insert_if_absent(&file).await? {
            inserted += 1;
            events::publish(ContractFileEvent::Added {
                file_id: file.id,
                contract_id: file.contract_id,
            });
        }
    }

    logger::log(
        "contract_file",
        &format!(
            "Синхронизация {}: получено {}, добавлено {}, дублей {}",
            contract.base.code, fetched, inserted, duplicates
        ),
    );
    Ok(FileSyncResult {
        fetched,
        inserted,
        duplicates,
    })
}

/// Выдать подписанную ссылку на содержимое файла
pub async fn create_link(
    file_id: &str,
    disposition: FileDisposition,
    claims: &TokenClaims,
) -> anyhow::Result<FileLink> {
    let model = load_file_for(file_id, claims).await?;
    let secret = jwt::get_jwt_secret().await?;
    Ok(build_link(&secret, &model.id, disposition, Utc::now()))
}

fn status_event(model: &repository::Model, status: DownloadStatus, downloaded_at: Option<DateTime<Utc>>, size: Option<i64>) -> ContractFileEvent {
    ContractFileEvent::StatusChanged {
        file_id: model.id.clone(),
        contract_id: model.contract_id.clone(),
        status,
        downloaded_at,
        size,
    }
}

async fn mark(
    model: &repository::Model,
    status: DownloadStatus,
    downloaded_at: Option<DateTime<Utc>>,
    size: Option<i64>,
) -> anyhow::Result<()> {
    repository::set_status(&model.id, status, downloaded_at).await?;
    events::publish(status_event(model, status, downloaded_at, size));
    Ok(())
}

/// Локальная копия файла
struct Mirrored {
    path: String,
    bytes: Vec<u8>,
    /// Файл только что загружен из сервиса подписи
    fetched: bool,
}

/// Гарантировать локальную копию файла.
///
/// При `track_status` (attachment) файл проходит через downloading, ошибка
/// сервиса подписи отмечает его failed. Без него статус в БД не трогается.
async fn ensure_mirrored(
    client: &dyn ESignClient,
    store: &FileStorage,
    model: &repository::Model,
    track_status: bool,
) -> anyhow::Result<Mirrored> {
    if let Some(path) = &model.local_path {
        if store.exists(path).await {
            return Ok(Mirrored {
                path: path.clone(),
                bytes: store.read(path).await?,
                fetched: false,
            });
        }
        tracing::warn!("Mirrored copy of {} is missing, fetching again", model.id);
    }

    if track_status {
        mark(model, DownloadStatus::Downloading, None, None).await?;
    }
    let bytes = match client.fetch_content(&model.external_file_id).await {
        Ok(bytes) => bytes,
        Err(e) => {
            logger::error(
                "contract_file",
                &format!("Не удалось загрузить файл {} ({}): {}", model.name, model.id, e),
            );
            if track_status {
                mark(model, DownloadStatus::Failed, None, None).await?;
            }
            return Err(e.into());
        }
    };

    let path = FileStorage::relative_path(&model.contract_id, &model.id);
    store.write(&path, &bytes).await?;
    let size = bytes.len() as i64;
    repository::set_mirrored(&model.id, &path, size).await?;
    logger::log(
        "contract_file",
        &format!("Файл {} зеркалирован ({})", model.name, format_size(size)),
    );
    Ok(Mirrored {
        path,
        bytes,
        fetched: true,
    })
}

/// Проверить подписанную ссылку и наличие файла (HEAD).
/// Статус загрузки не меняется, содержимое не запрашивается.
pub async fn check_content(file_id: &str, query: &ContentQuery) -> anyhow::Result<ContractFile> {
    let secret = jwt::get_jwt_secret().await?;
    check_with(&secret, file_id, query, Utc::now()).await
}

async fn check_with(
    secret: &str,
    file_id: &str,
    query: &ContentQuery,
    now: DateTime<Utc>,
) -> anyhow::Result<ContractFile> {
    verify_link(secret, file_id, query, now)?;
    Ok(load_file(file_id).await?.into())
}

/// Отдать содержимое по подписанной ссылке.
///
/// attachment отмечает файл загруженным; inline статус не меняет.
pub async fn serve_content(
    file_id: &str,
    query: &ContentQuery,
) -> anyhow::Result<(ContractFile, Vec<u8>)> {
    let secret = jwt::get_jwt_secret().await?;
    serve_with(
        esign::client().as_ref(),
        storage::storage()?,
        &secret,
        file_id,
        query,
        Utc::now(),
    )
    .await
}

async fn serve_with(
    client: &dyn ESignClient,
    store: &FileStorage,
    secret: &str,
    file_id: &str,
    query: &ContentQuery,
    now: DateTime<Utc>,
) -> anyhow::Result<(ContractFile, Vec<u8>)> {
    verify_link(secret, file_id, query, now)?;

    let mut model = load_file(file_id).await?;
    let attachment = query.disposition == FileDisposition::Attachment;
    let mirrored = ensure_mirrored(client, store, &model, attachment).await?;
    model.local_path = Some(mirrored.path);
    model.size = mirrored.bytes.len() as i64;

    if attachment {
        mark(&model, DownloadStatus::Completed, Some(now), Some(model.size)).await?;
        model.download_status = DownloadStatus::Completed.as_str().to_string();
        model.downloaded_at = Some(now);
    } else if mirrored.fetched {
        // Статус прежний, клиенту сообщается только размер
        if let Some(status) = DownloadStatus::from_str_opt(&model.download_status) {
            events::publish(status_event(&model, status, None, Some(model.size)));
        }
    }

    Ok((model.into(), mirrored.bytes))
}

/// Подтверждение загрузки клиентом (идемпотентно)
pub async fn confirm_download(file_id: &str, claims: &TokenClaims) -> anyhow::Result<ContractFile> {
    let mut model = load_file_for(file_id, claims).await?;
    if model.download_status != DownloadStatus::Completed.as_str() {
        let now = model.downloaded_at.unwrap_or_else(Utc::now);
        mark(&model, DownloadStatus::Completed, Some(now), Some(model.size)).await?;
        model.download_status = DownloadStatus::Completed.as_str().to_string();
        model.downloaded_at = Some(now);
    }
    Ok(model.into())
}

/// MIME-тип по расширению имени файла
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::init_test_database;
    use crate::shared::error::status_of;
    use crate::shared::esign::ESignError;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use contracts::domain::a001_contract::aggregate::{ContractDto, ContractKind};
    use contracts::domain::a002_contract_file::aggregate::ContractFileKind;
    use contracts::system::auth::UserRole;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::broadcast::{self, error::TryRecvError};

    const SECRET: &str = "test-secret";

    fn query_from(link: &FileLink) -> ContentQuery {
        let qs = link.url.split_once('?').unwrap().1;
        let mut disposition = None;
        let mut expires = 0;
        let mut sig = String::new();
        for pair in qs.split('&') {
            let (k, v) = pair.split_once('=').unwrap();
            match k {
                "disposition" => disposition = FileDisposition::from_str_opt(v),
                "expires" => expires = v.parse().unwrap(),
                "sig" => sig = v.to_string(),
                _ => {}
            }
        }
        ContentQuery {
            disposition: disposition.unwrap(),
            expires,
            sig,
        }
    }

    #[test]
    fn test_link_round_trip_and_expiry() {
        let now = Utc::now();
        let link = build_link(SECRET, "f-1", FileDisposition::Attachment, now);
        assert!(link.url.starts_with("/api/contract_file/f-1/content?disposition=attachment"));
        assert_eq!(link.expires_at.timestamp(), now.timestamp() + LINK_LIFETIME_SECONDS);

        let query = query_from(&link);
        assert!(verify_link(SECRET, "f-1", &query, now).is_ok());
        assert_eq!(
            verify_link(SECRET, "f-1", &query, now + Duration::seconds(LINK_LIFETIME_SECONDS + 1)),
            Err(DomainError::InvalidLink)
        );
    }

    #[test]
    fn test_link_is_bound_to_file_and_disposition() {
        let now = Utc::now();
        let mut query = query_from(&build_link(SECRET, "f-1", FileDisposition::Inline, now));
        assert!(verify_link(SECRET, "f-2", &query, now).is_err());
        assert!(verify_link("other-secret", "f-1", &query, now).is_err());
        query.disposition = FileDisposition::Attachment;
        assert!(verify_link(SECRET, "f-1", &query, now).is_err());
    }

    fn remote(id: &str, name: &str) -> RemoteFile {
        RemoteFile {
            external_file_id: id.into(),
            name: name.into(),
            kind: ContractFileKind::Pdf,
        }
    }

    #[test]
    fn test_plan_sync_drops_duplicates_and_known_files() {
        let now = Utc::now();
        let (existing, _) = plan_sync("c-1", vec![remote("x0", "old.pdf")], &[], now);
        let (fresh, duplicates) = plan_sync(
            "c-1",
            vec![
                remote("x1", "first.pdf"),
                remote("x0", "old.pdf"),
                remote("x1", "second.pdf"),
                remote("x2", "scan.pdf"),
            ],
            &existing,
            now,
        );
        let names: Vec<&str> = fresh.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["first.pdf", "scan.pdf"]);
        assert_eq!(duplicates, 1);
        assert!(fresh.iter().all(|f| f.download_status == DownloadStatus::Pending));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type_for("Contract.PDF"), "application/pdf");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    // ------------------------------------------------------------------
    // Сценарии с БД
    // ------------------------------------------------------------------

    struct FakeESign {
        files: Vec<RemoteFile>,
        content: Option<Vec<u8>>,
        fetches: AtomicUsize,
    }

    impl FakeESign {
        fn new(files: Vec<RemoteFile>, content: Option<&[u8]>) -> Self {
            Self {
                files,
                content: content.map(|c| c.to_vec()),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ESignClient for FakeESign {
        async fn list_files(&self, _document_id: &str) -> Result<Vec<RemoteFile>, ESignError> {
            Ok(self.files.clone())
        }

        async fn fetch_content(&self, _external_file_id: &str) -> Result<Vec<u8>, ESignError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.content.clone().ok_or(ESignError::Http(500))
        }
    }

    fn admin() -> TokenClaims {
        TokenClaims {
            sub: "u-admin".into(),
            username: "admin".into(),
            role: UserRole::Admin,
            technician_ref: None,
            customer_ref: None,
            exp: 0,
            iat: 0,
        }
    }

    async fn contract_with_document(document: &str) -> Contract {
        init_test_database().await.unwrap();
        let dto = ContractDto {
            id: None,
            code: None,
            description: "Договор на дезинсекцию".into(),
            comment: None,
            kind: ContractKind::Contract,
            total_value: 12000.0,
            customer_ref: Uuid::new_v4().to_string(),
            external_ref: Some(document.into()),
            valid_until: None,
        };
        let contract = Contract::new_for_insert(&dto, format!("C-{}", Uuid::new_v4()));
        a001_contract::repository::insert(&contract).await.unwrap();
        contract
    }

    async fn pending_file(contract: &Contract, external: &str) -> ContractFile {
        let (mut files, _) = plan_sync(
            &contract.to_string_id(),
            vec![remote(external, "contract.pdf")],
            &[],
            Utc::now(),
        );
        let file = files.remove(0);
        assert!(repository::insert_if_absent(&file).await.unwrap());
        file
    }

    async fn stored(file_id: &str) -> repository::Model {
        repository::get_model(file_id).await.unwrap().unwrap()
    }

    fn temp_storage() -> FileStorage {
        FileStorage::new(std::env::temp_dir().join(format!("pestdesk-files-{}", Uuid::new_v4())))
    }

    fn link_query(file_id: &str, disposition: FileDisposition) -> ContentQuery {
        query_from(&build_link(SECRET, file_id, disposition, Utc::now()))
    }

    /// События одного договора, накопленные в канале
    fn drain(rx: &mut broadcast::Receiver<ContractFileEvent>, contract_id: &str) -> Vec<ContractFileEvent> {
        let mut out = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) if event.contract_id() == contract_id => out.push(event),
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        out
    }

    #[tokio::test]
    async fn test_sync_inserts_only_unknown_files() {
        let contract = contract_with_document("doc-sync").await;
        let contract_id = contract.to_string_id();
        let mut rx = events::hub().subscribe();
        let client = FakeESign::new(
            vec![
                remote("x1", "first.pdf"),
                remote("x1", "again.pdf"),
                remote("x2", "scan.pdf"),
            ],
            None,
        );

        let result = sync_with(&client, contract.base.id.value(), &admin()).await.unwrap();
        assert_eq!((result.fetched, result.inserted, result.duplicates), (3, 2, 1));
        let again = sync_with(&client, contract.base.id.value(), &admin()).await.unwrap();
        assert_eq!(again.inserted, 0);

        let files = repository::list_by_contract(&contract_id).await.unwrap();
        let mut names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["first.pdf", "scan.pdf"]);

        let mut added: Vec<String> = drain(&mut rx, &contract_id)
            .into_iter()
            .filter_map(|e| match e {
                ContractFileEvent::Added { file_id, .. } => Some(file_id),
                _ => None,
            })
            .collect();
        let mut ids: Vec<String> = files.into_iter().map(|f| f.id).collect();
        added.sort();
        ids.sort();
        assert_eq!(added, ids);
    }

    #[tokio::test]
    async fn test_contract_and_external_id_are_unique() {
        let contract = contract_with_document("doc-unique").await;
        let first = pending_file(&contract, "x1").await;

        let mut twin = first.clone();
        twin.id = Uuid::new_v4().to_string();
        twin.name = "twin.pdf".into();
        assert!(!repository::insert_if_absent(&twin).await.unwrap());

        let other = contract_with_document("doc-other").await;
        twin.contract_id = other.to_string_id();
        assert!(repository::insert_if_absent(&twin).await.unwrap());

        let files = repository::list_by_contract(&contract.to_string_id()).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].id, first.id);
    }

    #[tokio::test]
    async fn test_attachment_mirrors_once_and_completes() {
        let contract = contract_with_document("doc-attach").await;
        let file = pending_file(&contract, "x1").await;
        let client = FakeESign::new(vec![], Some(b"%PDF-1.7"));
        let storage = temp_storage();
        let query = link_query(&file.id, FileDisposition::Attachment);

        let (served, bytes) = serve_with(&client, &storage, SECRET, &file.id, &query, Utc::now())
            .await
            .unwrap();
        assert_eq!(bytes, b"%PDF-1.7".to_vec());
        assert_eq!(served.download_status, DownloadStatus::Completed);
        assert!(served.downloaded_at.is_some());
        assert_eq!(served.size, 8);

        let model = stored(&file.id).await;
        assert_eq!(model.download_status, "completed");
        assert!(model.downloaded_at.is_some());
        assert!(model.local_path.is_some());

        // повторная выдача читает локальную копию
        serve_with(&client, &storage, SECRET, &file.id, &query, Utc::now())
            .await
            .unwrap();
        assert_eq!(client.fetches.load(Ordering::SeqCst), 1);
        let _ = std::fs::remove_dir_all(storage.root());
    }

    #[tokio::test]
    async fn test_inline_keeps_previous_status() {
        let contract = contract_with_document("doc-inline").await;
        let file = pending_file(&contract, "x1").await;
        repository::set_status(&file.id, DownloadStatus::Failed, None)
            .await
            .unwrap();
        let client = FakeESign::new(vec![], Some(b"scan"));
        let storage = temp_storage();
        let query = link_query(&file.id, FileDisposition::Inline);

        let (served, _) = serve_with(&client, &storage, SECRET, &file.id, &query, Utc::now())
            .await
            .unwrap();
        assert_eq!(served.download_status, DownloadStatus::Failed);

        let model = stored(&file.id).await;
        assert_eq!(model.download_status, "failed");
        assert!(model.downloaded_at.is_none());
        assert!(model.local_path.is_some());
        let _ = std::fs::remove_dir_all(storage.root());
    }

    #[tokio::test]
    async fn test_provider_failure_on_inline_keeps_status() {
        let contract = contract_with_document("doc-inline-fail").await;
        let file = pending_file(&contract, "x1").await;
        let client = FakeESign::new(vec![], None);
        let query = link_query(&file.id, FileDisposition::Inline);

        let err = serve_with(&client, &temp_storage(), SECRET, &file.id, &query, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(status_of(&err), StatusCode::BAD_GATEWAY);
        assert_eq!(stored(&file.id).await.download_status, "pending");
    }

    #[tokio::test]
    async fn test_provider_failure_on_attachment_marks_failed() {
        let contract = contract_with_document("doc-attach-fail").await;
        let file = pending_file(&contract, "x1").await;
        let client = FakeESign::new(vec![], None);
        let query = link_query(&file.id, FileDisposition::Attachment);

        let err = serve_with(&client, &temp_storage(), SECRET, &file.id, &query, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(status_of(&err), StatusCode::BAD_GATEWAY);
        assert_eq!(stored(&file.id).await.download_status, "failed");
    }

    #[tokio::test]
    async fn test_link_check_does_not_touch_status() {
        let contract = contract_with_document("doc-head").await;
        let file = pending_file(&contract, "x1").await;
        let mut query = link_query(&file.id, FileDisposition::Attachment);

        let checked = check_with(SECRET, &file.id, &query, Utc::now()).await.unwrap();
        assert_eq!(checked.download_status, DownloadStatus::Pending);
        assert_eq!(stored(&file.id).await.download_status, "pending");

        query.sig = "0".repeat(64);
        let err = check_with(SECRET, &file.id, &query, Utc::now()).await.unwrap_err();
        assert_eq!(status_of(&err), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_confirm_download_is_idempotent() {
        let contract = contract_with_document("doc-confirm").await;
        let contract_id = contract.to_string_id();
        let file = pending_file(&contract, "x1").await;
        let mut rx = events::hub().subscribe();

        let first = confirm_download(&file.id, &admin()).await.unwrap();
        assert_eq!(first.download_status, DownloadStatus::Completed);
        let second = confirm_download(&file.id, &admin()).await.unwrap();
        assert_eq!(second.download_status, DownloadStatus::Completed);
        assert_eq!(
            first.downloaded_at.map(|d| d.timestamp_millis()),
            second.downloaded_at.map(|d| d.timestamp_millis())
        );

        let changes = drain(&mut rx, &contract_id)
            .into_iter()
            .filter(|e| matches!(e, ContractFileEvent::StatusChanged { .. }))
            .count();
        assert_eq!(changes, 1);
    }
}
