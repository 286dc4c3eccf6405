use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Тип файла договора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractFileKind {
    /// Подписанный PDF договора
    Pdf,
    /// Приложение
    Attachment,
    /// Лист проверки подписи
    Verification,
}

impl ContractFileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractFileKind::Pdf => "pdf",
            ContractFileKind::Attachment => "attachment",
            ContractFileKind::Verification => "verification",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "pdf" => Some(ContractFileKind::Pdf),
            "attachment" => Some(ContractFileKind::Attachment),
            "verification" => Some(ContractFileKind::Verification),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContractFileKind::Pdf => "PDF",
            ContractFileKind::Attachment => "Приложение",
            ContractFileKind::Verification => "Проверка подписи",
        }
    }
}

/// Статус загрузки файла в локальное хранилище
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Pending,
    Downloading,
    Completed,
    Failed,
}

impl DownloadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadStatus::Pending => "pending",
            DownloadStatus::Downloading => "downloading",
            DownloadStatus::Completed => "completed",
            DownloadStatus::Failed => "failed",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(DownloadStatus::Pending),
            "downloading" => Some(DownloadStatus::Downloading),
            "completed" => Some(DownloadStatus::Completed),
            "failed" => Some(DownloadStatus::Failed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DownloadStatus::Pending => "Не загружен",
            DownloadStatus::Downloading => "Загружается",
            DownloadStatus::Completed => "Загружен",
            DownloadStatus::Failed => "Ошибка",
        }
    }
}

/// Файл, связанный с договором (зеркало документа из сервиса электронной подписи)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractFile {
    pub id: String,

    #[serde(rename = "contractId")]
    pub contract_id: String,

    /// Идентификатор файла во внешнем сервисе
    #[serde(rename = "externalFileId")]
    pub external_file_id: String,

    pub name: String,
    pub kind: ContractFileKind,

    #[serde(rename = "downloadStatus")]
    pub download_status: DownloadStatus,

    /// Размер в байтах (0, пока файл не зеркалирован)
    pub size: i64,

    #[serde(rename = "downloadedAt", default)]
    pub downloaded_at: Option<DateTime<Utc>>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl ContractFile {
    /// Ключ уникальности: (договор, внешний id файла)
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.contract_id, &self.external_file_id)
    }
}

/// Оставляет не более одного файла на пару (договор, внешний id файла).
/// Побеждает первое вхождение, порядок сохраняется.
pub fn dedup_by_external_id(files: Vec<ContractFile>) -> Vec<ContractFile> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    files
        .into_iter()
        .filter(|f| {
            let (contract_id, external_id) = f.dedup_key();
            seen.insert((contract_id.to_string(), external_id.to_string()))
        })
        .collect()
}

/// Способ выдачи содержимого файла
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileDisposition {
    /// Скачивание (подтверждает загрузку)
    Attachment,
    /// Просмотр в браузере (статус не меняется)
    Inline,
}

impl FileDisposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileDisposition::Attachment => "attachment",
            FileDisposition::Inline => "inline",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "attachment" => Some(FileDisposition::Attachment),
            "inline" => Some(FileDisposition::Inline),
            _ => None,
        }
    }
}

/// Запрос временной ссылки на файл
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FileLinkRequest {
    pub disposition: FileDisposition,
}

/// Временная подписанная ссылка на содержимое файла
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileLink {
    /// Путь относительно API (например, "/api/contract_file/{id}/content?...")
    pub url: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

/// Событие канала подписки на изменения файлов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContractFileEvent {
    /// Новый файл договора. Только идентификаторы: канал публичный,
    /// клиент перечитывает список файлов сам.
    Added { file_id: String, contract_id: String },
    /// Сервер подтвердил смену статуса загрузки
    StatusChanged {
        file_id: String,
        contract_id: String,
        status: DownloadStatus,
        #[serde(default)]
        downloaded_at: Option<DateTime<Utc>>,
        #[serde(default)]
        size: Option<i64>,
    },
    /// Файл удалён
    Removed { file_id: String, contract_id: String },
}

impl ContractFileEvent {
    pub fn contract_id(&self) -> &str {
        match self {
            ContractFileEvent::Added { contract_id, .. } => contract_id,
            ContractFileEvent::StatusChanged { contract_id, .. } => contract_id,
            ContractFileEvent::Removed { contract_id, .. } => contract_id,
        }
    }
}

/// Результат синхронизации файлов с сервисом подписи
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSyncResult {
    pub fetched: usize,
    pub inserted: usize,
    pub duplicates: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, contract: &str, ext: &str) -> ContractFile {
        ContractFile {
            id: id.into(),
            contract_id: contract.into(),
            external_file_id: ext.into(),
            name: format!("{}.pdf", id),
            kind: ContractFileKind::Pdf,
            download_status: DownloadStatus::Pending,
            size: 0,
            downloaded_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let files = vec![
            file("a", "c1", "x"),
            file("b", "c1", "y"),
            file("c", "c1", "x"),
        ];
        let result = dedup_by_external_id(files);
        let ids: Vec<&str> = result.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_dedup_is_scoped_by_contract() {
        let files = vec![file("a", "c1", "x"), file("b", "c2", "x")];
        assert_eq!(dedup_by_external_id(files).len(), 2);
    }

    #[test]
    fn test_event_wire_format() {
        let event = ContractFileEvent::Removed {
            file_id: "f".into(),
            contract_id: "c".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "removed");
        assert_eq!(event.contract_id(), "c");

        let parsed: ContractFileEvent = serde_json::from_str(
            r#"{"type":"status_changed","file_id":"f","contract_id":"c","status":"completed"}"#,
        )
        .unwrap();
        match parsed {
            ContractFileEvent::StatusChanged { status, downloaded_at, .. } => {
                assert_eq!(status, DownloadStatus::Completed);
                assert!(downloaded_at.is_none());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_added_event_carries_ids_only() {
        let event = ContractFileEvent::Added {
            file_id: "f".into(),
            contract_id: "c".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "added", "file_id": "f", "contract_id": "c"})
        );
        assert_eq!(event.contract_id(), "c");
    }
}
