//! Сервис электронной подписи: источник файлов договоров

pub mod client;

use async_trait::async_trait;
use contracts::domain::a002_contract_file::aggregate::ContractFileKind;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

pub use client::HttpESignClient;

#[derive(Debug, Clone, Error)]
pub enum ESignError {
    #[error("e-signature service is not configured")]
    NotConfigured,
    #[error("e-signature service returned http {0}")]
    Http(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Файл документа в сервисе подписи
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteFile {
    #[serde(rename = "id")]
    pub external_file_id: String,
    pub name: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: ContractFileKind,
}

fn default_kind() -> ContractFileKind {
    ContractFileKind::Attachment
}

#[async_trait]
pub trait ESignClient: Send + Sync {
    /// Файлы документа (в порядке, который отдаёт сервис; возможны дубли)
    async fn list_files(&self, document_id: &str) -> Result<Vec<RemoteFile>, ESignError>;

    /// Содержимое файла
    async fn fetch_content(&self, external_file_id: &str) -> Result<Vec<u8>, ESignError>;
}

/// Заглушка на случай, когда в config.toml нет секции [esign]
pub struct UnconfiguredClient;

#[async_trait]
impl ESignClient for UnconfiguredClient {
    async fn list_files(&self, _document_id: &str) -> Result<Vec<RemoteFile>, ESignError> {
        Err(ESignError::NotConfigured)
    }

    async fn fetch_content(&self, _external_file_id: &str) -> Result<Vec<u8>, ESignError> {
        Err(ESignError::NotConfigured)
    }
}

static CLIENT: OnceCell<Arc<dyn ESignClient>> = OnceCell::new();

/// Инициализация клиента из конфигурации
pub fn initialize(config: &crate::shared::config::ESignConfig) -> anyhow::Result<()> {
    let client: Arc<dyn ESignClient> = match (&config.base_url, &config.api_key) {
        (Some(base_url), Some(api_key)) if !base_url.trim().is_empty() => {
            tracing::info!("E-signature service: {}", base_url);
            Arc::new(HttpESignClient::new(base_url, api_key)?)
        }
        _ => {
            tracing::warn!("E-signature service is not configured, file sync is disabled");
            Arc::new(UnconfiguredClient)
        }
    };
    CLIENT
        .set(client)
        .map_err(|_| anyhow::anyhow!("E-signature client already initialized"))
}

pub fn client() -> Arc<dyn ESignClient> {
    CLIENT
        .get()
        .cloned()
        .unwrap_or_else(|| Arc::new(UnconfiguredClient))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_file_wire_format() {
        let files: Vec<RemoteFile> = serde_json::from_str(
            r#"[{"id":"x1","name":"contract.pdf","type":"pdf"},{"id":"x2","name":"scan.png"}]"#,
        )
        .unwrap();
        assert_eq!(files[0].kind, ContractFileKind::Pdf);
        assert_eq!(files[1].kind, ContractFileKind::Attachment);
        assert_eq!(files[1].external_file_id, "x2");
    }

    #[tokio::test]
    async fn test_unconfigured_client() {
        let err = UnconfiguredClient.list_files("doc").await.unwrap_err();
        assert!(matches!(err, ESignError::NotConfigured));
    }
}
