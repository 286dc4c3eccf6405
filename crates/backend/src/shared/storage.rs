//! Локальное хранилище зеркалированных файлов договоров

use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

static STORAGE: OnceCell<FileStorage> = OnceCell::new();

#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Относительный путь файла: "<contract_id>/<file_id>"
    pub fn relative_path(contract_id: &str, file_id: &str) -> String {
        format!("{}/{}", sanitize(contract_id), sanitize(file_id))
    }

    pub fn absolute(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub async fn write(&self, relative: &str, bytes: &[u8]) -> anyhow::Result<()> {
        let path = self.absolute(relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    pub async fn read(&self, relative: &str) -> anyhow::Result<Vec<u8>> {
        Ok(tokio::fs::read(self.absolute(relative)).await?)
    }

    pub async fn exists(&self, relative: &str) -> bool {
        tokio::fs::metadata(self.absolute(relative)).await.is_ok()
    }
}

/// Оставляет только безопасные символы (без разделителей пути)
fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn initialize(root: PathBuf) -> anyhow::Result<()> {
    std::fs::create_dir_all(&root)?;
    tracing::info!("File storage: {}", root.display());
    STORAGE
        .set(FileStorage::new(root))
        .map_err(|_| anyhow::anyhow!("File storage already initialized"))
}

pub fn storage() -> anyhow::Result<&'static FileStorage> {
    STORAGE
        .get()
        .ok_or_else(|| anyhow::anyhow!("File storage has not been initialized"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_has_no_traversal() {
        assert_eq!(FileStorage::relative_path("c-1", "f-1"), "c-1/f-1");
        assert_eq!(FileStorage::relative_path("../etc", "passwd"), "___etc/passwd");
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let root = std::env::temp_dir().join(format!("pestdesk-storage-{}", uuid::Uuid::new_v4()));
        let storage = FileStorage::new(&root);
        let rel = FileStorage::relative_path("c-1", "f-1");

        assert!(!storage.exists(&rel).await);
        storage.write(&rel, b"%PDF-1.7").await.unwrap();
        assert!(storage.exists(&rel).await);
        assert_eq!(storage.read(&rel).await.unwrap(), b"%PDF-1.7".to_vec());

        let _ = std::fs::remove_dir_all(root);
    }
}
