use async_trait::async_trait;
use contracts::domain::a001_contract::aggregate::{
    Contract, ContractFilter, ContractStatus, ContractStatusUpdate,
};
use contracts::domain::a002_contract_file::aggregate::{
    ContractFile, FileDisposition, FileLink, FileLinkRequest, FileSyncResult,
};

use crate::shared::api_utils::{get_json, post_empty, post_json, with_query};

/// Источник данных о договорах и файлах
#[async_trait(?Send)]
pub trait ContractSource {
    async fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>, String>;
    async fn list_files(&self, contract_id: &str) -> Result<Vec<ContractFile>, String>;
    async fn file_link(
        &self,
        file_id: &str,
        disposition: FileDisposition,
    ) -> Result<FileLink, String>;
    async fn confirm_download(&self, file_id: &str) -> Result<ContractFile, String>;
    async fn update_status(
        &self,
        contract_id: &str,
        status: ContractStatus,
    ) -> Result<Contract, String>;
    async fn sync_files(&self, contract_id: &str) -> Result<FileSyncResult, String>;
}

/// Backend по HTTP
pub struct HttpContractSource;

fn enc(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[async_trait(?Send)]
impl ContractSource for HttpContractSource {
    async fn list_contracts(&self, filter: &ContractFilter) -> Result<Vec<Contract>, String> {
        get_json(&with_query("/api/contract", filter)).await
    }

    async fn list_files(&self, contract_id: &str) -> Result<Vec<ContractFile>, String> {
        get_json(&format!("/api/contract/{}/files", enc(contract_id))).await
    }

    async fn file_link(
        &self,
        file_id: &str,
        disposition: FileDisposition,
    ) -> Result<FileLink, String> {
        post_json(
            &format!("/api/contract_file/{}/link", enc(file_id)),
            &FileLinkRequest { disposition },
        )
        .await
    }

    async fn confirm_download(&self, file_id: &str) -> Result<ContractFile, String> {
        post_empty(&format!("/api/contract_file/{}/confirm", enc(file_id))).await
    }

    async fn update_status(
        &self,
        contract_id: &str,
        status: ContractStatus,
    ) -> Result<Contract, String> {
        post_json(
            &format!("/api/contract/{}/status", enc(contract_id)),
            &ContractStatusUpdate { status },
        )
        .await
    }

    async fn sync_files(&self, contract_id: &str) -> Result<FileSyncResult, String> {
        post_empty(&format!("/api/contract/{}/files/sync", enc(contract_id))).await
    }
}
