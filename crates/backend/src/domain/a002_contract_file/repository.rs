use chrono::{DateTime, Utc};
use contracts::domain::a002_contract_file::aggregate::{
    ContractFile, ContractFileKind, DownloadStatus,
};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, QueryFilter, QueryOrder, Set, Statement};
use serde::{Deserialize, Serialize};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_contract_file")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub contract_id: String,
    pub external_file_id: String,
    pub name: String,
    pub kind: String,
    pub download_status: String,
    pub size: i64,
    /// Путь относительно каталога хранилища (None, пока файл не зеркалирован)
    pub local_path: Option<String>,
    pub downloaded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ContractFile {
    fn from(m: Model) -> Self {
        ContractFile {
            id: m.id,
            contract_id: m.contract_id,
            external_file_id: m.external_file_id,
            name: m.name,
            kind: ContractFileKind::from_str_opt(&m.kind).unwrap_or(ContractFileKind::Attachment),
            download_status: DownloadStatus::from_str_opt(&m.download_status)
                .unwrap_or(DownloadStatus::Pending),
            size: m.size,
            downloaded_at: m.downloaded_at,
            created_at: m.created_at,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Файлы договора в порядке добавления
pub async fn list_by_contract(contract_id: &str) -> anyhow::Result<Vec<ContractFile>> {
    let items = Entity::find()
        .filter(Column::ContractId.eq(contract_id))
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_model(id: &str) -> anyhow::Result<Option<Model>> {
    Ok(Entity::find_by_id(id.to_string()).one(conn()).await?)
}

/// Вставить файл, если пары (договор, внешний id) ещё нет.
/// Возвращает true, если строка добавлена.
pub async fn insert_if_absent(file: &ContractFile) -> anyhow::Result<bool> {
    let result = conn()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            r#"INSERT OR IGNORE INTO a002_contract_file
                (id, contract_id, external_file_id, name, kind, download_status, size, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            [
                file.id.clone().into(),
                file.contract_id.clone().into(),
                file.external_file_id.clone().into(),
                file.name.clone().into(),
                file.kind.as_str().into(),
                file.download_status.as_str().into(),
                file.size.into(),
                file.created_at.into(),
            ],
        ))
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Сменить статус загрузки
pub async fn set_status(
    id: &str,
    status: DownloadStatus,
    downloaded_at: Option<DateTime<Utc>>,
) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(id.to_string()),
        download_status: Set(status.as_str().to_string()),
        downloaded_at: Set(downloaded_at),
        ..Default::default()
    };
    active.update(conn()).await?;
    Ok(())
}

/// Зафиксировать зеркалированную копию файла
pub async fn set_mirrored(id: &str, local_path: &str, size: i64) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(id.to_string()),
        local_path: Set(Some(local_path.to_string())),
        size: Set(size),
        ..Default::default()
    };
    active.update(conn()).await?;
    Ok(())
}
