use chrono::{NaiveDate, Utc};
use contracts::domain::a001_contract::aggregate::{
    Contract, ContractFilter, ContractId, ContractKind, ContractStatus,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_contract")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub status: String,
    pub kind: String,
    pub total_value: f64,
    pub customer_ref: String,
    pub customer_name: String,
    pub external_ref: Option<String>,
    pub signed_at: Option<chrono::DateTime<chrono::Utc>>,
    /// "YYYY-MM-DD"
    pub valid_until: Option<String>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Contract {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Contract {
            base: BaseAggregate::with_metadata(
                ContractId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            status: ContractStatus::from_str_opt(&m.status).unwrap_or(ContractStatus::Draft),
            kind: ContractKind::from_str_opt(&m.kind).unwrap_or(ContractKind::Contract),
            total_value: m.total_value,
            customer_ref: m.customer_ref,
            customer_name: m.customer_name,
            external_ref: m.external_ref,
            signed_at: m.signed_at,
            valid_until: m
                .valid_until
                .as_deref()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
        }
    }
}

fn to_active(aggregate: &Contract) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        status: Set(aggregate.status.as_str().to_string()),
        kind: Set(aggregate.kind.as_str().to_string()),
        total_value: Set(aggregate.total_value),
        customer_ref: Set(aggregate.customer_ref.clone()),
        customer_name: Set(aggregate.customer_name.clone()),
        external_ref: Set(aggregate.external_ref.clone()),
        signed_at: Set(aggregate.signed_at),
        valid_until: Set(aggregate.valid_until.map(|d| d.format("%Y-%m-%d").to_string())),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Список договоров по фильтру (новые сверху)
pub async fn list(filter: &ContractFilter) -> anyhow::Result<Vec<Contract>> {
    let filter = filter.normalized();
    let mut cond = Condition::all().add(Column::IsDeleted.eq(false));
    if let Some(status) = filter.status {
        cond = cond.add(Column::Status.eq(status.as_str()));
    }
    if let Some(kind) = filter.kind {
        cond = cond.add(Column::Kind.eq(kind.as_str()));
    }
    if let Some(customer_ref) = &filter.customer_ref {
        cond = cond.add(Column::CustomerRef.eq(customer_ref.as_str()));
    }

    let items: Vec<Contract> = Entity::find()
        .filter(cond)
        .order_by_desc(Column::CreatedAt)
        .all(conn())
        .await?
        .into_iter()
        .map(Contract::from)
        // Поиск по тексту и датам создания проверяется на агрегате
        .filter(|c| filter.matches(c))
        .collect();
    Ok(items)
}

pub async fn list_all() -> anyhow::Result<Vec<Contract>> {
    list(&ContractFilter::default()).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Contract>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn())
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &Contract) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active(aggregate).insert(conn()).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &Contract) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn()).await?;
    Ok(())
}

pub async fn soft_delete(id: Uuid) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}

/// Обновить денормализованное имя клиента во всех его договорах
pub async fn refresh_customer_name(customer_ref: &str, name: &str) -> anyhow::Result<u64> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::CustomerName, Expr::value(name.to_string()))
        .filter(Column::CustomerRef.eq(customer_ref))
        .exec(conn())
        .await?;
    Ok(result.rows_affected)
}
