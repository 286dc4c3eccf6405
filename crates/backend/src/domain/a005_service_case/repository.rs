use chrono::{NaiveDate, Utc};
use contracts::domain::a005_service_case::aggregate::{
    CaseFilter, CaseStatus, InvoiceStatus, ServiceCase, ServiceCaseId,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a005_service_case")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    /// "YYYY-MM-DD"
    pub case_date: String,
    pub technician_ref: String,
    pub technician_name: String,
    pub customer_ref: String,
    pub customer_name: String,
    pub contract_ref: Option<String>,
    pub pest_type: String,
    pub status: String,
    pub price: f64,
    pub material_cost: f64,
    pub invoice_status: String,
    pub invoiced_at: Option<chrono::DateTime<chrono::Utc>>,
    pub paid_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ServiceCase {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        ServiceCase {
            base: BaseAggregate::with_metadata(
                ServiceCaseId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            case_date: NaiveDate::parse_from_str(&m.case_date, "%Y-%m-%d").unwrap_or_default(),
            technician_ref: m.technician_ref,
            technician_name: m.technician_name,
            customer_ref: m.customer_ref,
            customer_name: m.customer_name,
            contract_ref: m.contract_ref,
            pest_type: m.pest_type,
            status: CaseStatus::from_str_opt(&m.status).unwrap_or(CaseStatus::Scheduled),
            price: m.price,
            material_cost: m.material_cost,
            invoice_status: InvoiceStatus::from_str_opt(&m.invoice_status)
                .unwrap_or(InvoiceStatus::Unbilled),
            invoiced_at: m.invoiced_at,
            paid_at: m.paid_at,
        }
    }
}

fn to_active(aggregate: &ServiceCase) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        code: Set(aggregate.base.code.clone()),
        description: Set(aggregate.base.description.clone()),
        comment: Set(aggregate.base.comment.clone()),
        case_date: Set(aggregate.case_date.format("%Y-%m-%d").to_string()),
        technician_ref: Set(aggregate.technician_ref.clone()),
        technician_name: Set(aggregate.technician_name.clone()),
        customer_ref: Set(aggregate.customer_ref.clone()),
        customer_name: Set(aggregate.customer_name.clone()),
        contract_ref: Set(aggregate.contract_ref.clone()),
        pest_type: Set(aggregate.pest_type.clone()),
        status: Set(aggregate.status.as_str().to_string()),
        price: Set(aggregate.price),
        material_cost: Set(aggregate.material_cost),
        invoice_status: Set(aggregate.invoice_status.as_str().to_string()),
        invoiced_at: Set(aggregate.invoiced_at),
        paid_at: Set(aggregate.paid_at),
        is_deleted: Set(aggregate.base.metadata.is_deleted),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Выезды по фильтру, новые сверху. Даты сравниваются как строки "YYYY-MM-DD".
pub async fn list(filter: &CaseFilter) -> anyhow::Result<Vec<ServiceCase>> {
    let mut cond = Condition::all().add(Column::IsDeleted.eq(false));
    if let Some(from) = &filter.date_from {
        cond = cond.add(Column::CaseDate.gte(from.as_str()));
    }
    if let Some(to) = &filter.date_to {
        cond = cond.add(Column::CaseDate.lte(to.as_str()));
    }
    if let Some(technician_ref) = &filter.technician_ref {
        cond = cond.add(Column::TechnicianRef.eq(technician_ref.as_str()));
    }
    if let Some(customer_ref) = &filter.customer_ref {
        cond = cond.add(Column::CustomerRef.eq(customer_ref.as_str()));
    }
    if let Some(status) = filter.status {
        cond = cond.add(Column::Status.eq(status.as_str()));
    }

    let items = Entity::find()
        .filter(cond)
        .order_by_desc(Column::CaseDate)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Выезды в диапазоне дат (для дашбордов)
pub async fn list_in_range(from: NaiveDate, to: NaiveDate) -> anyhow::Result<Vec<ServiceCase>> {
    list(&CaseFilter {
        date_from: Some(from.format("%Y-%m-%d").to_string()),
        date_to: Some(to.format("%Y-%m-%d").to_string()),
        ..Default::default()
    })
    .await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<ServiceCase>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()).await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &ServiceCase) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active(aggregate).insert(conn()).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &ServiceCase) -> anyhow::Result<()> {
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
        .exec(conn())
        .await?;
    Ok(result.rows_affected > 0)
}
