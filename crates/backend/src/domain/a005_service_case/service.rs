use super::repository;
use contracts::domain::a005_service_case::aggregate::{CaseFilter, ServiceCase, ServiceCaseDto};
use uuid::Uuid;

use crate::domain::{a003_customer, a004_technician};
use crate::shared::error::DomainError;

fn parse_ref(value: &str, what: &'static str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| DomainError::Validation(format!("Некорректная ссылка: {}", what)).into())
}

/// Подставить имена техника и клиента из справочников
async fn fill_names(aggregate: &mut ServiceCase) -> anyhow::Result<()> {
    let technician = a004_technician::repository::get_by_id(parse_ref(
        &aggregate.technician_ref,
        "technician",
    )?)
    .await?
    .ok_or(DomainError::NotFound("technician"))?;
    let customer =
        a003_customer::repository::get_by_id(parse_ref(&aggregate.customer_ref, "customer")?)
            .await?
            .ok_or(DomainError::NotFound("customer"))?;

    aggregate.technician_name = technician.base.description;
    aggregate.customer_name = customer.base.description;
    Ok(())
}

pub async fn create(dto: ServiceCaseDto) -> anyhow::Result<Uuid> {
    let code = dto.code.clone().unwrap_or_else(|| {
        format!(
            "SC-{}-{}",
            dto.case_date.format("%Y%m%d"),
            &Uuid::new_v4().simple().to_string()[..4]
        )
    });
    let mut aggregate = ServiceCase::new_for_insert(&dto, code);

    aggregate.validate().map_err(DomainError::Validation)?;
    fill_names(&mut aggregate).await?;
    aggregate.before_write();

    repository::insert(&aggregate).await
}

pub async fn update(dto: ServiceCaseDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| DomainError::Validation("Invalid ID".into()))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("service case"))?;

    aggregate.update(&dto);
    aggregate.validate().map_err(DomainError::Validation)?;
    fill_names(&mut aggregate).await?;
    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<ServiceCase>> {
    repository::get_by_id(id).await
}

pub async fn list(filter: &CaseFilter) -> anyhow::Result<Vec<ServiceCase>> {
    repository::list(filter).await
}
