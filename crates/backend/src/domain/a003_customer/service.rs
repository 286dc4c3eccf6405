use super::repository;
use contracts::domain::a003_customer::aggregate::{Customer, CustomerDto};
use uuid::Uuid;

use crate::domain::a001_contract;
use crate::shared::error::DomainError;

/// Создание нового клиента
pub async fn create(dto: CustomerDto) -> anyhow::Result<Uuid> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("CUS-{}", &Uuid::new_v4().simple().to_string()[..8]));
    let mut aggregate = Customer::new_for_insert(&dto, code);

    aggregate.validate().map_err(DomainError::Validation)?;
    aggregate.before_write();

    repository::insert(&aggregate).await
}

/// Обновление клиента; имя в договорах обновляется вслед за справочником
pub async fn update(dto: CustomerDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| DomainError::Validation("Invalid ID".into()))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("customer"))?;

    let renamed = aggregate.base.description != dto.description;
    aggregate.update(&dto);
    aggregate.validate().map_err(DomainError::Validation)?;
    aggregate.before_write();

    repository::update(&aggregate).await?;
    if renamed {
        a001_contract::repository::refresh_customer_name(
            &aggregate.to_string_id(),
            &aggregate.base.description,
        )
        .await?;
    }
    Ok(())
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Customer>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Customer>> {
    repository::list_all().await
}
