use super::repository;
use contracts::domain::a004_technician::aggregate::{Technician, TechnicianDto};
use std::collections::HashMap;
use uuid::Uuid;

use crate::shared::error::DomainError;

pub async fn create(dto: TechnicianDto) -> anyhow::Result<Uuid> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("TEC-{}", &Uuid::new_v4().simple().to_string()[..8]));
    let mut aggregate = Technician::new_for_insert(&dto, code);

    aggregate.validate().map_err(DomainError::Validation)?;
    aggregate.before_write();

    repository::insert(&aggregate).await
}

pub async fn update(dto: TechnicianDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| DomainError::Validation("Invalid ID".into()))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("technician"))?;

    aggregate.update(&dto);
    aggregate.validate().map_err(DomainError::Validation)?;
    aggregate.before_write();

    repository::update(&aggregate).await
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Technician>> {
    repository::get_by_id(id).await
}

pub async fn list_all() -> anyhow::Result<Vec<Technician>> {
    repository::list_all().await
}

/// Техники по строковому id (для расчёта комиссий в дашбордах)
pub async fn map_by_id() -> anyhow::Result<HashMap<String, Technician>> {
    Ok(repository::list_all()
        .await?
        .into_iter()
        .map(|t| (t.to_string_id(), t))
        .collect())
}
