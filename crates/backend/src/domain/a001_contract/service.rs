use super::repository;
use contracts::domain::a001_contract::aggregate::{
    Contract, ContractDto, ContractFilter, ContractStatus,
};
use contracts::system::auth::{TokenClaims, UserRole};
use uuid::Uuid;

use crate::domain::a003_customer;
use crate::shared::error::DomainError;
use crate::shared::logger;

/// Ограничить фильтр правами пользователя: клиент видит только свои договоры
pub fn scope_filter(filter: ContractFilter, claims: &TokenClaims) -> Result<ContractFilter, DomainError> {
    let mut filter = filter.normalized();
    match claims.role {
        UserRole::Admin => Ok(filter),
        UserRole::Customer => {
            let own = claims.customer_ref.clone().ok_or(DomainError::Forbidden)?;
            filter.customer_ref = Some(own);
            Ok(filter)
        }
        UserRole::Technician => Err(DomainError::Forbidden),
    }
}

/// Проверка доступа к конкретному договору
pub fn ensure_access(contract: &Contract, claims: &TokenClaims) -> Result<(), DomainError> {
    if claims.can_access_customer(&contract.customer_ref) {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

async fn customer_name(customer_ref: &str) -> anyhow::Result<String> {
    let id = Uuid::parse_str(customer_ref)
        .map_err(|_| DomainError::Validation("Некорректная ссылка на клиента".into()))?;
    let customer = a003_customer::repository::get_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("customer"))?;
    Ok(customer.base.description)
}

/// Создание нового договора (всегда в статусе "черновик")
pub async fn create(dto: ContractDto) -> anyhow::Result<Uuid> {
    let code = dto
        .code
        .clone()
        .unwrap_or_else(|| format!("CTR-{}", &Uuid::new_v4().simple().to_string()[..8]));
    let mut aggregate = Contract::new_for_insert(&dto, code);

    aggregate.validate().map_err(DomainError::Validation)?;
    aggregate.customer_name = customer_name(&aggregate.customer_ref).await?;

    aggregate.before_write();
    repository::insert(&aggregate).await
}

/// Обновление реквизитов договора (статус не меняется)
pub async fn update(dto: ContractDto) -> anyhow::Result<()> {
    let id = dto
        .id
        .as_ref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| DomainError::Validation("Invalid ID".into()))?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("contract"))?;

    aggregate.update(&dto);
    aggregate.validate().map_err(DomainError::Validation)?;
    aggregate.customer_name = customer_name(&aggregate.customer_ref).await?;

    aggregate.before_write();
    repository::update(&aggregate).await
}

/// Смена статуса договора по правилам воронки
pub async fn set_status(id: Uuid, status: ContractStatus) -> anyhow::Result<Contract> {
    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("contract"))?;

    let previous = aggregate.status;
    aggregate
        .transition_to(status)
        .map_err(DomainError::InvalidTransition)?;
    aggregate.before_write();
    repository::update(&aggregate).await?;

    logger::log(
        "contract",
        &format!(
            "Договор {}: {} -> {}",
            aggregate.base.code,
            previous.as_str(),
            status.as_str()
        ),
    );
    Ok(aggregate)
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    repository::soft_delete(id).await
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Contract>> {
    repository::get_by_id(id).await
}

pub async fn list(filter: &ContractFilter) -> anyhow::Result<Vec<Contract>> {
    repository::list(filter).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_contract::aggregate::ContractKind;

    fn claims(role: UserRole, customer_ref: Option<&str>) -> TokenClaims {
        TokenClaims {
            sub: "u-1".into(),
            username: "user".into(),
            role,
            technician_ref: None,
            customer_ref: customer_ref.map(Into::into),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_customer_filter_is_forced_to_own_contracts() {
        let filter = ContractFilter {
            customer_ref: Some("someone-else".into()),
            kind: Some(ContractKind::Offer),
            ..Default::default()
        };
        let scoped = scope_filter(filter, &claims(UserRole::Customer, Some("c-1"))).unwrap();
        assert_eq!(scoped.customer_ref.as_deref(), Some("c-1"));
        assert_eq!(scoped.kind, Some(ContractKind::Offer));
    }

    #[test]
    fn test_admin_filter_is_untouched() {
        let filter = ContractFilter {
            customer_ref: Some("c-9".into()),
            ..Default::default()
        };
        let scoped = scope_filter(filter.clone(), &claims(UserRole::Admin, None)).unwrap();
        assert_eq!(scoped, filter);
    }

    #[test]
    fn test_technician_and_orphan_customer_are_rejected() {
        let filter = ContractFilter::default();
        assert_eq!(
            scope_filter(filter.clone(), &claims(UserRole::Technician, None)),
            Err(DomainError::Forbidden)
        );
        assert_eq!(
            scope_filter(filter, &claims(UserRole::Customer, None)),
            Err(DomainError::Forbidden)
        );
    }
}
