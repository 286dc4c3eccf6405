use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata, Origin};
use crate::uuid_aggregate_id;
use serde::{Deserialize, Serialize};

uuid_aggregate_id!(
    /// Уникальный идентификатор клиента
    CustomerId
);

/// Клиент (частное лицо или организация), заказывающий обработку
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(flatten)]
    pub base: BaseAggregate<CustomerId>,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Customer {
    pub fn new_for_insert(dto: &CustomerDto, code: String) -> Self {
        let mut base = BaseAggregate::new(CustomerId::new_v4(), code, dto.description.clone());
        base.comment = dto.comment.clone();
        Self {
            base,
            email: dto.email.clone(),
            phone: dto.phone.clone(),
            address: dto.address.clone(),
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn update(&mut self, dto: &CustomerDto) {
        if let Some(code) = dto.code.clone() {
            self.base.code = code;
        }
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.email = dto.email.clone();
        self.phone = dto.phone.clone();
        self.address = dto.address.clone();
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Имя клиента не может быть пустым".into());
        }
        if let Some(email) = &self.email {
            if !email.trim().is_empty() && !email.contains('@') {
                return Err("Некорректный email".into());
            }
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for Customer {
    type Id = CustomerId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a003"
    }

    fn collection_name() -> &'static str {
        "customer"
    }

    fn element_name() -> &'static str {
        "Клиент"
    }

    fn list_name() -> &'static str {
        "Клиенты"
    }

    fn origin() -> Origin {
        Origin::Self_
    }
}

/// DTO для создания/обновления клиента
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CustomerDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub comment: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_validation() {
        let mut dto = CustomerDto {
            description: "Иванов И.И.".into(),
            email: Some("ivanov@example.com".into()),
            ..Default::default()
        };
        assert!(Customer::new_for_insert(&dto, "CUS-1".into()).validate().is_ok());

        dto.email = Some("ivanov.example.com".into());
        assert!(Customer::new_for_insert(&dto, "CUS-1".into()).validate().is_err());

        dto.email = None;
        dto.description = "  ".into();
        assert!(Customer::new_for_insert(&dto, "CUS-1".into()).validate().is_err());
    }
}
