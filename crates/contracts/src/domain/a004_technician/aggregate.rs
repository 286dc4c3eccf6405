use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata, Origin};
use crate::uuid_aggregate_id;
use serde::{Deserialize, Serialize};

uuid_aggregate_id!(
    /// Уникальный идентификатор техника
    TechnicianId
);

/// Техник, выполняющий обработки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technician {
    #[serde(flatten)]
    pub base: BaseAggregate<TechnicianId>,

    /// Доля от стоимости выполненного выезда (0..=1)
    #[serde(rename = "commissionRate")]
    pub commission_rate: f64,

    #[serde(rename = "isActive")]
    pub is_active: bool,
}

impl Technician {
    pub fn new_for_insert(dto: &TechnicianDto, code: String) -> Self {
        let mut base = BaseAggregate::new(TechnicianId::new_v4(), code, dto.description.clone());
        base.comment = dto.comment.clone();
        Self {
            base,
            commission_rate: dto.commission_rate,
            is_active: dto.is_active,
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn update(&mut self, dto: &TechnicianDto) {
        if let Some(code) = dto.code.clone() {
            self.base.code = code;
        }
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.commission_rate = dto.commission_rate;
        self.is_active = dto.is_active;
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Имя техника не может быть пустым".into());
        }
        if !(0.0..=1.0).contains(&self.commission_rate) {
            return Err("Ставка комиссии должна быть в диапазоне 0..1".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for Technician {
    type Id = TechnicianId;

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
        "a004"
    }

    fn collection_name() -> &'static str {
        "technician"
    }

    fn element_name() -> &'static str {
        "Техник"
    }

    fn list_name() -> &'static str {
        "Техники"
    }

    fn origin() -> Origin {
        Origin::Self_
    }
}

/// DTO для создания/обновления техника
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub comment: Option<String>,

    #[serde(rename = "commissionRate")]
    pub commission_rate: f64,

    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_rate_range() {
        let mut dto = TechnicianDto {
            id: None,
            code: None,
            description: "Петров".into(),
            comment: None,
            commission_rate: 0.15,
            is_active: true,
        };
        assert!(Technician::new_for_insert(&dto, "TEC-1".into()).validate().is_ok());
        dto.commission_rate = 1.5;
        assert!(Technician::new_for_insert(&dto, "TEC-1".into()).validate().is_err());
    }
}
