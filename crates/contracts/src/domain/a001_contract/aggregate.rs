use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata, Origin};
use crate::uuid_aggregate_id;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// ID Type
// ============================================================================

uuid_aggregate_id!(
    /// Уникальный идентификатор договора
    ContractId
);

// ============================================================================
// Enums
// ============================================================================

/// Статус договора в воронке продаж
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Draft,
    Pending,
    Signed,
    Active,
    Declined,
    Overdue,
    Ended,
}

impl ContractStatus {
    /// Все статусы в порядке воронки
    pub const ALL: [ContractStatus; 7] = [
        ContractStatus::Draft,
        ContractStatus::Pending,
        ContractStatus::Signed,
        ContractStatus::Active,
        ContractStatus::Declined,
        ContractStatus::Overdue,
        ContractStatus::Ended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Pending => "pending",
            ContractStatus::Signed => "signed",
            ContractStatus::Active => "active",
            ContractStatus::Declined => "declined",
            ContractStatus::Overdue => "overdue",
            ContractStatus::Ended => "ended",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|st| st.as_str() == s)
    }

    /// Название для UI
    pub fn label(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "Черновик",
            ContractStatus::Pending => "Ожидает подписи",
            ContractStatus::Signed => "Подписан",
            ContractStatus::Active => "Действует",
            ContractStatus::Declined => "Отклонён",
            ContractStatus::Overdue => "Просрочен",
            ContractStatus::Ended => "Завершён",
        }
    }

    /// Договор ещё в работе (не отклонён и не завершён)
    pub fn is_open(&self) -> bool {
        !matches!(self, ContractStatus::Declined | ContractStatus::Ended)
    }

    /// Договор дошёл до подписания (или дальше)
    pub fn is_signed_or_later(&self) -> bool {
        matches!(
            self,
            ContractStatus::Signed
                | ContractStatus::Active
                | ContractStatus::Overdue
                | ContractStatus::Ended
        )
    }

    /// Допустимые переходы статусов
    pub fn can_transition_to(&self, next: ContractStatus) -> bool {
        use ContractStatus::*;
        matches!(
            (self, next),
            (Draft, Pending)
                | (Draft, Declined)
                | (Pending, Signed)
                | (Pending, Declined)
                | (Signed, Active)
                | (Active, Overdue)
                | (Active, Ended)
                | (Overdue, Active)
                | (Overdue, Ended)
        )
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Вид документа: договор или коммерческое предложение
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    Contract,
    Offer,
}

impl ContractKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractKind::Contract => "contract",
            ContractKind::Offer => "offer",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "contract" => Some(ContractKind::Contract),
            "offer" => Some(ContractKind::Offer),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContractKind::Contract => "Договор",
            ContractKind::Offer => "Предложение",
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Договор на обслуживание (или предложение) с клиентом
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    #[serde(flatten)]
    pub base: BaseAggregate<ContractId>,

    pub status: ContractStatus,
    pub kind: ContractKind,

    #[serde(rename = "totalValue")]
    pub total_value: f64,

    #[serde(rename = "customerRef")]
    pub customer_ref: String,

    /// Денормализованное имя клиента для списков
    #[serde(rename = "customerName", default)]
    pub customer_name: String,

    /// Идентификатор документа в сервисе электронной подписи
    #[serde(rename = "externalRef", default)]
    pub external_ref: Option<String>,

    #[serde(rename = "signedAt", default)]
    pub signed_at: Option<DateTime<Utc>>,

    #[serde(rename = "validUntil", default)]
    pub valid_until: Option<NaiveDate>,
}

impl Contract {
    /// Создать новый договор для вставки в БД
    pub fn new_for_insert(dto: &ContractDto, code: String) -> Self {
        let mut base = BaseAggregate::new(ContractId::new_v4(), code, dto.description.clone());
        base.comment = dto.comment.clone();

        Self {
            base,
            status: ContractStatus::Draft,
            kind: dto.kind,
            total_value: dto.total_value,
            customer_ref: dto.customer_ref.clone(),
            customer_name: String::new(),
            external_ref: dto.external_ref.clone(),
            signed_at: None,
            valid_until: dto.valid_until,
        }
    }

    /// Получить ID как строку
    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Обновить данные из DTO (статус меняется только через переходы)
    pub fn update(&mut self, dto: &ContractDto) {
        if let Some(code) = dto.code.clone() {
            self.base.code = code;
        }
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.kind = dto.kind;
        self.total_value = dto.total_value;
        self.customer_ref = dto.customer_ref.clone();
        self.external_ref = dto.external_ref.clone();
        self.valid_until = dto.valid_until;
    }

    /// Перевести договор в новый статус
    pub fn transition_to(&mut self, next: ContractStatus) -> Result<(), String> {
        if !self.status.can_transition_to(next) {
            return Err(format!(
                "Недопустимый переход статуса: {} -> {}",
                self.status, next
            ));
        }
        if next == ContractStatus::Signed {
            self.signed_at = Some(Utc::now());
        }
        self.status = next;
        Ok(())
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Описание не может быть пустым".into());
        }
        if self.base.code.trim().is_empty() {
            return Err("Код не может быть пустым".into());
        }
        if self.customer_ref.trim().is_empty() {
            return Err("Не указан клиент".into());
        }
        if !self.total_value.is_finite() || self.total_value < 0.0 {
            return Err("Сумма договора не может быть отрицательной".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for Contract {
    type Id = ContractId;

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
        "a001"
    }

    fn collection_name() -> &'static str {
        "contract"
    }

    fn element_name() -> &'static str {
        "Договор"
    }

    fn list_name() -> &'static str {
        "Договоры"
    }

    fn origin() -> Origin {
        Origin::Self_
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления договора
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub comment: Option<String>,
    pub kind: ContractKind,

    #[serde(rename = "totalValue")]
    pub total_value: f64,

    #[serde(rename = "customerRef")]
    pub customer_ref: String,

    #[serde(rename = "externalRef", default)]
    pub external_ref: Option<String>,

    #[serde(rename = "validUntil", default)]
    pub valid_until: Option<NaiveDate>,
}

/// Запрос на смену статуса договора
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContractStatusUpdate {
    pub status: ContractStatus,
}

/// Фильтр списка договоров
///
/// Сериализованное значение фильтра служит ключом клиентского кэша.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContractStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContractKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

impl ContractFilter {
    /// Ключ кэша: сериализованное значение фильтра
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Пустые строки считаются отсутствующими условиями
    pub fn normalized(&self) -> Self {
        fn clean(v: &Option<String>) -> Option<String> {
            v.as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        }
        Self {
            status: self.status,
            kind: self.kind,
            customer_ref: clean(&self.customer_ref),
            search: clean(&self.search),
            date_from: clean(&self.date_from),
            date_to: clean(&self.date_to),
        }
    }

    /// Проверка договора на соответствие фильтру
    pub fn matches(&self, contract: &Contract) -> bool {
        if let Some(status) = self.status {
            if contract.status != status {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if contract.kind != kind {
                return false;
            }
        }
        if let Some(customer_ref) = &self.customer_ref {
            if &contract.customer_ref != customer_ref {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hay = format!(
                "{} {} {}",
                contract.base.code, contract.base.description, contract.customer_name
            )
            .to_lowercase();
            if !hay.contains(&needle) {
                return false;
            }
        }
        let created = contract.base.metadata.created_at.format("%Y-%m-%d").to_string();
        if let Some(from) = &self.date_from {
            if created.as_str() < from.as_str() {
                return false;
            }
        }
        if let Some(to) = &self.date_to {
            if created.as_str() > to.as_str() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Contract {
        let dto = ContractDto {
            id: None,
            code: None,
            description: "Годовое обслуживание склада".into(),
            comment: None,
            kind: ContractKind::Contract,
            total_value: 120_000.0,
            customer_ref: "c-1".into(),
            external_ref: None,
            valid_until: None,
        };
        Contract::new_for_insert(&dto, "CTR-001".into())
    }

    #[test]
    fn test_new_contract_starts_as_draft() {
        let c = sample();
        assert_eq!(c.status, ContractStatus::Draft);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_transitions() {
        let mut c = sample();
        assert!(c.transition_to(ContractStatus::Active).is_err());
        c.transition_to(ContractStatus::Pending).unwrap();
        assert!(c.signed_at.is_none());
        c.transition_to(ContractStatus::Signed).unwrap();
        assert!(c.signed_at.is_some());
        c.transition_to(ContractStatus::Active).unwrap();
        c.transition_to(ContractStatus::Overdue).unwrap();
        c.transition_to(ContractStatus::Active).unwrap();
        c.transition_to(ContractStatus::Ended).unwrap();
        assert!(c.transition_to(ContractStatus::Active).is_err());
    }

    #[test]
    fn test_validation_rejects_negative_value() {
        let mut c = sample();
        c.total_value = -1.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_filter_cache_key_is_stable() {
        let a = ContractFilter {
            status: Some(ContractStatus::Signed),
            ..Default::default()
        };
        let b = ContractFilter {
            status: Some(ContractStatus::Signed),
            ..Default::default()
        };
        assert_eq!(a.cache_key(), b.cache_key());
        assert_ne!(a.cache_key(), ContractFilter::default().cache_key());
        assert_eq!(ContractFilter::default().cache_key(), "{}");
    }

    #[test]
    fn test_filter_normalization_drops_blank_strings() {
        let f = ContractFilter {
            search: Some("   ".into()),
            customer_ref: Some(" c-1 ".into()),
            ..Default::default()
        };
        let n = f.normalized();
        assert_eq!(n.search, None);
        assert_eq!(n.customer_ref.as_deref(), Some("c-1"));
    }

    #[test]
    fn test_filter_matches() {
        let mut c = sample();
        c.customer_name = "ООО Склад".into();
        let f = ContractFilter {
            search: Some("склад".into()),
            ..Default::default()
        };
        assert!(f.matches(&c));
        let f = ContractFilter {
            status: Some(ContractStatus::Active),
            ..Default::default()
        };
        assert!(!f.matches(&c));
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        let json = serde_json::to_string(&ContractStatus::Overdue).unwrap();
        assert_eq!(json, "\"overdue\"");
        assert_eq!(
            ContractStatus::from_str_opt("ended"),
            Some(ContractStatus::Ended)
        );
    }
}
