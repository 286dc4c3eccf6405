use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata, Origin};
use crate::uuid_aggregate_id;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

uuid_aggregate_id!(
    /// Уникальный идентификатор выезда
    ServiceCaseId
);

/// Статус выезда
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Scheduled => "scheduled",
            CaseStatus::Completed => "completed",
            CaseStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(CaseStatus::Scheduled),
            "completed" => Some(CaseStatus::Completed),
            "cancelled" => Some(CaseStatus::Cancelled),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Scheduled => "Запланирован",
            CaseStatus::Completed => "Выполнен",
            CaseStatus::Cancelled => "Отменён",
        }
    }
}

/// Статус выставления счёта по выезду
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Unbilled,
    Invoiced,
    Paid,
    Overdue,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unbilled => "unbilled",
            InvoiceStatus::Invoiced => "invoiced",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "unbilled" => Some(InvoiceStatus::Unbilled),
            "invoiced" => Some(InvoiceStatus::Invoiced),
            "paid" => Some(InvoiceStatus::Paid),
            "overdue" => Some(InvoiceStatus::Overdue),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvoiceStatus::Unbilled => "Не выставлен",
            InvoiceStatus::Invoiced => "Выставлен",
            InvoiceStatus::Paid => "Оплачен",
            InvoiceStatus::Overdue => "Просрочен",
        }
    }
}

/// Выезд техника к клиенту
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCase {
    #[serde(flatten)]
    pub base: BaseAggregate<ServiceCaseId>,

    #[serde(rename = "caseDate")]
    pub case_date: NaiveDate,

    #[serde(rename = "technicianRef")]
    pub technician_ref: String,
    #[serde(rename = "technicianName", default)]
    pub technician_name: String,

    #[serde(rename = "customerRef")]
    pub customer_ref: String,
    #[serde(rename = "customerName", default)]
    pub customer_name: String,

    #[serde(rename = "contractRef", default)]
    pub contract_ref: Option<String>,

    /// Вредитель (например, "Грызуны", "Тараканы")
    #[serde(rename = "pestType")]
    pub pest_type: String,

    pub status: CaseStatus,
    pub price: f64,

    #[serde(rename = "materialCost")]
    pub material_cost: f64,

    #[serde(rename = "invoiceStatus")]
    pub invoice_status: InvoiceStatus,
    #[serde(rename = "invoicedAt", default)]
    pub invoiced_at: Option<DateTime<Utc>>,
    #[serde(rename = "paidAt", default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl ServiceCase {
    pub fn new_for_insert(dto: &ServiceCaseDto, code: String) -> Self {
        let mut base = BaseAggregate::new(ServiceCaseId::new_v4(), code, dto.description.clone());
        base.comment = dto.comment.clone();
        let mut case = Self {
            base,
            case_date: dto.case_date,
            technician_ref: dto.technician_ref.clone(),
            technician_name: String::new(),
            customer_ref: dto.customer_ref.clone(),
            customer_name: String::new(),
            contract_ref: dto.contract_ref.clone(),
            pest_type: dto.pest_type.clone(),
            status: dto.status,
            price: dto.price,
            material_cost: dto.material_cost,
            invoice_status: InvoiceStatus::Unbilled,
            invoiced_at: None,
            paid_at: None,
        };
        case.set_invoice_status(dto.invoice_status);
        case
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    pub fn update(&mut self, dto: &ServiceCaseDto) {
        if let Some(code) = dto.code.clone() {
            self.base.code = code;
        }
        self.base.description = dto.description.clone();
        self.base.comment = dto.comment.clone();
        self.case_date = dto.case_date;
        self.technician_ref = dto.technician_ref.clone();
        self.customer_ref = dto.customer_ref.clone();
        self.contract_ref = dto.contract_ref.clone();
        self.pest_type = dto.pest_type.clone();
        self.status = dto.status;
        self.price = dto.price;
        self.material_cost = dto.material_cost;
        self.set_invoice_status(dto.invoice_status);
    }

    /// Сменить статус счёта, проставив даты выставления и оплаты
    pub fn set_invoice_status(&mut self, status: InvoiceStatus) {
        let now = Utc::now();
        match status {
            InvoiceStatus::Unbilled => {
                self.invoiced_at = None;
                self.paid_at = None;
            }
            InvoiceStatus::Invoiced | InvoiceStatus::Overdue => {
                self.invoiced_at.get_or_insert(now);
                self.paid_at = None;
            }
            InvoiceStatus::Paid => {
                self.invoiced_at.get_or_insert(now);
                self.paid_at.get_or_insert(now);
            }
        }
        self.invoice_status = status;
    }

    /// Выезд приносит выручку только в статусе "выполнен"
    pub fn revenue(&self) -> f64 {
        if self.status == CaseStatus::Completed {
            self.price
        } else {
            0.0
        }
    }

    /// Комиссия техника по ставке
    pub fn commission(&self, rate: f64) -> f64 {
        self.revenue() * rate
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.technician_ref.trim().is_empty() {
            return Err("Не указан техник".into());
        }
        if self.customer_ref.trim().is_empty() {
            return Err("Не указан клиент".into());
        }
        if self.pest_type.trim().is_empty() {
            return Err("Не указан вид вредителя".into());
        }
        if self.price < 0.0 || self.material_cost < 0.0 {
            return Err("Суммы не могут быть отрицательными".into());
        }
        if self.status != CaseStatus::Completed && self.invoice_status != InvoiceStatus::Unbilled
        {
            return Err("Счёт можно выставить только по выполненному выезду".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for ServiceCase {
    type Id = ServiceCaseId;

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
        "a005"
    }

    fn collection_name() -> &'static str {
        "service_case"
    }

    fn element_name() -> &'static str {
        "Выезд"
    }

    fn list_name() -> &'static str {
        "Выезды"
    }

    fn origin() -> Origin {
        Origin::Self_
    }
}

/// DTO для создания/обновления выезда
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCaseDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub description: String,
    pub comment: Option<String>,

    #[serde(rename = "caseDate")]
    pub case_date: NaiveDate,
    #[serde(rename = "technicianRef")]
    pub technician_ref: String,
    #[serde(rename = "customerRef")]
    pub customer_ref: String,
    #[serde(rename = "contractRef", default)]
    pub contract_ref: Option<String>,
    #[serde(rename = "pestType")]
    pub pest_type: String,
    pub status: CaseStatus,
    pub price: f64,
    #[serde(rename = "materialCost", default)]
    pub material_cost: f64,
    #[serde(rename = "invoiceStatus")]
    pub invoice_status: InvoiceStatus,
}

/// Фильтр списка выездов
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technician_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(status: CaseStatus, invoice: InvoiceStatus) -> ServiceCaseDto {
        ServiceCaseDto {
            id: None,
            code: None,
            description: "Дезинсекция кухни".into(),
            comment: None,
            case_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            technician_ref: "t-1".into(),
            customer_ref: "c-1".into(),
            contract_ref: None,
            pest_type: "Тараканы".into(),
            status,
            price: 4000.0,
            material_cost: 600.0,
            invoice_status: invoice,
        }
    }

    #[test]
    fn test_commission_only_for_completed() {
        let done = ServiceCase::new_for_insert(&dto(CaseStatus::Completed, InvoiceStatus::Unbilled), "C-1".into());
        assert_eq!(done.commission(0.1), 400.0);
        let planned = ServiceCase::new_for_insert(&dto(CaseStatus::Scheduled, InvoiceStatus::Unbilled), "C-2".into());
        assert_eq!(planned.commission(0.1), 0.0);
    }

    #[test]
    fn test_invoice_dates_follow_status() {
        let mut case = ServiceCase::new_for_insert(&dto(CaseStatus::Completed, InvoiceStatus::Invoiced), "C-1".into());
        assert!(case.invoiced_at.is_some());
        assert!(case.paid_at.is_none());
        case.set_invoice_status(InvoiceStatus::Paid);
        assert!(case.paid_at.is_some());
        case.set_invoice_status(InvoiceStatus::Unbilled);
        assert!(case.invoiced_at.is_none());
    }

    #[test]
    fn test_cannot_invoice_unfinished_case() {
        let case = ServiceCase::new_for_insert(&dto(CaseStatus::Scheduled, InvoiceStatus::Invoiced), "C-1".into());
        assert!(case.validate().is_err());
    }
}
