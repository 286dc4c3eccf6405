use crate::domain::a005_service_case::aggregate::ServiceCase;
use serde::{Deserialize, Serialize};

/// Запрос портала техника
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalRequest {
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    /// Только для администратора: чей портал открыть
    #[serde(default)]
    pub technician_ref: Option<String>,
}

/// Комиссия техника за месяц
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommissionRow {
    pub period: String,
    pub case_count: u32,
    pub revenue: f64,
    pub commission: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalResponse {
    pub technician_ref: String,
    pub technician_name: String,
    pub commission_rate: f64,
    pub date_from: String,
    pub date_to: String,
    pub rows: Vec<CommissionRow>,
    pub total_commission: f64,
    /// Выезды техника за период, новые сверху
    pub cases: Vec<ServiceCase>,
}
