use crate::domain::a001_contract::aggregate::ContractStatus;
use serde::{Deserialize, Serialize};

/// Этап воронки договоров
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStage {
    pub status: ContractStatus,
    pub label: String,
    pub count: u32,
    pub total_value: f64,
}

/// Динамика договоров по месяцам
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineMonthRow {
    pub period: String,
    /// Создано договоров и предложений
    pub created: u32,
    /// Подписано в этом месяце
    pub signed: u32,
    /// Сумма подписанных
    pub signed_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResponse {
    pub date_from: String,
    pub date_to: String,
    /// Все статусы в порядке воронки (включая пустые)
    pub stages: Vec<PipelineStage>,
    pub months: Vec<PipelineMonthRow>,
    /// Конверсия: подписанные и далее / все, кроме черновиков, %
    pub conversion_rate: f64,
    /// Сумма открытых договоров
    pub open_value: f64,
}
