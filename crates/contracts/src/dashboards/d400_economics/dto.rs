use serde::{Deserialize, Serialize};

/// Экономика за один месяц
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EconomicsRow {
    /// Период "YYYY-MM"
    pub period: String,
    /// Выручка по выполненным выездам
    pub revenue: f64,
    /// Расходные материалы
    pub material_cost: f64,
    /// Комиссии техников
    pub commissions: f64,
    /// Маржа = выручка - материалы - комиссии
    pub margin: f64,
    /// Количество выполненных выездов
    pub case_count: u32,
    /// Средний чек выполненного выезда
    pub avg_case_value: f64,
}

/// Выручка по виду вредителя
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PestTypeRow {
    pub pest_type: String,
    pub case_count: u32,
    pub revenue: f64,
    /// Доля в общей выручке, %
    pub share_percent: f64,
}

/// Ответ дашборда экономики
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicsResponse {
    pub date_from: String,
    pub date_to: String,
    /// Строки по месяцам (пустые месяцы с нулями)
    pub rows: Vec<EconomicsRow>,
    /// Итог за диапазон (period = "total")
    pub totals: EconomicsRow,
    /// Разбивка по видам вредителей, по убыванию выручки
    pub by_pest_type: Vec<PestTypeRow>,
}
