use serde::{Deserialize, Serialize};

/// Биллинг за один месяц (по дате выезда)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingRow {
    pub period: String,
    /// Сумма выставленных счетов (включая оплаченные и просроченные)
    pub invoiced: f64,
    /// Оплачено
    pub paid: f64,
    /// Выставлено, но не оплачено (включая просроченные)
    pub outstanding: f64,
    /// Просрочено
    pub overdue: f64,
    /// Выполнено, но счёт не выставлен
    pub unbilled: f64,
    pub invoice_count: u32,
    pub overdue_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingResponse {
    pub date_from: String,
    pub date_to: String,
    pub rows: Vec<BillingRow>,
    pub totals: BillingRow,
    /// Доля оплаченного от выставленного, %
    pub collection_rate: f64,
}
