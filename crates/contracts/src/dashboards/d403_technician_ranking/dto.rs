use serde::{Deserialize, Serialize};

/// Строка рейтинга техников
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicianRankingRow {
    /// Место (1-based; при равенстве места совпадают: 1, 1, 3)
    pub rank: u32,
    pub technician_ref: String,
    pub technician_name: String,
    pub case_count: u32,
    pub revenue: f64,
    pub avg_case_value: f64,
    pub commission: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianRankingResponse {
    pub date_from: String,
    pub date_to: String,
    pub rows: Vec<TechnicianRankingRow>,
    /// Первые три места
    pub podium: Vec<TechnicianRankingRow>,
}
