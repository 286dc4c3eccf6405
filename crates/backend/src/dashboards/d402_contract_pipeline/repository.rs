use anyhow::Result;
use sea_orm::{FromQueryResult, Statement};
use serde::{Deserialize, Serialize};

use crate::shared::data::db::get_connection;

/// Текущий срез воронки: количество и сумма по статусу
#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult)]
pub struct StageAggregation {
    pub status: String,
    pub count: i64,
    pub total_value: f64,
}

/// Количество и сумма договоров за месяц ("YYYY-MM")
#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult)]
pub struct MonthAggregation {
    pub period: String,
    pub count: i64,
    pub total_value: f64,
}

pub async fn get_stages() -> Result<Vec<StageAggregation>> {
    let db = get_connection();

    let sql = r#"
        SELECT
            status,
            COUNT(*) AS count,
            COALESCE(SUM(total_value), 0) AS total_value
        FROM a001_contract
        WHERE is_deleted = 0
        GROUP BY status
    "#;

    let stmt = Statement::from_string(sea_orm::DatabaseBackend::Sqlite, sql.to_string());
    Ok(StageAggregation::find_by_statement(stmt).all(db).await?)
}

/// Договоры, созданные в диапазоне, по месяцам
pub async fn get_created_by_month(date_from: &str, date_to: &str) -> Result<Vec<MonthAggregation>> {
    get_by_month("created_at", date_from, date_to).await
}

/// Договоры, подписанные в диапазоне, по месяцам
pub async fn get_signed_by_month(date_from: &str, date_to: &str) -> Result<Vec<MonthAggregation>> {
    get_by_month("signed_at", date_from, date_to).await
}

async fn get_by_month(
    column: &'static str,
    date_from: &str,
    date_to: &str,
) -> Result<Vec<MonthAggregation>> {
    let db = get_connection();

    let sql = format!(
        r#"
        SELECT
            substr({col}, 1, 7) AS period,
            COUNT(*) AS count,
            COALESCE(SUM(total_value), 0) AS total_value
        FROM a001_contract
        WHERE is_deleted = 0
          AND {col} IS NOT NULL
          AND substr({col}, 1, 10) >= ? AND substr({col}, 1, 10) <= ?
        GROUP BY substr({col}, 1, 7)
        ORDER BY period
        "#,
        col = column
    );

    let stmt = Statement::from_sql_and_values(
        sea_orm::DatabaseBackend::Sqlite,
        &sql,
        [date_from.into(), date_to.into()],
    );
    Ok(MonthAggregation::find_by_statement(stmt).all(db).await?)
}
