use anyhow::Result;
use chrono::{NaiveDate, Utc};
use contracts::dashboards::d402_contract_pipeline::{PipelineMonthRow, PipelineResponse, PipelineStage};
use contracts::domain::a001_contract::aggregate::ContractStatus;
use contracts::shared::period::PeriodRangeRequest;

use super::repository::{self, MonthAggregation, StageAggregation};
use crate::shared::aggregation::{percent, period_keys, round2};
use crate::shared::error::DomainError;

pub async fn get_pipeline(request: PeriodRangeRequest) -> Result<PipelineResponse> {
    let (from, to) = request.resolve(Utc::now().date_naive())
        .map_err(DomainError::validation)?;
    let date_from = from.format("%Y-%m-%d").to_string();
    let date_to = to.format("%Y-%m-%d").to_string();

    let stages = repository::get_stages().await?;
    let created = repository::get_created_by_month(&date_from, &date_to).await?;
    let signed = repository::get_signed_by_month(&date_from, &date_to).await?;

    Ok(build_pipeline(from, to, &stages, &created, &signed))
}

pub fn build_pipeline(
    from: NaiveDate,
    to: NaiveDate,
    stages: &[StageAggregation],
    created: &[MonthAggregation],
    signed: &[MonthAggregation],
) -> PipelineResponse {
    let stage_rows: Vec<PipelineStage> = ContractStatus::ALL
        .iter()
        .map(|status| {
            let found = stages.iter().find(|s| s.status == status.as_str());
            PipelineStage {
                status: *status,
                label: status.label().to_string(),
                count: found.map(|s| s.count as u32).unwrap_or(0),
                total_value: round2(found.map(|s| s.total_value).unwrap_or(0.0)),
            }
        })
        .collect();

    // Неизвестные статусы в БД в воронку не попадают
    let non_draft: u32 = stage_rows
        .iter()
        .filter(|s| s.status != ContractStatus::Draft)
        .map(|s| s.count)
        .sum();
    let reached_signing: u32 = stage_rows
        .iter()
        .filter(|s| s.status.is_signed_or_later())
        .map(|s| s.count)
        .sum();
    let open_value: f64 = stage_rows
        .iter()
        .filter(|s| s.status.is_open())
        .map(|s| s.total_value)
        .sum();

    let months = period_keys(from, to)
        .into_iter()
        .map(|period| {
            let c = created.iter().find(|m| m.period == period);
            let s = signed.iter().find(|m| m.period == period);
            PipelineMonthRow {
                created: c.map(|m| m.count as u32).unwrap_or(0),
                signed: s.map(|m| m.count as u32).unwrap_or(0),
                signed_value: round2(s.map(|m| m.total_value).unwrap_or(0.0)),
                period,
            }
        })
        .collect();

    PipelineResponse {
        date_from: from.format("%Y-%m-%d").to_string(),
        date_to: to.format("%Y-%m-%d").to_string(),
        stages: stage_rows,
        months,
        conversion_rate: round2(percent(reached_signing as f64, non_draft as f64)),
        open_value: round2(open_value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(status: &str, count: i64, total_value: f64) -> StageAggregation {
        StageAggregation {
            status: status.into(),
            count,
            total_value,
        }
    }

    fn month(period: &str, count: i64, total_value: f64) -> MonthAggregation {
        MonthAggregation {
            period: period.into(),
            count,
            total_value,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_stages_in_funnel_order_with_conversion() {
        let stages = vec![
            stage("active", 2, 20000.0),
            stage("draft", 5, 1000.0),
            stage("pending", 1, 3000.0),
            stage("declined", 1, 500.0),
            stage("legacy", 7, 1.0),
        ];
        let resp = build_pipeline(d(2025, 1, 1), d(2025, 1, 31), &stages, &[], &[]);

        let order: Vec<ContractStatus> = resp.stages.iter().map(|s| s.status).collect();
        assert_eq!(order, ContractStatus::ALL.to_vec());
        assert_eq!(resp.stages[0].count, 5);
        assert_eq!(resp.stages[2].count, 0);
        // 2 подписанных и далее из 4 без черновиков
        assert_eq!(resp.conversion_rate, 50.0);
        // draft + pending + active
        assert_eq!(resp.open_value, 24000.0);
    }

    #[test]
    fn test_months_fill_gaps() {
        let created = vec![month("2025-01", 3, 100.0), month("2025-03", 1, 50.0)];
        let signed = vec![month("2025-03", 2, 7000.0)];
        let resp = build_pipeline(d(2025, 1, 1), d(2025, 3, 31), &[], &created, &signed);
        let view: Vec<(&str, u32, u32)> = resp
            .months
            .iter()
            .map(|m| (m.period.as_str(), m.created, m.signed))
            .collect();
        assert_eq!(view, vec![("2025-01", 3, 0), ("2025-02", 0, 0), ("2025-03", 1, 2)]);
        assert_eq!(resp.months[2].signed_value, 7000.0);
        assert_eq!(resp.conversion_rate, 0.0);
    }
}
