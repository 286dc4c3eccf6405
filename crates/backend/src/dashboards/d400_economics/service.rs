use anyhow::Result;
use chrono::{NaiveDate, Utc};
use contracts::dashboards::d400_economics::{EconomicsResponse, EconomicsRow, PestTypeRow};
use contracts::domain::a005_service_case::aggregate::{CaseStatus, ServiceCase};
use contracts::shared::period::PeriodRangeRequest;
use std::collections::HashMap;

use crate::domain::{a004_technician, a005_service_case};
use crate::shared::aggregation::{percent, round2, Accumulate, MetricStats, PeriodBuckets};
use crate::shared::error::DomainError;

/// Выполненный выезд со ставкой комиссии его техника
type RatedCase<'a> = (&'a ServiceCase, f64);

impl<'a> Accumulate<RatedCase<'a>> for EconomicsRow {
    fn accumulate(&mut self, item: &RatedCase<'a>) {
        let (case, rate) = item;
        self.revenue += case.revenue();
        self.material_cost += case.material_cost;
        self.commissions += case.commission(*rate);
        self.case_count += 1;
    }
}

fn finish(mut row: EconomicsRow) -> EconomicsRow {
    row.margin = round2(row.revenue - row.material_cost - row.commissions);
    row.avg_case_value = if row.case_count > 0 {
        round2(row.revenue / row.case_count as f64)
    } else {
        0.0
    };
    row.revenue = round2(row.revenue);
    row.material_cost = round2(row.material_cost);
    row.commissions = round2(row.commissions);
    row
}

/// Дашборд экономики за период (по умолчанию последние 12 месяцев)
pub async fn get_economics(request: PeriodRangeRequest) -> Result<EconomicsResponse> {
    let (from, to) = request.resolve(Utc::now().date_naive())
        .map_err(DomainError::validation)?;
    let cases = a005_service_case::repository::list_in_range(from, to).await?;
    let rates: HashMap<String, f64> = a004_technician::service::map_by_id()
        .await?
        .into_iter()
        .map(|(id, t)| (id, t.commission_rate))
        .collect();
    Ok(build_economics(from, to, &cases, &rates))
}

pub fn build_economics(
    from: NaiveDate,
    to: NaiveDate,
    cases: &[ServiceCase],
    rates: &HashMap<String, f64>,
) -> EconomicsResponse {
    let completed: Vec<RatedCase> = cases
        .iter()
        .filter(|c| c.status == CaseStatus::Completed)
        .map(|c| (c, rates.get(&c.technician_ref).copied().unwrap_or(0.0)))
        .collect();

    let rows: Vec<EconomicsRow> = PeriodBuckets::<EconomicsRow>::new(from, to)
        .fold(&completed, |(c, _)| Some(c.case_date))
        .into_rows()
        .into_iter()
        .map(|(period, row)| finish(EconomicsRow { period, ..row }))
        .collect();

    let mut totals = EconomicsRow {
        period: "total".to_string(),
        ..Default::default()
    };
    for item in &completed {
        if item.0.case_date >= from && item.0.case_date <= to {
            totals.accumulate(item);
        }
    }
    let totals = finish(totals);

    EconomicsResponse {
        date_from: from.format("%Y-%m-%d").to_string(),
        date_to: to.format("%Y-%m-%d").to_string(),
        rows,
        by_pest_type: by_pest_type(&completed, totals.revenue),
        totals,
    }
}

fn by_pest_type(completed: &[RatedCase], total_revenue: f64) -> Vec<PestTypeRow> {
    let mut groups: HashMap<&str, MetricStats> = HashMap::new();
    for (case, _) in completed {
        groups
            .entry(case.pest_type.as_str())
            .or_default()
            .push(case.revenue());
    }
    let mut rows: Vec<PestTypeRow> = groups
        .into_iter()
        .map(|(pest_type, stats)| PestTypeRow {
            pest_type: pest_type.to_string(),
            case_count: stats.count,
            revenue: round2(stats.sum),
            share_percent: round2(percent(stats.sum, total_revenue)),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.pest_type.cmp(&b.pest_type))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a005_service_case::aggregate::{InvoiceStatus, ServiceCaseDto};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn case(date: NaiveDate, tech: &str, pest: &str, status: CaseStatus, price: f64) -> ServiceCase {
        ServiceCase::new_for_insert(
            &ServiceCaseDto {
                id: None,
                code: None,
                description: "Обработка".into(),
                comment: None,
                case_date: date,
                technician_ref: tech.into(),
                customer_ref: "c-1".into(),
                contract_ref: None,
                pest_type: pest.into(),
                status,
                price,
                material_cost: 100.0,
                invoice_status: InvoiceStatus::Unbilled,
            },
            "SC".into(),
        )
    }

    #[test]
    fn test_monthly_economics() {
        let cases = vec![
            case(d(2025, 1, 10), "t1", "Грызуны", CaseStatus::Completed, 1000.0),
            case(d(2025, 1, 20), "t2", "Тараканы", CaseStatus::Completed, 3000.0),
            case(d(2025, 1, 25), "t1", "Грызуны", CaseStatus::Scheduled, 9000.0),
            case(d(2025, 3, 5), "t1", "Грызуны", CaseStatus::Completed, 2000.0),
        ];
        let rates = HashMap::from([("t1".to_string(), 0.1), ("t2".to_string(), 0.2)]);
        let resp = build_economics(d(2025, 1, 1), d(2025, 3, 31), &cases, &rates);

        assert_eq!(resp.rows.len(), 3);
        let jan = &resp.rows[0];
        assert_eq!(jan.period, "2025-01");
        assert_eq!(jan.revenue, 4000.0);
        assert_eq!(jan.material_cost, 200.0);
        assert_eq!(jan.commissions, 700.0);
        assert_eq!(jan.margin, 3100.0);
        assert_eq!(jan.case_count, 2);
        assert_eq!(jan.avg_case_value, 2000.0);

        let feb = &resp.rows[1];
        assert_eq!((feb.case_count, feb.revenue, feb.avg_case_value), (0, 0.0, 0.0));

        assert_eq!(resp.totals.period, "total");
        assert_eq!(resp.totals.revenue, 6000.0);
        assert_eq!(resp.totals.case_count, 3);
    }

    #[test]
    fn test_pest_type_breakdown_sorted_by_revenue() {
        let cases = vec![
            case(d(2025, 1, 10), "t1", "Грызуны", CaseStatus::Completed, 1000.0),
            case(d(2025, 1, 11), "t1", "Тараканы", CaseStatus::Completed, 3000.0),
        ];
        let resp = build_economics(d(2025, 1, 1), d(2025, 1, 31), &cases, &HashMap::new());
        assert_eq!(resp.by_pest_type[0].pest_type, "Тараканы");
        assert_eq!(resp.by_pest_type[0].share_percent, 75.0);
        assert_eq!(resp.by_pest_type[1].share_percent, 25.0);
        // Без ставки комиссия нулевая
        assert_eq!(resp.totals.commissions, 0.0);
    }
}
