use anyhow::Result;
use chrono::{NaiveDate, Utc};
use contracts::dashboards::d403_technician_ranking::{TechnicianRankingResponse, TechnicianRankingRow};
use contracts::domain::a004_technician::aggregate::Technician;
use contracts::domain::a005_service_case::aggregate::{CaseStatus, ServiceCase};
use contracts::shared::period::PeriodRangeRequest;
use std::collections::HashMap;

use crate::domain::{a004_technician, a005_service_case};
use crate::shared::aggregation::{rank_by, round2, top_n, MetricStats};
use crate::shared::error::DomainError;

const PODIUM_SIZE: usize = 3;

pub async fn get_ranking(request: PeriodRangeRequest) -> Result<TechnicianRankingResponse> {
    let (from, to) = request.resolve(Utc::now().date_naive())
        .map_err(DomainError::validation)?;
    let cases = a005_service_case::repository::list_in_range(from, to).await?;
    let technicians = a004_technician::service::map_by_id().await?;
    Ok(build_ranking(from, to, &cases, &technicians))
}

pub fn build_ranking(
    from: NaiveDate,
    to: NaiveDate,
    cases: &[ServiceCase],
    technicians: &HashMap<String, Technician>,
) -> TechnicianRankingResponse {
    // technician_ref -> (имя из выезда, статистика)
    let mut groups: HashMap<&str, (&str, MetricStats)> = HashMap::new();
    for case in cases
        .iter()
        .filter(|c| c.status == CaseStatus::Completed && c.case_date >= from && c.case_date <= to)
    {
        groups
            .entry(case.technician_ref.as_str())
            .or_insert((case.technician_name.as_str(), MetricStats::default()))
            .1
            .push(case.revenue());
    }

    let mut unranked: Vec<TechnicianRankingRow> = groups
        .into_iter()
        .map(|(technician_ref, (case_name, stats))| {
            let technician = technicians.get(technician_ref);
            let rate = technician.map(|t| t.commission_rate).unwrap_or(0.0);
            let technician_name = technician
                .map(|t| t.base.description.clone())
                .unwrap_or_else(|| case_name.to_string());
            TechnicianRankingRow {
                rank: 0,
                technician_ref: technician_ref.to_string(),
                technician_name,
                case_count: stats.count,
                revenue: round2(stats.sum),
                avg_case_value: round2(stats.average()),
                commission: round2(stats.sum * rate),
            }
        })
        .collect();
    // Стабильный порядок внутри равных мест
    unranked.sort_by(|a, b| a.technician_name.cmp(&b.technician_name));

    let ranked = rank_by(unranked, |row| row.revenue);
    let podium = top_n(&ranked, PODIUM_SIZE);
    let with_rank = |(rank, row): (u32, TechnicianRankingRow)| TechnicianRankingRow { rank, ..row };

    TechnicianRankingResponse {
        date_from: from.format("%Y-%m-%d").to_string(),
        date_to: to.format("%Y-%m-%d").to_string(),
        rows: ranked.into_iter().map(with_rank).collect(),
        podium: podium.into_iter().map(with_rank).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a004_technician::aggregate::TechnicianDto;
    use contracts::domain::a005_service_case::aggregate::{InvoiceStatus, ServiceCaseDto};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn case(tech: &str, price: f64, status: CaseStatus) -> ServiceCase {
        let mut c = ServiceCase::new_for_insert(
            &ServiceCaseDto {
                id: None,
                code: None,
                description: "Выезд".into(),
                comment: None,
                case_date: d(2025, 2, 10),
                technician_ref: tech.into(),
                customer_ref: "c1".into(),
                contract_ref: None,
                pest_type: "Клопы".into(),
                status,
                price,
                material_cost: 0.0,
                invoice_status: InvoiceStatus::Unbilled,
            },
            "SC".into(),
        );
        c.technician_name = format!("Техник {}", tech);
        c
    }

    fn technician(name: &str, rate: f64) -> Technician {
        Technician::new_for_insert(
            &TechnicianDto {
                id: None,
                code: None,
                description: name.into(),
                comment: None,
                commission_rate: rate,
                is_active: true,
            },
            "TEC".into(),
        )
    }

    #[test]
    fn test_ranking_with_ties_and_podium() {
        let cases = vec![
            case("a", 1000.0, CaseStatus::Completed),
            case("b", 3000.0, CaseStatus::Completed),
            case("c", 1500.0, CaseStatus::Completed),
            case("c", 1500.0, CaseStatus::Completed),
            case("d", 500.0, CaseStatus::Completed),
            case("d", 9000.0, CaseStatus::Cancelled),
        ];
        let technicians = HashMap::from([("b".to_string(), technician("Борис", 0.1))]);
        let resp = build_ranking(d(2025, 2, 1), d(2025, 2, 28), &cases, &technicians);

        let view: Vec<(u32, &str, f64)> = resp
            .rows
            .iter()
            .map(|r| (r.rank, r.technician_ref.as_str(), r.revenue))
            .collect();
        assert_eq!(
            view,
            vec![(1, "b", 3000.0), (1, "c", 3000.0), (3, "a", 1000.0), (4, "d", 500.0)]
        );
        assert_eq!(resp.rows[0].technician_name, "Борис");
        assert_eq!(resp.rows[0].commission, 300.0);
        assert_eq!(resp.rows[1].technician_name, "Техник c");
        assert_eq!(resp.rows[1].avg_case_value, 1500.0);
        assert_eq!(resp.rows[1].commission, 0.0);

        assert_eq!(resp.podium.len(), 3);
        assert_eq!(resp.podium[2].technician_ref, "a");
    }

    #[test]
    fn test_empty_range() {
        let resp = build_ranking(d(2025, 2, 1), d(2025, 2, 28), &[], &HashMap::new());
        assert!(resp.rows.is_empty());
        assert!(resp.podium.is_empty());
    }
}
