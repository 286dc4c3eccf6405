use anyhow::Result;
use chrono::{NaiveDate, Utc};
use contracts::dashboards::d404_technician_portal::{CommissionRow, PortalRequest, PortalResponse};
use contracts::domain::a004_technician::aggregate::Technician;
use contracts::domain::a005_service_case::aggregate::{CaseFilter, ServiceCase};
use contracts::shared::period::PeriodRangeRequest;
use contracts::system::auth::{TokenClaims, UserRole};
use uuid::Uuid;

use crate::domain::{a004_technician, a005_service_case};
use crate::shared::aggregation::{round2, Accumulate, PeriodBuckets};
use crate::shared::error::DomainError;

/// Чей портал открыть: техник видит только себя, администратор выбирает техника
pub fn resolve_technician(request: &PortalRequest, claims: &TokenClaims) -> Result<String, DomainError> {
    match claims.role {
        UserRole::Technician => claims
            .technician_ref
            .clone()
            .filter(|r| !r.is_empty())
            .ok_or(DomainError::Forbidden),
        UserRole::Admin => request
            .technician_ref
            .clone()
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| DomainError::Validation("Не указан техник".into())),
        UserRole::Customer => Err(DomainError::Forbidden),
    }
}

impl<'a> Accumulate<(&'a ServiceCase, f64)> for CommissionRow {
    fn accumulate(&mut self, item: &(&'a ServiceCase, f64)) {
        let (case, rate) = item;
        let revenue = case.revenue();
        if revenue > 0.0 {
            self.case_count += 1;
            self.revenue += revenue;
            self.commission += case.commission(*rate);
        }
    }
}

pub async fn get_portal(request: PortalRequest, claims: &TokenClaims) -> Result<PortalResponse> {
    let technician_ref = resolve_technician(&request, claims)?;
    let id = Uuid::parse_str(&technician_ref)
        .map_err(|_| DomainError::Validation("Некорректный идентификатор техника".into()))?;
    let technician = a004_technician::service::get_by_id(id)
        .await?
        .ok_or(DomainError::NotFound("Техник"))?;

    let range = PeriodRangeRequest {
        date_from: request.date_from.clone(),
        date_to: request.date_to.clone(),
    };
    let (from, to) = range.resolve(Utc::now().date_naive())
        .map_err(DomainError::validation)?;
    let cases = a005_service_case::repository::list(&CaseFilter {
        date_from: Some(from.format("%Y-%m-%d").to_string()),
        date_to: Some(to.format("%Y-%m-%d").to_string()),
        technician_ref: Some(technician_ref),
        ..Default::default()
    })
    .await?;

    Ok(build_portal(from, to, &technician, cases))
}

pub fn build_portal(
    from: NaiveDate,
    to: NaiveDate,
    technician: &Technician,
    cases: Vec<ServiceCase>,
) -> PortalResponse {
    let rate = technician.commission_rate;
    let rated: Vec<(&ServiceCase, f64)> = cases.iter().map(|c| (c, rate)).collect();
    let rows: Vec<CommissionRow> = PeriodBuckets::<CommissionRow>::new(from, to)
        .fold(&rated, |(c, _)| Some(c.case_date))
        .into_rows()
        .into_iter()
        .map(|(period, row)| CommissionRow {
            period,
            revenue: round2(row.revenue),
            commission: round2(row.commission),
            ..row
        })
        .collect();

    let total_commission = round2(rows.iter().map(|r| r.commission).sum());

    PortalResponse {
        technician_ref: technician.to_string_id(),
        technician_name: technician.base.description.clone(),
        commission_rate: rate,
        date_from: from.format("%Y-%m-%d").to_string(),
        date_to: to.format("%Y-%m-%d").to_string(),
        rows,
        total_commission,
        cases,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a004_technician::aggregate::TechnicianDto;
    use contracts::domain::a005_service_case::aggregate::{CaseStatus, InvoiceStatus, ServiceCaseDto};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn claims(role: UserRole, technician_ref: Option<&str>) -> TokenClaims {
        TokenClaims {
            sub: "u1".into(),
            username: "user".into(),
            role,
            technician_ref: technician_ref.map(Into::into),
            customer_ref: None,
            exp: 0,
            iat: 0,
        }
    }

    fn case(date: NaiveDate, status: CaseStatus, price: f64) -> ServiceCase {
        ServiceCase::new_for_insert(
            &ServiceCaseDto {
                id: None,
                code: None,
                description: "Выезд".into(),
                comment: None,
                case_date: date,
                technician_ref: "t1".into(),
                customer_ref: "c1".into(),
                contract_ref: None,
                pest_type: "Осы".into(),
                status,
                price,
                material_cost: 0.0,
                invoice_status: InvoiceStatus::Unbilled,
            },
            "SC".into(),
        )
    }

    #[test]
    fn test_technician_sees_only_own_portal() {
        let request = PortalRequest {
            technician_ref: Some("someone-else".into()),
            ..Default::default()
        };
        let own = resolve_technician(&request, &claims(UserRole::Technician, Some("t1")));
        assert_eq!(own, Ok("t1".to_string()));
        assert_eq!(
            resolve_technician(&request, &claims(UserRole::Technician, None)),
            Err(DomainError::Forbidden)
        );
        assert_eq!(
            resolve_technician(&request, &claims(UserRole::Customer, None)),
            Err(DomainError::Forbidden)
        );
    }

    #[test]
    fn test_admin_must_choose_technician() {
        let admin = claims(UserRole::Admin, None);
        assert!(matches!(
            resolve_technician(&PortalRequest::default(), &admin),
            Err(DomainError::Validation(_))
        ));
        let request = PortalRequest {
            technician_ref: Some("t9".into()),
            ..Default::default()
        };
        assert_eq!(resolve_technician(&request, &admin), Ok("t9".to_string()));
    }

    #[test]
    fn test_monthly_commissions() {
        let technician = Technician::new_for_insert(
            &TechnicianDto {
                id: None,
                code: None,
                description: "Иван".into(),
                comment: None,
                commission_rate: 0.15,
                is_active: true,
            },
            "TEC".into(),
        );
        let cases = vec![
            case(d(2025, 6, 20), CaseStatus::Completed, 2000.0),
            case(d(2025, 6, 2), CaseStatus::Scheduled, 5000.0),
            case(d(2025, 4, 5), CaseStatus::Completed, 1000.0),
        ];
        let resp = build_portal(d(2025, 4, 1), d(2025, 6, 30), &technician, cases);

        let view: Vec<(&str, u32, f64)> = resp
            .rows
            .iter()
            .map(|r| (r.period.as_str(), r.case_count, r.commission))
            .collect();
        assert_eq!(
            view,
            vec![("2025-04", 1, 150.0), ("2025-05", 0, 0.0), ("2025-06", 1, 300.0)]
        );
        assert_eq!(resp.total_commission, 450.0);
        assert_eq!(resp.technician_name, "Иван");
        // Выезды отдаются как есть, включая запланированные
        assert_eq!(resp.cases.len(), 3);
    }
}
