use anyhow::Result;
use chrono::{NaiveDate, Utc};
use contracts::dashboards::d401_billing::{BillingResponse, BillingRow};
use contracts::domain::a005_service_case::aggregate::{CaseStatus, InvoiceStatus, ServiceCase};
use contracts::shared::period::PeriodRangeRequest;

use crate::domain::a005_service_case;
use crate::shared::aggregation::{percent, round2, Accumulate, PeriodBuckets};
use crate::shared::format::format_amount;
use crate::shared::error::DomainError;

impl Accumulate<ServiceCase> for BillingRow {
    fn accumulate(&mut self, case: &ServiceCase) {
        if case.status != CaseStatus::Completed {
            return;
        }
        let amount = case.price;
        match case.invoice_status {
            InvoiceStatus::Unbilled => self.unbilled += amount,
            InvoiceStatus::Invoiced => {
                self.invoiced += amount;
                self.outstanding += amount;
                self.invoice_count += 1;
            }
            InvoiceStatus::Overdue => {
                self.invoiced += amount;
                self.outstanding += amount;
                self.overdue += amount;
                self.invoice_count += 1;
                self.overdue_count += 1;
            }
            InvoiceStatus::Paid => {
                self.invoiced += amount;
                self.paid += amount;
                self.invoice_count += 1;
            }
        }
    }
}

fn rounded(row: BillingRow) -> BillingRow {
    BillingRow {
        invoiced: round2(row.invoiced),
        paid: round2(row.paid),
        outstanding: round2(row.outstanding),
        overdue: round2(row.overdue),
        unbilled: round2(row.unbilled),
        ..row
    }
}

pub async fn get_billing(request: PeriodRangeRequest) -> Result<BillingResponse> {
    let (from, to) = request.resolve(Utc::now().date_naive())
        .map_err(DomainError::validation)?;
    let cases = a005_service_case::repository::list_in_range(from, to).await?;
    Ok(build_billing(from, to, &cases))
}

pub fn build_billing(from: NaiveDate, to: NaiveDate, cases: &[ServiceCase]) -> BillingResponse {
    let rows: Vec<BillingRow> = PeriodBuckets::<BillingRow>::new(from, to)
        .fold(cases, |c| Some(c.case_date))
        .into_rows()
        .into_iter()
        .map(|(period, row)| rounded(BillingRow { period, ..row }))
        .collect();

    let mut totals = BillingRow {
        period: "total".to_string(),
        ..Default::default()
    };
    for case in cases.iter().filter(|c| c.case_date >= from && c.case_date <= to) {
        totals.accumulate(case);
    }
    let totals = rounded(totals);

    BillingResponse {
        date_from: from.format("%Y-%m-%d").to_string(),
        date_to: to.format("%Y-%m-%d").to_string(),
        collection_rate: round2(percent(totals.paid, totals.invoiced)),
        rows,
        totals,
    }
}

/// Выгрузка дашборда в CSV (строки по месяцам и итог)
pub fn to_csv(response: &BillingResponse) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "period",
        "invoiced",
        "paid",
        "outstanding",
        "overdue",
        "unbilled",
        "invoice_count",
        "overdue_count",
    ])?;
    for row in response.rows.iter().chain(std::iter::once(&response.totals)) {
        writer.write_record([
            row.period.clone(),
            format_amount(row.invoiced),
            format_amount(row.paid),
            format_amount(row.outstanding),
            format_amount(row.overdue),
            format_amount(row.unbilled),
            row.invoice_count.to_string(),
            row.overdue_count.to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV flush failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a005_service_case::aggregate::ServiceCaseDto;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn case(date: NaiveDate, status: CaseStatus, invoice: InvoiceStatus, price: f64) -> ServiceCase {
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
                pest_type: "Муравьи".into(),
                status,
                price,
                material_cost: 0.0,
                invoice_status: invoice,
            },
            "SC".into(),
        )
    }

    fn sample() -> Vec<ServiceCase> {
        vec![
            case(d(2025, 4, 1), CaseStatus::Completed, InvoiceStatus::Paid, 1000.0),
            case(d(2025, 4, 2), CaseStatus::Completed, InvoiceStatus::Invoiced, 500.0),
            case(d(2025, 4, 3), CaseStatus::Completed, InvoiceStatus::Overdue, 250.0),
            case(d(2025, 5, 3), CaseStatus::Completed, InvoiceStatus::Unbilled, 700.0),
            case(d(2025, 5, 4), CaseStatus::Scheduled, InvoiceStatus::Unbilled, 9999.0),
        ]
    }

    #[test]
    fn test_billing_buckets() {
        let resp = build_billing(d(2025, 4, 1), d(2025, 5, 31), &sample());
        let apr = &resp.rows[0];
        assert_eq!(apr.period, "2025-04");
        assert_eq!(apr.invoiced, 1750.0);
        assert_eq!(apr.paid, 1000.0);
        assert_eq!(apr.outstanding, 750.0);
        assert_eq!(apr.overdue, 250.0);
        assert_eq!((apr.invoice_count, apr.overdue_count), (3, 1));

        let may = &resp.rows[1];
        assert_eq!(may.unbilled, 700.0);
        assert_eq!(may.invoiced, 0.0);

        assert_eq!(resp.totals.invoiced, 1750.0);
        assert_eq!(resp.collection_rate, round2(1000.0 / 1750.0 * 100.0));
    }

    #[test]
    fn test_collection_rate_without_invoices() {
        let resp = build_billing(d(2025, 1, 1), d(2025, 1, 31), &[]);
        assert_eq!(resp.rows.len(), 1);
        assert_eq!(resp.collection_rate, 0.0);
    }

    #[test]
    fn test_csv_export() {
        let resp = build_billing(d(2025, 4, 1), d(2025, 5, 31), &sample());
        let text = String::from_utf8(to_csv(&resp).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("period,invoiced,paid"));
        assert_eq!(lines[1], "2025-04,1750.00,1000.00,750.00,250.00,0.00,3,1");
        assert!(lines[3].starts_with("total,"));
    }
}
