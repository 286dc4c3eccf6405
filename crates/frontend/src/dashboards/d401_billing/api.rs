use contracts::dashboards::d401_billing::BillingResponse;
use contracts::shared::period::PeriodRangeRequest;

use crate::shared::api_utils::{get_bytes, get_json, with_query};
use crate::shared::export::save_bytes;

const API_BASE: &str = "/api/d401";

pub async fn get_billing(request: &PeriodRangeRequest) -> Result<BillingResponse, String> {
    get_json(&with_query(&format!("{}/billing", API_BASE), request)).await
}

/// Выгрузить CSV за период и сохранить файл
pub async fn export_csv(request: &PeriodRangeRequest) -> Result<(), String> {
    let bytes = get_bytes(&with_query(&format!("{}/billing/export", API_BASE), request)).await?;
    let filename = format!(
        "billing_{}_{}.csv",
        request.date_from.as_deref().unwrap_or("start"),
        request.date_to.as_deref().unwrap_or("end")
    );
    save_bytes(&bytes, &filename, Some("text/csv;charset=utf-8"))
}
