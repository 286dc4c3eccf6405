use contracts::dashboards::d400_economics::EconomicsResponse;
use contracts::shared::period::PeriodRangeRequest;

use crate::shared::api_utils::{get_json, with_query};

/// Экономика по месяцам за период
pub async fn get_economics(request: &PeriodRangeRequest) -> Result<EconomicsResponse, String> {
    get_json(&with_query("/api/d400/economics", request)).await
}
