use contracts::dashboards::d403_technician_ranking::TechnicianRankingResponse;
use contracts::shared::period::PeriodRangeRequest;

use crate::shared::api_utils::{get_json, with_query};

pub async fn get_ranking(
    request: &PeriodRangeRequest,
) -> Result<TechnicianRankingResponse, String> {
    get_json(&with_query("/api/d403/ranking", request)).await
}
