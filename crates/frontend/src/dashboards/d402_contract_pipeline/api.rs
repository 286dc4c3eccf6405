use contracts::dashboards::d402_contract_pipeline::PipelineResponse;
use contracts::shared::period::PeriodRangeRequest;

use crate::shared::api_utils::{get_json, with_query};

pub async fn get_pipeline(request: &PeriodRangeRequest) -> Result<PipelineResponse, String> {
    get_json(&with_query("/api/d402/pipeline", request)).await
}
