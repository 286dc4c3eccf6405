use axum::{
    extract::Query,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contracts::dashboards::d400_economics::EconomicsResponse;
use contracts::dashboards::d401_billing::BillingResponse;
use contracts::dashboards::d402_contract_pipeline::PipelineResponse;
use contracts::dashboards::d403_technician_ranking::TechnicianRankingResponse;
use contracts::dashboards::d404_technician_portal::{PortalRequest, PortalResponse};
use contracts::shared::period::PeriodRangeRequest;

use crate::dashboards::{
    d400_economics, d401_billing, d402_contract_pipeline, d403_technician_ranking,
    d404_technician_portal,
};
use crate::shared::error::log_status;
use crate::system::auth::extractor::CurrentUser;

/// GET /api/d400/economics
pub async fn economics(
    Query(request): Query<PeriodRangeRequest>,
) -> Result<Json<EconomicsResponse>, StatusCode> {
    d400_economics::service::get_economics(request)
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to build economics dashboard", e))
}

/// GET /api/d401/billing
pub async fn billing(
    Query(request): Query<PeriodRangeRequest>,
) -> Result<Json<BillingResponse>, StatusCode> {
    d401_billing::service::get_billing(request)
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to build billing dashboard", e))
}

/// GET /api/d401/billing/export
pub async fn billing_export(
    Query(request): Query<PeriodRangeRequest>,
) -> Result<Response, StatusCode> {
    let response = d401_billing::service::get_billing(request)
        .await
        .map_err(|e| log_status("Failed to build billing dashboard", e))?;
    let csv = d401_billing::service::to_csv(&response)
        .map_err(|e| log_status("Failed to export billing", e))?;
    let disposition = format!(
        "attachment; filename=\"billing_{}_{}.csv\"",
        response.date_from, response.date_to
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// GET /api/d402/pipeline
pub async fn pipeline(
    Query(request): Query<PeriodRangeRequest>,
) -> Result<Json<PipelineResponse>, StatusCode> {
    d402_contract_pipeline::service::get_pipeline(request)
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to build pipeline dashboard", e))
}

/// GET /api/d403/ranking
pub async fn ranking(
    Query(request): Query<PeriodRangeRequest>,
) -> Result<Json<TechnicianRankingResponse>, StatusCode> {
    d403_technician_ranking::service::get_ranking(request)
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to build technician ranking", e))
}

/// GET /api/d404/portal
pub async fn portal(
    CurrentUser(claims): CurrentUser,
    Query(request): Query<PortalRequest>,
) -> Result<Json<PortalResponse>, StatusCode> {
    d404_technician_portal::service::get_portal(request, &claims)
        .await
        .map(Json)
        .map_err(|e| log_status("Failed to build technician portal", e))
}
