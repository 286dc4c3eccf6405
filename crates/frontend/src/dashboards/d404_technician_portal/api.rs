use contracts::dashboards::d404_technician_portal::{PortalRequest, PortalResponse};

use crate::shared::api_utils::{get_json, with_query};

/// Портал техника; администратор указывает `technician_ref`
pub async fn get_portal(request: &PortalRequest) -> Result<PortalResponse, String> {
    get_json(&with_query("/api/d404/portal", request)).await
}
