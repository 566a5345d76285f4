use crate::auth::Caller;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::ip_extraction::ClientIp;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use zipdrop_infra::ErrorResponse;
use zipdrop_services::SweepReport;

#[utoipa::path(
    post,
    path = "/api/v0/sweep",
    tag = "lifecycle",
    responses(
        (status = 200, description = "Sweep pass completed", body = SweepReport),
        (status = 429, description = "Sweep limit reached", body = ErrorResponse),
        (status = 503, description = "Metadata store unavailable", body = ErrorResponse)
    )
)]
pub async fn sweep_expired(
    Caller(capability): Caller,
    client: ClientIp,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    // Signed-in callers are limited by identity, everyone else by address
    let identity = match capability.identity() {
        Some(identity) => format!("user:{}", identity),
        None => format!("ip:{}", client.0),
    };
    let report = state.service.sweep_expired(&identity).await?;
    Ok(Json(report))
}
