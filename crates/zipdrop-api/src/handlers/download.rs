use crate::auth::Caller;
use crate::error::HttpAppError;
use crate::handlers::media::parse_media_id;
use crate::state::AppState;
use crate::utils::ip_extraction::ClientIp;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use zipdrop_infra::ErrorResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct DownloadResponse {
    pub id: i64,
    pub key: String,
    /// Download count after this download
    pub downloads: i64,
    pub url: String,
}

#[utoipa::path(
    post,
    path = "/api/v0/media/{id}/download",
    tag = "media",
    params(("id" = i64, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Download recorded", body = DownloadResponse),
        (status = 404, description = "Media not found or not visible", body = ErrorResponse),
        (status = 429, description = "Download limit reached", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, capability, client), fields(client = %client.0))]
pub async fn record_download(
    Caller(capability): Caller,
    client: ClientIp,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_media_id(&id)?;
    let record = state.service.get_media(&capability, id).await?;
    let downloads = state.service.record_download(record.id, &client.0).await?;

    Ok(Json(DownloadResponse {
        id: record.id,
        url: state.service.blob_url(&record.key),
        key: record.key,
        downloads,
    }))
}
