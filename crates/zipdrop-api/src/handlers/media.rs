//! Media registry endpoints

use crate::auth::Caller;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::future::try_join_all;
use std::sync::Arc;
use zipdrop_core::{AppError, MediaRecord, MediaResponse, MediaUpdate, NewMedia};
use zipdrop_infra::ErrorResponse;

pub(crate) fn parse_media_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("Invalid media id '{}'", raw)))
}

fn respond(state: &AppState, record: MediaRecord, downloads: i64) -> MediaResponse {
    MediaResponse::from_record(record, state.service.settings().media_ttl, downloads)
}

async fn respond_counted(state: &AppState, record: MediaRecord) -> Result<MediaResponse, AppError> {
    let downloads = state.service.download_count(record.id).await?;
    Ok(respond(state, record, downloads))
}

async fn respond_all(
    state: &AppState,
    records: Vec<MediaRecord>,
) -> Result<Vec<MediaResponse>, AppError> {
    try_join_all(
        records
            .into_iter()
            .map(|record| respond_counted(state, record)),
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/v0/media",
    tag = "media",
    responses(
        (status = 200, description = "Media visible to the caller, most recently updated first", body = Vec<MediaResponse>),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_media(
    Caller(capability): Caller,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let records = state.service.list_media(&capability).await?;
    Ok(Json(respond_all(&state, records).await?))
}

#[utoipa::path(
    get,
    path = "/api/v0/media/owner/{owner_id}",
    tag = "media",
    params(("owner_id" = String, Path, description = "Owner identity")),
    responses(
        (status = 200, description = "All media of the owner", body = Vec<MediaResponse>),
        (status = 401, description = "Privileged role required", body = ErrorResponse)
    )
)]
pub async fn list_owned_by(
    Caller(capability): Caller,
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let records = state.service.list_owned_by(&capability, &owner_id).await?;
    Ok(Json(respond_all(&state, records).await?))
}

#[utoipa::path(
    get,
    path = "/api/v0/media/{id}",
    tag = "media",
    params(("id" = i64, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Media found", body = MediaResponse),
        (status = 404, description = "Media not found or not visible", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, capability))]
pub async fn get_media(
    Caller(capability): Caller,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_media_id(&id)?;
    let record = state.service.get_media(&capability, id).await?;
    Ok(Json(respond_counted(&state, record).await?))
}

#[utoipa::path(
    post,
    path = "/api/v0/media",
    tag = "media",
    request_body = NewMedia,
    responses(
        (status = 201, description = "Media registered", body = MediaResponse),
        (status = 400, description = "Invalid input or duplicate key", body = ErrorResponse),
        (status = 401, description = "Privileged role required", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, capability, upload), fields(media.key = %upload.key))]
pub async fn create_media(
    Caller(capability): Caller,
    State(state): State<Arc<AppState>>,
    ValidatedJson(upload): ValidatedJson<NewMedia>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state.service.create_media(&capability, upload).await?;
    Ok((StatusCode::CREATED, Json(respond(&state, record, 0))))
}

#[utoipa::path(
    put,
    path = "/api/v0/media/{key}",
    tag = "media",
    params(("key" = String, Path, description = "Blob key")),
    request_body = MediaUpdate,
    responses(
        (status = 200, description = "Media updated, download count reset", body = MediaResponse),
        (status = 404, description = "No media with this key", body = ErrorResponse),
        (status = 401, description = "Privileged role required", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, capability, update))]
pub async fn edit_media(
    Caller(capability): Caller,
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    ValidatedJson(update): ValidatedJson<MediaUpdate>,
) -> Result<impl IntoResponse, HttpAppError> {
    // A successful edit has just reset the count
    let record = state.service.edit_media(&capability, &key, update).await?;
    Ok(Json(respond(&state, record, 0)))
}

#[utoipa::path(
    delete,
    path = "/api/v0/media/{key}",
    tag = "media",
    params(("key" = String, Path, description = "Blob key")),
    responses(
        (status = 204, description = "Media removed, or was already gone"),
        (status = 401, description = "Privileged role required", body = ErrorResponse),
        (status = 503, description = "Removal incomplete, retry", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, capability))]
pub async fn remove_media(
    Caller(capability): Caller,
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.service.remove_media(&capability, &key).await?;
    Ok(StatusCode::NO_CONTENT)
}
