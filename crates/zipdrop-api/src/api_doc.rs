//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::handlers;
use zipdrop_core::models;
use zipdrop_infra::ErrorResponse;
use zipdrop_services::{SweepFailure, SweepReport};

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Zipdrop API",
        version = "0.1.0",
        description = "Ephemeral media sharing: media are removed 24 hours after upload by default. Downloads are counted per media and rate limited per client."
    ),
    paths(
        handlers::health::health,
        handlers::media::list_media,
        handlers::media::list_owned_by,
        handlers::media::get_media,
        handlers::media::create_media,
        handlers::media::edit_media,
        handlers::media::remove_media,
        handlers::download::record_download,
        handlers::sweep::sweep_expired,
    ),
    components(schemas(
        models::MediaResponse,
        models::NewMedia,
        models::MediaUpdate,
        models::Visibility,
        ErrorResponse,
        SweepReport,
        SweepFailure,
        zipdrop_core::ErrorKind,
        handlers::download::DownloadResponse,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "media", description = "Media registry and downloads"),
        (name = "lifecycle", description = "TTL sweeps"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
