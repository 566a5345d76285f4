//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod scheduler;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::Result;
use std::sync::Arc;
use zipdrop_core::Config;

/// Build stores, services and routes for `config`.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let service = services::initialize_services(&config).await?;
    let state = Arc::new(AppState::new(&config, service));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
