//! Shared application state

use crate::auth::JwtService;
use zipdrop_core::Config;
use zipdrop_services::MediaService;

/// State handed to every handler and middleware as `Arc<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub service: MediaService,
    pub jwt: JwtService,
    pub trusted_proxy_count: usize,
}

impl AppState {
    pub fn new(config: &Config, service: MediaService) -> Self {
        Self {
            service,
            jwt: JwtService::new(&config.jwt_secret, &config.admin_role),
            trusted_proxy_count: config.trusted_proxy_count,
        }
    }
}
