use chrono::Duration;
use zipdrop_core::{Config, RateLimitSettings};

/// Tunables shared by the services
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    /// Age after which the sweeper removes a record
    pub media_ttl: Duration,
    /// Deadline for each store or provider call
    pub upstream_timeout: std::time::Duration,
    /// Maximum concurrent removals inside one sweep
    pub sweep_concurrency: usize,
    pub rate_limits: RateLimitSettings,
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            media_ttl: config.media_ttl(),
            upstream_timeout: config.upstream_timeout(),
            sweep_concurrency: config.sweep_concurrency.max(1),
            rate_limits: config.rate_limits,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
