//! Configuration module
//!
//! Environment-driven settings for the API binary and the services it wires together:
//! store and storage backends, authentication, media TTL, upstream timeouts and the
//! per-scope rate limits.

use chrono::Duration;
use std::env;
use std::str::FromStr;

use crate::storage_types::{StorageBackend, StoreBackend};

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const ADMIN_ROLE: &str = "admin";
const MEDIA_TTL_HOURS: i64 = 24;
const UPSTREAM_TIMEOUT_MS: u64 = 5000;
const SWEEP_CONCURRENCY: usize = 8;
const TRUSTED_PROXY_COUNT: usize = 1;

/// Limit for one rate-limit scope: at most `max` events per trailing `window_secs`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeLimit {
    pub max: u32,
    pub window_secs: u64,
    /// Permit traffic when the counter store is unreachable
    pub fail_open: bool,
}

impl ScopeLimit {
    pub const fn new(max: u32, window_secs: u64, fail_open: bool) -> Self {
        Self {
            max,
            window_secs,
            fail_open,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::seconds(self.window_secs as i64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub general: ScopeLimit,
    pub download: ScopeLimit,
    pub sweep: ScopeLimit,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            general: ScopeLimit::new(30, 60, true),
            download: ScopeLimit::new(5, 60, false),
            sweep: ScopeLimit::new(4, 3600, false),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    // Metadata + counter stores
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Blob storage
    pub storage_backend: StorageBackend,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    // Auth
    pub jwt_secret: String,
    pub admin_role: String,
    // Lifecycle
    pub media_ttl_hours: i64,
    pub upstream_timeout_ms: u64,
    pub sweep_concurrency: usize,
    /// 0 disables the in-process sweep scheduler
    pub sweep_interval_secs: u64,
    pub rate_limits: RateLimitSettings,
    pub trusted_proxy_count: usize,
}

impl Default for Config {
    /// In-memory backends with default limits. `jwt_secret` is empty and must be set
    /// before `validate()` passes.
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            store_backend: StoreBackend::Memory,
            database_url: None,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            storage_backend: StorageBackend::Memory,
            local_storage_path: None,
            local_storage_base_url: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            jwt_secret: String::new(),
            admin_role: ADMIN_ROLE.to_string(),
            media_ttl_hours: MEDIA_TTL_HOURS,
            upstream_timeout_ms: UPSTREAM_TIMEOUT_MS,
            sweep_concurrency: SWEEP_CONCURRENCY,
            sweep_interval_secs: 0,
            rate_limits: RateLimitSettings::default(),
            trusted_proxy_count: TRUSTED_PROXY_COUNT,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    lookup(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn scope_from(
    lookup: &impl Fn(&str) -> Option<String>,
    scope: &str,
    default: ScopeLimit,
) -> ScopeLimit {
    ScopeLimit {
        max: parse_or(lookup, &format!("RATE_LIMIT_{}_MAX", scope), default.max),
        window_secs: parse_or(
            lookup,
            &format!("RATE_LIMIT_{}_WINDOW_SECS", scope),
            default.window_secs,
        ),
        fail_open: lookup(&format!("RATE_LIMIT_{}_FAIL_OPEN", scope))
            .map(|v| v.trim().to_lowercase())
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.fail_open),
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let defaults = Config::default();

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let store_backend = match lookup("STORE_BACKEND") {
            Some(v) => v.parse()?,
            None => StoreBackend::Postgres,
        };
        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(v) => v.parse()?,
            None => StorageBackend::Local,
        };

        let defaults_rl = defaults.rate_limits;
        let rate_limits = RateLimitSettings {
            general: scope_from(&lookup, "GENERAL", defaults_rl.general),
            download: scope_from(&lookup, "DOWNLOAD", defaults_rl.download),
            sweep: scope_from(&lookup, "SWEEP", defaults_rl.sweep),
        };

        let config = Config {
            server_port,
            environment,
            cors_origins,
            store_backend,
            database_url: lookup("DATABASE_URL"),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: parse_or(&lookup, "DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            storage_backend,
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL"),
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION"),
            s3_endpoint: lookup("S3_ENDPOINT"),
            aws_region: lookup("AWS_REGION"),
            jwt_secret: lookup("JWT_SECRET")
                .ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            admin_role: lookup("ADMIN_ROLE").unwrap_or_else(|| ADMIN_ROLE.to_string()),
            media_ttl_hours: parse_or(&lookup, "MEDIA_TTL_HOURS", MEDIA_TTL_HOURS),
            upstream_timeout_ms: parse_or(&lookup, "UPSTREAM_TIMEOUT_MS", UPSTREAM_TIMEOUT_MS),
            sweep_concurrency: parse_or(&lookup, "SWEEP_CONCURRENCY", SWEEP_CONCURRENCY),
            sweep_interval_secs: parse_or(&lookup, "SWEEP_INTERVAL_SECS", 0),
            rate_limits,
            trusted_proxy_count: parse_or(&lookup, "TRUSTED_PROXY_COUNT", TRUSTED_PROXY_COUNT),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn media_ttl(&self) -> Duration {
        Duration::hours(self.media_ttl_hours)
    }

    pub fn upstream_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.upstream_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.media_ttl_hours <= 0 {
            return Err(anyhow::anyhow!("MEDIA_TTL_HOURS must be greater than 0"));
        }
        if self.upstream_timeout_ms == 0 {
            return Err(anyhow::anyhow!("UPSTREAM_TIMEOUT_MS must be greater than 0"));
        }
        if self.sweep_concurrency == 0 {
            return Err(anyhow::anyhow!("SWEEP_CONCURRENCY must be greater than 0"));
        }

        for (scope, limit) in [
            ("GENERAL", self.rate_limits.general),
            ("DOWNLOAD", self.rate_limits.download),
            ("SWEEP", self.rate_limits.sweep),
        ] {
            if limit.max == 0 || limit.window_secs == 0 {
                return Err(anyhow::anyhow!(
                    "RATE_LIMIT_{}_MAX and RATE_LIMIT_{}_WINDOW_SECS must be greater than 0",
                    scope,
                    scope
                ));
            }
        }

        if self.store_backend == StoreBackend::Postgres {
            match self.database_url.as_deref() {
                Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {}
                _ => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string when STORE_BACKEND=postgres"
                    ))
                }
            }
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        Ok(())
    }
}
