#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use zipdrop_api::auth::JwtService;
use zipdrop_api::setup::routes::setup_routes;
use zipdrop_api::AppState;
use zipdrop_core::{Clock, Config, ManualClock, RateLimitSettings, ScopeLimit};
use zipdrop_db::{MemoryCounterStore, MemoryMediaStore};
use zipdrop_services::{MediaService, MemoryStorage, ServiceSettings};

pub const JWT_SECRET: &str = "test-secret-test-secret-test-secret";

pub fn api_path(path: &str) -> String {
    format!("{}{}", zipdrop_core::constants::API_PREFIX, path)
}

pub fn test_config() -> Config {
    Config {
        jwt_secret: JWT_SECRET.to_string(),
        rate_limits: RateLimitSettings {
            general: ScopeLimit::new(1000, 60, true),
            ..RateLimitSettings::default()
        },
        ..Config::default()
    }
}

/// Router over in-memory backends with a manually driven clock
pub struct TestApp {
    pub server: TestServer,
    pub clock: ManualClock,
    pub blobs: Arc<MemoryStorage>,
    jwt: JwtService,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn admin_bearer(&self) -> String {
        self.bearer("admin_1", "admin")
    }

    pub fn member_bearer(&self) -> String {
        self.bearer("user_1", "member")
    }

    pub fn bearer(&self, sub: &str, role: &str) -> String {
        let token = self
            .jwt
            .issue(sub, role, Duration::hours(1))
            .expect("Failed to issue token");
        format!("Bearer {}", token)
    }

    /// Register `key` as admin and return the created media JSON.
    pub async fn create_media(&self, key: &str) -> serde_json::Value {
        self.blobs.insert(key).await;
        let response = self
            .server
            .post(&api_path("/media"))
            .add_header("Authorization", self.admin_bearer())
            .json(&serde_json::json!({
                "key": key,
                "name": format!("{}.zip", key),
                "size": 2048
            }))
            .await;
        assert_eq!(response.status_code(), 201);
        response.json::<serde_json::Value>()
    }

    /// Make `key` public as admin.
    pub async fn publish(&self, key: &str) {
        let response = self
            .server
            .put(&api_path(&format!("/media/{}", key)))
            .add_header("Authorization", self.admin_bearer())
            .json(&serde_json::json!({
                "name": format!("{}.zip", key),
                "size": 2048,
                "visibility": "public"
            }))
            .await;
        assert_eq!(response.status_code(), 200);
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config())
}

pub fn setup_test_app_with(config: Config) -> TestApp {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 30).unwrap());
    let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());
    let blobs = Arc::new(MemoryStorage::new());

    let service = MediaService::new(
        Arc::new(MemoryMediaStore::new()),
        Arc::new(MemoryCounterStore::new(shared_clock.clone())),
        blobs.clone(),
        shared_clock,
        ServiceSettings::from_config(&config),
    );
    let state = Arc::new(AppState::new(&config, service));
    let jwt = state.jwt.clone();
    let app = setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        clock,
        blobs,
        jwt,
    }
}
