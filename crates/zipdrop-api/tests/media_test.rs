#[path = "helpers/mod.rs"]
mod helpers;

use helpers::{api_path, setup_test_app};
use serde_json::Value;

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();
    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["status"], "ok");
    assert!(response.headers().contains_key("X-RateLimit-Limit"));
}

#[tokio::test]
async fn test_create_requires_privilege() {
    let app = setup_test_app();
    let body = serde_json::json!({"key": "k1", "name": "k1.zip", "size": 1});

    let anonymous = app.client().post(&api_path("/media")).json(&body).await;
    assert_eq!(anonymous.status_code(), 401);
    assert_eq!(anonymous.json::<Value>()["code"], "UNAUTHORIZED");

    let member = app
        .client()
        .post(&api_path("/media"))
        .add_header("Authorization", app.member_bearer())
        .json(&body)
        .await;
    assert_eq!(member.status_code(), 401);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = setup_test_app();
    let response = app
        .client()
        .get(&api_path("/media"))
        .add_header("Authorization", "Bearer not-a-token")
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_create_and_list_by_visibility() {
    let app = setup_test_app();
    let created = app.create_media("k1").await;
    assert_eq!(created["visibility"], "private");
    assert!(created.get("owner_id").is_none());
    assert!(created["expires_at"].is_string());
    app.create_media("k2").await;
    app.publish("k2").await;

    let anonymous = app.client().get(&api_path("/media")).await;
    assert_eq!(anonymous.status_code(), 200);
    let listed = anonymous.json::<Vec<Value>>();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["key"], "k2");

    let admin = app
        .client()
        .get(&api_path("/media"))
        .add_header("Authorization", app.admin_bearer())
        .await;
    assert_eq!(admin.json::<Vec<Value>>().len(), 2);

    let owned = app
        .client()
        .get(&api_path("/media/owner/admin_1"))
        .add_header("Authorization", app.admin_bearer())
        .await;
    assert_eq!(owned.status_code(), 200);
    assert_eq!(owned.json::<Vec<Value>>().len(), 2);
}

#[tokio::test]
async fn test_get_respects_visibility() {
    let app = setup_test_app();
    let created = app.create_media("k1").await;
    let path = api_path(&format!("/media/{}", created["id"]));

    assert_eq!(app.client().get(&path).await.status_code(), 404);
    let admin = app
        .client()
        .get(&path)
        .add_header("Authorization", app.admin_bearer())
        .await;
    assert_eq!(admin.status_code(), 200);
    assert_eq!(admin.json::<Value>()["key"], "k1");

    let bad_id = app.client().get(&api_path("/media/not-a-number")).await;
    assert_eq!(bad_id.status_code(), 400);
}

#[tokio::test]
async fn test_create_rejects_bad_input() {
    let app = setup_test_app();
    app.create_media("k1").await;

    let duplicate = app
        .client()
        .post(&api_path("/media"))
        .add_header("Authorization", app.admin_bearer())
        .json(&serde_json::json!({"key": "k1", "name": "again.zip", "size": 1}))
        .await;
    assert_eq!(duplicate.status_code(), 400);

    let negative = app
        .client()
        .post(&api_path("/media"))
        .add_header("Authorization", app.admin_bearer())
        .json(&serde_json::json!({"key": "k2", "name": "k2.zip", "size": -5}))
        .await;
    assert_eq!(negative.status_code(), 400);
    assert_eq!(negative.json::<Value>()["code"], "VALIDATION_ERROR");

    let malformed = app
        .client()
        .post(&api_path("/media"))
        .add_header("Authorization", app.admin_bearer())
        .json(&serde_json::json!({"key": "k3"}))
        .await;
    assert_eq!(malformed.status_code(), 400);
}

#[tokio::test]
async fn test_edit_unknown_key_is_not_found() {
    let app = setup_test_app();
    let response = app
        .client()
        .put(&api_path("/media/missing"))
        .add_header("Authorization", app.admin_bearer())
        .json(&serde_json::json!({"name": "x", "size": 1, "visibility": "public"}))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_remove_twice_is_no_content() {
    let app = setup_test_app();
    app.create_media("k1").await;

    for _ in 0..2 {
        let response = app
            .client()
            .delete(&api_path("/media/k1"))
            .add_header("Authorization", app.admin_bearer())
            .await;
        assert_eq!(response.status_code(), 204);
    }
    assert!(app.blobs.is_empty().await);

    let anonymous = app.client().delete(&api_path("/media/k1")).await;
    assert_eq!(anonymous.status_code(), 401);
}

#[tokio::test]
async fn test_listing_shows_download_counts() {
    let app = setup_test_app();
    let created = app.create_media("k1").await;
    assert_eq!(created["downloads"], 0);
    app.publish("k1").await;
    let id = created["id"].clone();

    for i in 0..2 {
        let response = app
            .client()
            .post(&api_path(&format!("/media/{}/download", id)))
            .add_header("X-Forwarded-For", format!("203.0.113.{}", i))
            .await;
        assert_eq!(response.status_code(), 200);
    }

    let listed = app.client().get(&api_path("/media")).await.json::<Value>();
    assert_eq!(listed[0]["downloads"], 2);
    let fetched = app
        .client()
        .get(&api_path(&format!("/media/{}", id)))
        .await
        .json::<Value>();
    assert_eq!(fetched["downloads"], 2);

    // Reading the count does not record a download
    let again = app.client().get(&api_path("/media")).await.json::<Value>();
    assert_eq!(again[0]["downloads"], 2);

    app.publish("k1").await;
    let listed = app.client().get(&api_path("/media")).await.json::<Value>();
    assert_eq!(listed[0]["downloads"], 0);
}

#[tokio::test]
async fn test_create_rejects_keys_outside_storage_root() {
    let app = setup_test_app();
    for key in ["../evil", "/abs"] {
        let response = app
            .client()
            .post(&api_path("/media"))
            .add_header("Authorization", app.admin_bearer())
            .json(&serde_json::json!({ "key": key, "name": "evil.zip", "size": 1 }))
            .await;
        assert_eq!(response.status_code(), 400);
        assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");
    }
}
