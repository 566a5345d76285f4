#[path = "helpers/mod.rs"]
mod helpers;

use chrono::Duration;
use futures::future::join_all;
use helpers::faults::Faults;
use helpers::{record, start_time, TestEngine};
use zipdrop_core::{AppError, ErrorKind, Visibility};

#[tokio::test]
async fn test_concurrent_downloads_are_all_counted() {
    let engine = TestEngine::new();
    let media = engine.create("k1").await;

    // Distinct client identities so the download limit does not interfere
    let calls = (0..20).map(|i| {
        let service = engine.service.clone();
        let client = format!("client-{}", i);
        async move { service.record_download(media.id, &client).await }
    });
    let results = join_all(calls).await;

    let mut counts: Vec<i64> = results.into_iter().map(|r| r.unwrap()).collect();
    counts.sort();
    assert_eq!(counts, (1..=20).collect::<Vec<i64>>());
    assert_eq!(engine.download_count(media.id).await, 20);
}

#[tokio::test]
async fn test_download_limit_per_client() {
    let engine = TestEngine::new();
    let media = engine.create("k1").await;

    for expected in 1..=5 {
        let count = engine
            .service
            .record_download(media.id, "10.0.0.1")
            .await
            .unwrap();
        assert_eq!(count, expected);
    }

    let err = engine
        .service
        .record_download(media.id, "10.0.0.1")
        .await
        .unwrap_err();
    match err {
        AppError::RateLimited {
            scope,
            retry_after_secs,
        } => {
            assert_eq!(scope, "download");
            assert!(retry_after_secs >= 1);
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
    assert_eq!(engine.download_count(media.id).await, 5);

    // A different client is unaffected
    assert_eq!(
        engine
            .service
            .record_download(media.id, "10.0.0.2")
            .await
            .unwrap(),
        6
    );

    engine.advance(Duration::seconds(60));
    assert!(engine
        .service
        .record_download(media.id, "10.0.0.1")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_concurrent_burst_then_denied() {
    let engine = TestEngine::new();
    engine
        .seed(record(42, "k1", Visibility::Public, start_time()))
        .await;

    let burst = (0..5).map(|_| {
        let service = engine.service.clone();
        async move { service.record_download(42, "client-a").await }
    });
    let results = join_all(burst).await;
    assert!(results.iter().all(|r| r.is_ok()));

    let sixth = engine.service.record_download(42, "client-a").await;
    assert_eq!(sixth.unwrap_err().kind(), ErrorKind::RateLimited);
    assert_eq!(engine.download_count(42).await, 5);
}

#[tokio::test]
async fn test_download_of_unknown_media() {
    let engine = TestEngine::new();

    let err = engine
        .service
        .record_download(999, "client-a")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(engine.download_count(999).await, 0);
}

#[tokio::test]
async fn test_download_fails_closed_when_counter_store_down() {
    let engine = TestEngine::new();
    let media = engine.create("k1").await;

    Faults::fail(&engine.faults.counter_store_down);
    let err = engine
        .service
        .record_download(media.id, "client-a")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);

    Faults::heal(&engine.faults.counter_store_down);
    assert_eq!(engine.download_count(media.id).await, 0);
}
