mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use slug_shortener::domain::repositories::ShortLinkRepository;

#[tokio::test]
async fn test_redirect_found() {
    let app = common::spawn_app();
    common::insert_link(&app.store, "gh", "https://github.com/", None, None).await;

    let response = app.server.get("/gh").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://github.com/");
}

#[tokio::test]
async fn test_redirect_counts_visit_and_queues_click() {
    let mut app = common::spawn_app();
    let link = common::insert_link(&app.store, "docs", "https://docs.rs/", None, None).await;

    app.server
        .get("/docs")
        .add_header("User-Agent", "curl/8.5.0")
        .add_header("Referer", "https://news.example/")
        .await
        .assert_status(StatusCode::FOUND);
    app.server
        .get("/docs")
        .await
        .assert_status(StatusCode::FOUND);

    let stored = app.store.find_by_slug("docs").await.unwrap().unwrap();
    assert_eq!(stored.visit_count, 2);
    assert!(stored.last_visited_at.is_some());

    let event = app.clicks.try_recv().unwrap();
    assert_eq!(event.link_id, link.id);
    assert_eq!(event.user_agent.as_deref(), Some("curl/8.5.0"));
    assert_eq!(event.referer.as_deref(), Some("https://news.example/"));
    assert!(app.clicks.try_recv().is_ok());
}

#[tokio::test]
async fn test_redirect_unknown_slug() {
    let app = common::spawn_app();

    let response = app.server.get("/nope").await;

    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_redirect_expired_link_is_gone() {
    let app = common::spawn_app();
    let past = Utc::now() - Duration::hours(1);
    common::insert_link(&app.store, "old", "https://example.com/", None, Some(past)).await;

    let response = app.server.get("/old").await;

    response.assert_status(StatusCode::GONE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "expired");

    let stored = app.store.find_by_slug("old").await.unwrap().unwrap();
    assert_eq!(stored.visit_count, 0);
}

#[tokio::test]
async fn test_redirect_deleted_link() {
    let app = common::spawn_app();
    let link = common::insert_link(&app.store, "gone", "https://example.com/", Some(1), None).await;
    assert!(app.store.soft_delete(link.id, 1).await.unwrap());

    app.server.get("/gone").await.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_reserved_prefix_never_resolves() {
    let app = common::spawn_app();
    // Written straight to storage, bypassing the allocator's reserved-prefix check.
    common::insert_link(&app.store, "authors", "https://example.com/", None, None).await;

    app.server.get("/authors").await.assert_status_not_found();
}

#[tokio::test]
async fn test_redirect_requires_exact_slug() {
    let app = common::spawn_app();
    common::insert_link(&app.store, "abc", "https://example.com/", None, None).await;

    app.server.get("/abc").await.assert_status(StatusCode::FOUND);
    app.server.get("/abcd").await.assert_status_not_found();
}
